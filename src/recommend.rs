use std::io::Write;

use anyhow::Result;

use crate::report::Reporter;

/// Server block known to accept authenticated WebDAV uploads
pub const RECOMMENDED_CONFIG: &str = r#"
server {
    listen 80;
    server_name 154.29.150.2;

    # api_mcp directory
    location /api_mcp/ {
        alias /var/www/api_mcp/;
        index index.html;

        # WebDAV
        dav_methods PUT DELETE MKCOL COPY MOVE;
        dav_ext_methods PROPFIND OPTIONS;
        dav_access user:rw group:rw all:rw;
        create_full_put_path on;

        # basic auth
        auth_basic "API MCP Restricted Area";
        auth_basic_user_file /etc/nginx/.htpasswd;

        # upload size limits
        client_max_body_size 100M;
        client_body_buffer_size 128k;

        # security headers
        add_header X-Content-Type-Options nosniff;
        add_header X-Frame-Options DENY;

        # directory listing
        autoindex on;
        autoindex_exact_size off;
        autoindex_localtime on;
    }

    # error and access logs
    access_log /var/log/nginx/api_mcp_access.log;
    error_log /var/log/nginx/api_mcp_error.log;
}
"#;

pub const TROUBLESHOOTING_TIPS: &[&str] = &[
    "Check that client_max_body_size is large enough (100M recommended)",
    "Confirm the WebDAV module is loaded",
    "Verify the auth_basic_user_file exists and is well formed",
    "Check permissions on the /var/www/api_mcp directory",
    "Read the nginx error log for details",
    "Test uploads again with the updated v2ray upload script",
];

pub fn print_recommended_config<W: Write>(reporter: &mut Reporter<W>) -> Result<()> {
    reporter.section("Recommended nginx configuration")?;
    reporter.line("Recommended api_mcp configuration:")?;
    reporter.line(RECOMMENDED_CONFIG)?;
    Ok(())
}

pub fn print_tips<W: Write>(reporter: &mut Reporter<W>) -> Result<()> {
    reporter.rule()?;
    reporter.line("Troubleshooting tips:")?;
    for (i, tip) in TROUBLESHOOTING_TIPS.iter().enumerate() {
        reporter.line(&format!("{}. {}", i + 1, tip))?;
    }
    Ok(())
}
