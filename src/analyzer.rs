//! Config file analysis.
//!
//! Reads each candidate nginx config, keeps the ones that mention the WebDAV
//! location, and reports the directives an upload-capable share depends on.

use std::fs;
use std::io::{ErrorKind, Write};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::report::Reporter;

/// Substring that marks a config as WebDAV-related, compared lower-cased
const DAV_MARKER: &str = "dav";

/// `(pattern, label)` checks applied case-insensitively to every relevant file
const DIRECTIVE_PATTERNS: &[(&str, &str)] = &[
    (r"client_max_body_size\s+(\S+);", "client_max_body_size"),
    (r"dav_methods\s+(.+);", "dav_methods"),
    (r"dav_access\s+(.+);", "dav_access"),
    (r"create_full_put_path\s+(.+);", "create_full_put_path"),
    (r#"auth_basic\s+"?([^"]+)"?;"#, "auth_basic"),
    (r"auth_basic_user_file\s+(.+);", "auth_basic_user_file"),
];

static ERROR_LOG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"error_log\s+(.+);").expect("error_log regex should be valid")
});

/// First value found for one directive in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
    pub label: String,
    pub value: Option<String>,
}

impl DirectiveMatch {
    pub fn found(&self) -> bool {
        self.value.is_some()
    }
}

/// Findings for a single relevant config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    pub path: String,
    pub directives: Vec<DirectiveMatch>,
    pub error_log: Option<String>,
}

impl FileAnalysis {
    pub fn directive(&self, label: &str) -> Option<&DirectiveMatch> {
        self.directives.iter().find(|d| d.label == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigAnalysis {
    pub files: Vec<FileAnalysis>,
    /// Paths that existed but could not be read, with the error text
    pub read_errors: Vec<(String, String)>,
}

impl ConfigAnalysis {
    pub fn found_relevant(&self) -> bool {
        !self.files.is_empty()
    }
}

/// Compiled directive table for one location name
pub struct ConfigAnalyzer {
    location: String,
    checks: Vec<(Regex, String)>,
}

impl ConfigAnalyzer {
    pub fn new(location: &str) -> Result<Self> {
        let mut checks = Vec::with_capacity(DIRECTIVE_PATTERNS.len() + 1);
        for (pattern, label) in DIRECTIVE_PATTERNS {
            checks.push((case_insensitive(pattern)?, label.to_string()));
        }

        let location_pattern = format!(r"location\s+/{}\s*\{{", regex::escape(location));
        checks.push((
            case_insensitive(&location_pattern)?,
            format!("{} location", location),
        ));

        Ok(Self {
            location: location.to_string(),
            checks,
        })
    }

    /// Whether a config mentions the location or WebDAV at all
    pub fn is_relevant(&self, content: &str) -> bool {
        content.contains(&self.location) || content.to_lowercase().contains(DAV_MARKER)
    }

    /// Apply the directive table to `content`, one entry per check in table order
    pub fn extract_directives(&self, content: &str) -> Vec<DirectiveMatch> {
        self.checks
            .iter()
            .map(|(regex, label)| DirectiveMatch {
                label: label.clone(),
                value: first_value(regex, content),
            })
            .collect()
    }

    pub fn analyze_content(&self, path: &str, content: &str) -> FileAnalysis {
        FileAnalysis {
            path: path.to_string(),
            directives: self.extract_directives(content),
            error_log: extract_error_log(content),
        }
    }

    /// Read every candidate, report the relevant ones and their directives
    pub fn analyze_paths<W: Write>(
        &self,
        paths: &[String],
        reporter: &mut Reporter<W>,
    ) -> Result<ConfigAnalysis> {
        reporter.section("Nginx configuration analysis")?;

        let mut analysis = ConfigAnalysis::default();
        let mut relevant = Vec::new();

        for path in paths {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("Config candidate {} does not exist", path);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to read config {}: {}", path, e);
                    reporter.fail(&format!("failed to read config file {}: {}", path, e))?;
                    analysis.read_errors.push((path.clone(), e.to_string()));
                    continue;
                }
            };

            if self.is_relevant(&content) {
                reporter.ok(&format!("found relevant config: {}", path))?;
                relevant.push((path, content));
            } else {
                debug!("Config {} mentions neither {} nor {}", path, self.location, DAV_MARKER);
            }
        }

        if relevant.is_empty() {
            reporter.fail(&format!(
                "no config mentions {} or {}",
                self.location, DAV_MARKER
            ))?;
            return Ok(analysis);
        }

        for (path, content) in relevant {
            let file = self.analyze_content(path, &content);

            reporter.blank()?;
            reporter.line(&format!("--- analyzing config file: {} ---", path))?;
            for directive in &file.directives {
                match &directive.value {
                    Some(value) => reporter.item(true, &format!("{}: {}", directive.label, value))?,
                    None => reporter.item(false, &format!("{}: not found", directive.label))?,
                }
            }
            match &file.error_log {
                Some(value) => reporter.item(true, &format!("error log: {}", value))?,
                None => reporter.item(false, "error log: not found")?,
            }

            analysis.files.push(file);
        }

        Ok(analysis)
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Group 1 of the first match, or the whole match for patterns without a group
fn first_value(regex: &Regex, content: &str) -> Option<String> {
    regex.captures(content).map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    })
}

/// The `error_log` value, matched case-sensitively
pub fn extract_error_log(content: &str) -> Option<String> {
    ERROR_LOG_REGEX
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
server {
    listen 80;
    error_log /var/log/nginx/api_mcp_error.log;

    location /api_mcp/ {
        alias /var/www/api_mcp/;
        dav_methods PUT DELETE MKCOL COPY MOVE;
        dav_access user:rw group:rw all:r;
        create_full_put_path on;
        auth_basic "API MCP Restricted Area";
        auth_basic_user_file /etc/nginx/.htpasswd;
        client_max_body_size 50M;
    }
}
"#;

    fn analyzer() -> ConfigAnalyzer {
        ConfigAnalyzer::new("api_mcp").unwrap()
    }

    fn value_of(matches: &[DirectiveMatch], label: &str) -> Option<String> {
        matches
            .iter()
            .find(|m| m.label == label)
            .and_then(|m| m.value.clone())
    }

    #[test]
    fn test_extracts_every_directive() {
        let matches = analyzer().extract_directives(SAMPLE_CONFIG);

        assert_eq!(matches.len(), 7);
        assert_eq!(value_of(&matches, "client_max_body_size").as_deref(), Some("50M"));
        assert_eq!(
            value_of(&matches, "dav_methods").as_deref(),
            Some("PUT DELETE MKCOL COPY MOVE")
        );
        assert_eq!(value_of(&matches, "dav_access").as_deref(), Some("user:rw group:rw all:r"));
        assert_eq!(value_of(&matches, "create_full_put_path").as_deref(), Some("on"));
        assert_eq!(
            value_of(&matches, "auth_basic").as_deref(),
            Some("API MCP Restricted Area")
        );
        assert_eq!(
            value_of(&matches, "auth_basic_user_file").as_deref(),
            Some("/etc/nginx/.htpasswd")
        );
        // `location /api_mcp/ {` has a slash before the brace
        assert_eq!(value_of(&matches, "api_mcp location"), None);
    }

    #[test]
    fn test_location_check_reports_whole_match() {
        let matches = analyzer().extract_directives("location /api_mcp {\n}\n");
        assert_eq!(
            value_of(&matches, "api_mcp location").as_deref(),
            Some("location /api_mcp {")
        );

        // a trailing slash means the brace does not directly follow the name
        let matches = analyzer().extract_directives("location /api_mcp/ {\n}\n");
        assert_eq!(value_of(&matches, "api_mcp location"), None);
    }

    #[test]
    fn test_missing_directive_is_not_found() {
        let matches = analyzer().extract_directives("server { listen 80; }");
        let body_size = matches
            .iter()
            .find(|m| m.label == "client_max_body_size")
            .unwrap();
        assert!(!body_size.found());
    }

    #[test]
    fn test_only_first_match_is_reported() {
        let content = "client_max_body_size 10M;\nclient_max_body_size 200M;\n";
        let matches = analyzer().extract_directives(content);
        assert_eq!(value_of(&matches, "client_max_body_size").as_deref(), Some("10M"));
    }

    #[test]
    fn test_directives_match_case_insensitively() {
        let matches = analyzer().extract_directives("CLIENT_MAX_BODY_SIZE 1G;");
        assert_eq!(value_of(&matches, "client_max_body_size").as_deref(), Some("1G"));
    }

    #[test]
    fn test_error_log_is_case_sensitive() {
        assert_eq!(
            extract_error_log("error_log /var/log/nginx/error.log warn;").as_deref(),
            Some("/var/log/nginx/error.log warn")
        );
        assert_eq!(extract_error_log("ERROR_LOG /var/log/nginx/error.log;"), None);
    }

    #[test]
    fn test_relevance_markers() {
        let analyzer = analyzer();
        assert!(analyzer.is_relevant("location /api_mcp/ {}"));
        assert!(analyzer.is_relevant("load_module modules/ngx_http_DAV_ext_module.so;"));
        assert!(!analyzer.is_relevant("server { listen 80; }"));
        // the location marker itself is case-sensitive
        assert!(!analyzer.is_relevant("location /API_MCP/ {}"));
    }

    #[test]
    fn test_location_name_is_escaped() {
        let analyzer = ConfigAnalyzer::new("files.v2").unwrap();
        let matches = analyzer.extract_directives("location /filesXv2 {");
        assert_eq!(value_of(&matches, "files.v2 location"), None);

        let matches = analyzer.extract_directives("location /files.v2 {");
        assert!(value_of(&matches, "files.v2 location").is_some());
    }
}
