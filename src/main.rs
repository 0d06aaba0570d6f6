//! nginx-dav-doctor
//!
//! Usage: nginx-dav-doctor [--strict] [--config-path PATH]... [--log-path PATH]...
//!
//! Runs the diagnostic pipeline against the local nginx installation and
//! prints a plain-text report to stdout. Logging goes to stderr.

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nginx_dav_doctor::config::{parse_count, parse_location, parse_port};
use nginx_dav_doctor::{
    run_diagnostics, DiagnosticSummary, DoctorConfig, Reporter, SystemCommandRunner,
};

#[derive(Parser)]
#[command(name = "nginx-dav-doctor")]
#[command(about = "Diagnose HTTP 400 errors on an nginx WebDAV share")]
#[command(version)]
struct Args {
    /// nginx binary used for the syntax check
    #[arg(long)]
    nginx_bin: Option<String>,

    /// Config file to analyze; repeat to replace the default candidate list
    #[arg(long = "config-path", value_name = "PATH")]
    config_paths: Vec<String>,

    /// Error log candidate; repeat to replace the default candidate list
    #[arg(long = "log-path", value_name = "PATH")]
    log_paths: Vec<String>,

    /// Number of log lines to inspect
    #[arg(long, value_parser = |s: &str| parse_count("--tail-lines", s))]
    tail_lines: Option<usize>,

    /// Location the WebDAV share is served under, without slashes
    #[arg(long, value_parser = |s: &str| parse_location("--location", s))]
    location: Option<String>,

    /// Path whose filesystem usage is reported
    #[arg(long)]
    disk_path: Option<String>,

    /// Port expected to be listening
    #[arg(long, value_parser = |s: &str| parse_port("--port", s))]
    port: Option<u16>,

    /// Exit with status 1 when the syntax check fails
    #[arg(long)]
    strict: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, mut config: DoctorConfig) -> DoctorConfig {
        if let Some(bin) = self.nginx_bin {
            config.nginx_bin = bin;
        }
        if !self.config_paths.is_empty() {
            config.config_paths = self.config_paths;
        }
        if !self.log_paths.is_empty() {
            config.log_paths = self.log_paths;
        }
        if let Some(lines) = self.tail_lines {
            config.tail_lines = lines;
        }
        if let Some(location) = self.location {
            config.location = location;
        }
        if let Some(path) = self.disk_path {
            config.disk_path = path;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

/// Process exit code for a finished run, `None` meaning a normal exit
fn exit_code(strict: bool, summary: &DiagnosticSummary) -> Option<i32> {
    if strict && !summary.completed() {
        Some(1)
    } else {
        None
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let strict = args.strict;
    let config = args.apply(DoctorConfig::from_env()?);
    info!("Starting diagnostics with {:?}", config);

    let summary = {
        let mut reporter = Reporter::new(io::stdout().lock());
        run_diagnostics(&SystemCommandRunner, &config, &mut reporter)?
    };

    if let Some(code) = exit_code(strict, &summary) {
        std::process::exit(code);
    }

    Ok(())
}
