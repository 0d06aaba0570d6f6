use std::env;

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_NGINX_BIN: &str = "nginx";
pub const DEFAULT_TAIL_LINES: usize = 20;
pub const DEFAULT_LOCATION: &str = "api_mcp";
pub const DEFAULT_DISK_PATH: &str = "/var/www";
pub const DEFAULT_PROCESS_NAME: &str = "nginx";
pub const DEFAULT_PORT: u16 = 80;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/nginx/nginx.conf",
    "/etc/nginx/sites-available/default",
    "/etc/nginx/conf.d/default.conf",
    "/usr/local/nginx/conf/nginx.conf",
];

pub const DEFAULT_LOG_PATHS: &[&str] = &[
    "/var/log/nginx/error.log",
    "/usr/local/nginx/logs/error.log",
    "/var/log/nginx/error.log.1",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidCount { var: String, value: String },

    #[error("{var} must be a port number between 1 and 65535, got '{value}'")]
    InvalidPort { var: String, value: String },

    #[error("{var} must not be empty")]
    Empty { var: String },
}

/// Everything the diagnostic pipeline probes, with the stock deployment as default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorConfig {
    /// Binary invoked with `-t` for the syntax check
    pub nginx_bin: String,
    /// Config files tried in order by the analyzer
    pub config_paths: Vec<String>,
    /// Error logs tried in order by the log inspector
    pub log_paths: Vec<String>,
    pub tail_lines: usize,
    /// Location name (without leading slash) the WebDAV share is served under
    pub location: String,
    /// Path passed to `df`
    pub disk_path: String,
    pub process_name: String,
    pub port: u16,
}

impl Default for DoctorConfig {
    fn default() -> Self {
        Self {
            nginx_bin: DEFAULT_NGINX_BIN.to_string(),
            config_paths: DEFAULT_CONFIG_PATHS.iter().map(|p| p.to_string()).collect(),
            log_paths: DEFAULT_LOG_PATHS.iter().map(|p| p.to_string()).collect(),
            tail_lines: DEFAULT_TAIL_LINES,
            location: DEFAULT_LOCATION.to_string(),
            disk_path: DEFAULT_DISK_PATH.to_string(),
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl DoctorConfig {
    /// Load defaults, then apply `NGINX_DOCTOR_*` overrides from the
    /// environment and an optional `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => info!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bin) = non_empty(&lookup, "NGINX_DOCTOR_NGINX_BIN")? {
            config.nginx_bin = bin;
        }
        if let Some(paths) = non_empty(&lookup, "NGINX_DOCTOR_CONFIG_PATHS")? {
            config.config_paths = split_paths(&paths);
        }
        if let Some(paths) = non_empty(&lookup, "NGINX_DOCTOR_LOG_PATHS")? {
            config.log_paths = split_paths(&paths);
        }
        if let Some(raw) = non_empty(&lookup, "NGINX_DOCTOR_TAIL_LINES")? {
            config.tail_lines = parse_count("NGINX_DOCTOR_TAIL_LINES", &raw)?;
        }
        if let Some(raw) = non_empty(&lookup, "NGINX_DOCTOR_LOCATION")? {
            config.location = parse_location("NGINX_DOCTOR_LOCATION", &raw)?;
        }
        if let Some(path) = non_empty(&lookup, "NGINX_DOCTOR_DISK_PATH")? {
            config.disk_path = path;
        }
        if let Some(name) = non_empty(&lookup, "NGINX_DOCTOR_PROCESS_NAME")? {
            config.process_name = name;
        }
        if let Some(raw) = non_empty(&lookup, "NGINX_DOCTOR_PORT")? {
            config.port = parse_port("NGINX_DOCTOR_PORT", &raw)?;
        }

        Ok(config)
    }
}

/// Returns the trimmed value of `var`, treating a set-but-blank value as an error
fn non_empty<F>(lookup: &F, var: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::Empty { var: var.to_string() })
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}

fn split_paths(raw: &str) -> Vec<String> {
    raw.split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_count(var: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidCount {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Location name with surrounding slashes removed. An empty name would mark
/// every config and log line as relevant, so it is rejected
pub fn parse_location(var: &str, raw: &str) -> Result<String, ConfigError> {
    let location = raw.trim().trim_matches('/');
    if location.is_empty() {
        Err(ConfigError::Empty { var: var.to_string() })
    } else {
        Ok(location.to_string())
    }
}

pub fn parse_port(var: &str, raw: &str) -> Result<u16, ConfigError> {
    match raw.parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(ConfigError::InvalidPort {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}
