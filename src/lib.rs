//! Diagnostics for an Nginx + WebDAV deployment.
//!
//! The doctor runs a fixed pipeline: syntax check, config analysis, error log
//! inspection, resource probes and a static recommendation. Every stage only
//! reads and reports; nothing on the host is modified.

pub mod analyzer;
pub mod commands;
pub mod config;
pub mod doctor;
pub mod logs;
pub mod recommend;
pub mod report;
pub mod resources;
pub mod validator;

pub use commands::{CommandError, CommandOutput, CommandRunner, SystemCommandRunner};
pub use config::{ConfigError, DoctorConfig};
pub use doctor::{run_diagnostics, DiagnosticSummary};
pub use report::Reporter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;
