use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::analyzer::{ConfigAnalysis, ConfigAnalyzer};
use crate::commands::CommandRunner;
use crate::config::DoctorConfig;
use crate::logs::{inspect_error_logs, LogInspection};
use crate::recommend::{print_recommended_config, print_tips};
use crate::report::Reporter;
use crate::resources::{check_resources, ResourceReport};
use crate::validator::{validate_syntax, ValidationOutcome};

pub const TITLE: &str = "Nginx WebDAV HTTP 400 diagnostic tool";

/// What each stage found. Stages after a failed validation stay `None`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSummary {
    pub validation: ValidationOutcome,
    pub config: Option<ConfigAnalysis>,
    pub logs: Option<LogInspection>,
    pub resources: Option<ResourceReport>,
}

impl DiagnosticSummary {
    /// False when the syntax check stopped the run early
    pub fn completed(&self) -> bool {
        self.validation.passed()
    }
}

/// Run every diagnostic stage in order, stopping after the syntax check if it fails
pub fn run_diagnostics<W: Write>(
    runner: &dyn CommandRunner,
    config: &DoctorConfig,
    reporter: &mut Reporter<W>,
) -> Result<DiagnosticSummary> {
    reporter.title(TITLE)?;
    reporter.line(&format!(
        "Generated: {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ))?;

    let validation = validate_syntax(runner, &config.nginx_bin, reporter)?;
    if !validation.passed() {
        warn!("Syntax check failed, skipping remaining stages");
        return Ok(DiagnosticSummary {
            validation,
            config: None,
            logs: None,
            resources: None,
        });
    }

    let analyzer = ConfigAnalyzer::new(&config.location)?;
    let config_analysis = analyzer.analyze_paths(&config.config_paths, reporter)?;
    info!(
        "Analyzed {} relevant config file(s)",
        config_analysis.files.len()
    );

    let logs = inspect_error_logs(
        runner,
        &config.log_paths,
        config.tail_lines,
        &config.location,
        reporter,
    )?;

    let resources = check_resources(
        runner,
        &config.disk_path,
        &config.process_name,
        config.port,
        reporter,
    )?;

    print_recommended_config(reporter)?;
    print_tips(reporter)?;

    Ok(DiagnosticSummary {
        validation,
        config: Some(config_analysis),
        logs: Some(logs),
        resources: Some(resources),
    })
}
