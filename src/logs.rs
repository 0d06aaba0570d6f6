use std::io::Write;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::commands::{CommandError, CommandRunner};
use crate::report::Reporter;

/// Status code every surfaced line is checked for
const BAD_REQUEST_MARKER: &str = "400";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogInspection {
    /// The log that was tailed, if any candidate could be read
    pub inspected: Option<String>,
    pub relevant_lines: Vec<String>,
}

/// Lines mentioning a 400 or the WebDAV location
pub fn filter_relevant<'a>(lines: impl IntoIterator<Item = &'a str>, location: &str) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| line.contains(BAD_REQUEST_MARKER) || line.contains(location))
        .map(String::from)
        .collect()
}

/// Tail the first readable log among `paths` and surface relevant lines.
///
/// Only one log is ever inspected: later candidates are skipped as soon as a
/// tail succeeds.
pub fn inspect_error_logs<W: Write>(
    runner: &dyn CommandRunner,
    paths: &[String],
    tail_lines: usize,
    location: &str,
    reporter: &mut Reporter<W>,
) -> Result<LogInspection> {
    reporter.section("Nginx error log check")?;

    let count_arg = format!("-{}", tail_lines);

    for path in paths {
        let output = match runner.run("tail", &[count_arg.as_str(), path.as_str()]) {
            Ok(output) => output,
            Err(CommandError::NotFound { .. }) => {
                debug!("tail unavailable while probing {}", path);
                continue;
            }
            Err(e) => {
                warn!("Failed to tail {}: {}", path, e);
                reporter.line(&format!("failed to read log file {}: {}", path, e))?;
                continue;
            }
        };

        if !output.success {
            debug!("tail {} exited with {:?}", path, output.code);
            continue;
        }

        info!("Inspecting error log {}", path);
        reporter.line(&format!("--- {} (last {} lines) ---", path, tail_lines))?;

        let relevant_lines = filter_relevant(output.stdout.trim().lines(), location);
        if relevant_lines.is_empty() {
            reporter.indented(1, "no 400-related log lines found")?;
        } else {
            reporter.indented(1, "relevant errors found:")?;
            for line in &relevant_lines {
                reporter.indented(2, line)?;
            }
        }

        return Ok(LogInspection {
            inspected: Some(path.clone()),
            relevant_lines,
        });
    }

    reporter.fail("no readable error log among candidates")?;
    Ok(LogInspection::default())
}
