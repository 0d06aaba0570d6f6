use std::io::Write;

use anyhow::Result;
use tracing::{info, warn};

use crate::commands::{CommandError, CommandRunner};
use crate::report::Reporter;

/// Result of `nginx -t`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    /// The checker ran and rejected the configuration
    SyntaxError { stderr: String },
    /// The nginx binary could not be found
    ToolMissing,
    /// The checker could not be started for another reason
    ExecFailed { error: String },
}

impl ValidationOutcome {
    /// Whether later stages should run
    pub fn passed(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }
}

/// Run the syntax checker and report the verdict
pub fn validate_syntax<W: Write>(
    runner: &dyn CommandRunner,
    nginx_bin: &str,
    reporter: &mut Reporter<W>,
) -> Result<ValidationOutcome> {
    reporter.section("Nginx configuration check")?;

    let outcome = match runner.run(nginx_bin, &["-t"]) {
        Ok(output) if output.success => {
            info!("{} -t succeeded", nginx_bin);
            reporter.ok("nginx configuration syntax is OK")?;
            ValidationOutcome::Valid
        }
        Ok(output) => {
            warn!("{} -t exited with {:?}", nginx_bin, output.code);
            reporter.fail("nginx configuration syntax error:")?;
            reporter.line(output.stderr.trim_end())?;
            ValidationOutcome::SyntaxError {
                stderr: output.stderr,
            }
        }
        Err(CommandError::NotFound { program }) => {
            warn!("Syntax checker '{}' not found", program);
            reporter.fail("nginx is not installed or not on PATH")?;
            ValidationOutcome::ToolMissing
        }
        Err(e) => {
            warn!("Syntax checker could not be started: {}", e);
            reporter.fail(&format!("could not run nginx -t: {}", e))?;
            ValidationOutcome::ExecFailed {
                error: e.to_string(),
            }
        }
    };

    Ok(outcome)
}
