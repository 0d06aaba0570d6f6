//! Host resource probes.
//!
//! Each probe is independent and best-effort: any failure is logged at debug
//! level and the probe is left out of the report.

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use crate::commands::{CommandError, CommandOutput, CommandRunner};
use crate::report::Reporter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceReport {
    /// Trimmed `df -h` output
    pub disk_usage: Option<String>,
    pub process_count: Option<usize>,
    pub port_listening: Option<bool>,
}

/// Count `ps` lines naming the process, ignoring grep invocations
pub fn count_processes(ps_output: &str, process_name: &str) -> usize {
    ps_output
        .lines()
        .filter(|line| line.contains(process_name) && !line.contains("grep"))
        .count()
}

/// Whether the port number occurs anywhere in the socket listing.
///
/// This is a plain substring test, so `8080` or a PID containing `80` also
/// count as a hit.
pub fn port_mentioned(netstat_output: &str, port: u16) -> bool {
    netstat_output.contains(&port.to_string())
}

fn probe(runner: &dyn CommandRunner, program: &str, args: &[&str]) -> Option<CommandOutput> {
    match runner.run(program, args) {
        Ok(output) => Some(output),
        Err(CommandError::NotFound { .. }) => {
            debug!("{} not available, skipping probe", program);
            None
        }
        Err(e) => {
            debug!("{} probe failed: {}", program, e);
            None
        }
    }
}

pub fn check_resources<W: Write>(
    runner: &dyn CommandRunner,
    disk_path: &str,
    process_name: &str,
    port: u16,
    reporter: &mut Reporter<W>,
) -> Result<ResourceReport> {
    reporter.section("System resource check")?;

    let mut report = ResourceReport::default();

    if let Some(output) = probe(runner, "df", &["-h", disk_path]) {
        if output.success {
            let usage = output.stdout.trim().to_string();
            reporter.ok("disk usage:")?;
            reporter.indented(1, &usage)?;
            report.disk_usage = Some(usage);
        } else {
            debug!("df -h {} exited with {:?}", disk_path, output.code);
        }
    }

    // exit status is not consulted; whatever ps printed is counted
    if let Some(output) = probe(runner, "ps", &["aux"]) {
        let count = count_processes(&output.stdout, process_name);
        if count > 0 {
            reporter.ok(&format!("{} process count: {}", process_name, count))?;
        } else {
            reporter.fail(&format!("no {} processes found", process_name))?;
        }
        report.process_count = Some(count);
    }

    if let Some(output) = probe(runner, "netstat", &["-tlnp"]) {
        let listening = port_mentioned(&output.stdout, port);
        if listening {
            reporter.ok(&format!("port {} is listening", port))?;
        } else {
            reporter.fail(&format!("port {} is not listening", port))?;
        }
        report.port_listening = Some(listening);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{reporter_text, ScriptedRunner};

    const PS_OUTPUT: &str = "\
USER       PID %CPU %MEM COMMAND
root       812  0.0  0.1 nginx: master process /usr/sbin/nginx
www-data   813  0.0  0.2 nginx: worker process
www-data   814  0.0  0.2 nginx: worker process
alice     9001  0.0  0.0 grep --color=auto nginx
alice     9002  0.0  0.0 bash
";

    #[test]
    fn test_process_count_excludes_grep() {
        assert_eq!(count_processes(PS_OUTPUT, "nginx"), 3);
        assert_eq!(count_processes(PS_OUTPUT, "apache2"), 0);
    }

    #[test]
    fn test_port_match_is_substring() {
        let netstat = "tcp 0 0 0.0.0.0:8080 0.0.0.0:* LISTEN 812/nginx";
        assert!(port_mentioned(netstat, 8080));
        // 80 is a substring of 8080
        assert!(port_mentioned(netstat, 80));
        assert!(!port_mentioned(netstat, 443));
    }

    #[test]
    fn test_all_probes_reported() {
        let runner = ScriptedRunner::new()
            .respond(
                "df",
                CommandOutput::ok("Filesystem Size Used Avail Use% Mounted on\n/dev/sda1 40G 12G 28G 30% /\n"),
            )
            .respond("ps", CommandOutput::ok(PS_OUTPUT))
            .respond(
                "netstat",
                CommandOutput::ok("tcp 0 0 0.0.0.0:80 0.0.0.0:* LISTEN 812/nginx\n"),
            );
        let mut reporter = Reporter::new(Vec::new());

        let report = check_resources(&runner, "/var/www", "nginx", 80, &mut reporter).unwrap();

        assert!(report.disk_usage.unwrap().contains("/dev/sda1"));
        assert_eq!(report.process_count, Some(3));
        assert_eq!(report.port_listening, Some(true));
        assert_eq!(
            runner.calls(),
            vec!["df -h /var/www", "ps aux", "netstat -tlnp"]
        );

        let text = reporter_text(reporter);
        assert!(text.contains("✓ disk usage:"));
        assert!(text.contains("✓ nginx process count: 3"));
        assert!(text.contains("✓ port 80 is listening"));
    }

    #[test]
    fn test_failures_are_swallowed() {
        let runner = ScriptedRunner::new()
            .respond("df", CommandOutput::failed(1, "df: /var/www: No such file or directory"))
            .fail_with("ps", std::io::ErrorKind::PermissionDenied)
            .respond("netstat", CommandOutput::ok("tcp 0 0 0.0.0.0:22 LISTEN\n"));
        let mut reporter = Reporter::new(Vec::new());

        let report = check_resources(&runner, "/var/www", "nginx", 80, &mut reporter).unwrap();

        assert_eq!(report.disk_usage, None);
        assert_eq!(report.process_count, None);
        assert_eq!(report.port_listening, Some(false));

        let text = reporter_text(reporter);
        assert!(!text.contains("disk usage"));
        assert!(!text.contains("process"));
        assert!(!text.contains("No such file"));
        assert!(text.contains("✗ port 80 is not listening"));
    }
}
