/*!
 * Test Helpers and Utilities
 *
 * A scripted [`CommandRunner`] that answers from canned outputs instead of
 * spawning processes, plus small helpers for reading captured reports.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use crate::commands::{CommandError, CommandOutput, CommandRunner};
use crate::report::Reporter;

enum Scripted {
    Output(CommandOutput),
    Error(io::ErrorKind),
}

/// Runner that replays canned responses keyed by program name, or by the
/// full command line when one was registered
///
/// Programs with no scripted response behave as if they were not installed.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Scripted>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every invocation of `program` with `output`
    pub fn respond(mut self, program: &str, output: CommandOutput) -> Self {
        self.responses.insert(program.to_string(), Scripted::Output(output));
        self
    }

    /// Answer one exact command line, e.g. `"tail -20 /var/log/nginx/error.log"`
    pub fn respond_to(mut self, command_line: &str, output: CommandOutput) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::Output(output));
        self
    }

    /// Fail `program` with an I/O error of the given kind
    pub fn fail_with(mut self, program: &str, kind: io::ErrorKind) -> Self {
        self.responses.insert(program.to_string(), Scripted::Error(kind));
        self
    }

    /// Every command line run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn was_called(&self, program: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c == program || c.starts_with(&format!("{} ", program)))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let command_line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };
        self.calls.borrow_mut().push(command_line.clone());

        let scripted = self
            .responses
            .get(&command_line)
            .or_else(|| self.responses.get(program));

        match scripted {
            Some(Scripted::Output(output)) => Ok(output.clone()),
            Some(Scripted::Error(kind)) => Err(CommandError::Io {
                program: program.to_string(),
                source: io::Error::new(*kind, "scripted failure"),
            }),
            None => Err(CommandError::NotFound {
                program: program.to_string(),
            }),
        }
    }
}

/// Consume a reporter backed by a buffer and return what it printed
pub fn reporter_text(reporter: Reporter<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_inner()).expect("report output should be valid UTF-8")
}
