//! Process execution for built command lines.
//!
//! Read-only queries go through [`QueryRunner`] so callers can be tested with
//! fakes. State-changing commands are run by [`run_streaming`], which reports
//! the outcome exactly once.

use duct::cmd;
use std::io::{BufRead, BufReader};

use super::commands::CommandLine;
use super::error::CommandError;
use crate::ui::prelude::*;

pub trait QueryRunner {
    /// Run a read-only command. `true` only for exit status 0.
    fn succeeds(&self, command: &CommandLine) -> bool;

    /// Run a read-only command and collect its non-empty stdout lines.
    fn read_lines(&self, command: &CommandLine) -> Result<Vec<String>, CommandError>;
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl QueryRunner for SystemRunner {
    fn succeeds(&self, command: &CommandLine) -> bool {
        let Some(program) = command.program() else {
            return false;
        };
        cmd(program, command.args())
            .stdout_null()
            .stderr_null()
            .unchecked()
            .run()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn read_lines(&self, command: &CommandLine) -> Result<Vec<String>, CommandError> {
        let program = command.program().ok_or(CommandError::EmptyCommand)?;
        let output = cmd(program, command.args())
            .stdout_capture()
            .stderr_null()
            .unchecked()
            .run()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: command.to_string(),
                code: output.status.code(),
            });
        }

        Ok(non_empty_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

pub(crate) fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run a command, merging stderr into stdout and handing every non-empty
/// output line to `on_line` as it arrives.
pub fn run_streaming(
    command: &CommandLine,
    mut on_line: impl FnMut(&str),
) -> Result<(), CommandError> {
    let program = command.program().ok_or(CommandError::EmptyCommand)?;
    emit(
        Level::Debug,
        "runner.start",
        &format!("Starting command: {command}"),
        None,
    );

    let reader = cmd(program, command.args())
        .stderr_to_stdout()
        .unchecked()
        .reader()
        .map_err(|source| CommandError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let mut buffered = BufReader::new(&reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = buffered
            .read_until(b'\n', &mut line)
            .map_err(|source| CommandError::Output {
                command: command.to_string(),
                source,
            })?;
        if read == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        let msg = text.trim();
        if !msg.is_empty() {
            on_line(msg);
        }
    }

    let status = reader
        .try_wait()
        .map_err(|source| CommandError::Output {
            command: command.to_string(),
            source,
        })?
        .map(|output| output.status);

    emit(
        Level::Debug,
        "runner.finish",
        &format!(
            "Finished `{command}` with return code: {}",
            status
                .and_then(|s| s.code())
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        ),
        None,
    );

    match status {
        Some(status) if status.success() => Ok(()),
        Some(status) => Err(CommandError::Failed {
            command: command.to_string(),
            code: status.code(),
        }),
        None => Err(CommandError::Failed {
            command: command.to_string(),
            code: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_lines_trims_and_skips_blanks() {
        let lines = non_empty_lines("  libfoo\n\nlibbar  \n   \n");
        assert_eq!(lines, vec!["libfoo", "libbar"]);
    }

    #[test]
    fn empty_command_is_refused() {
        let err = run_streaming(&CommandLine::unsupported(), |_| {}).unwrap_err();
        assert!(matches!(err, CommandError::EmptyCommand));
        assert!(!SystemRunner.succeeds(&CommandLine::unsupported()));
        assert!(matches!(
            SystemRunner.read_lines(&CommandLine::unsupported()),
            Err(CommandError::EmptyCommand)
        ));
    }

    #[test]
    fn missing_binary_is_not_success() {
        let command = CommandLine::new(["insert-test-no-such-binary", "--version"]);
        assert!(!SystemRunner.succeeds(&command));
        assert!(matches!(
            run_streaming(&command, |_| {}),
            Err(CommandError::Spawn { .. })
        ));
    }

    #[test]
    fn streaming_reports_lines_and_status() {
        let command = CommandLine::new(["sh", "-c", "echo one; echo two >&2; exit 3"]);
        let mut seen = Vec::new();
        let err = run_streaming(&command, |line| seen.push(line.to_string())).unwrap_err();
        assert_eq!(seen, vec!["one", "two"]);
        assert_eq!(err.exit_code(), Some(3));
    }

    #[test]
    fn read_lines_collects_stdout() {
        let command = CommandLine::new(["sh", "-c", "printf 'a\\n\\nb\\n'"]);
        assert_eq!(SystemRunner.read_lines(&command).unwrap(), vec!["a", "b"]);
        assert!(SystemRunner.succeeds(&CommandLine::new(["true"])));
        assert!(!SystemRunner.succeeds(&CommandLine::new(["false"])));
    }
}
