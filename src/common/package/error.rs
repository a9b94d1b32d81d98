use thiserror::Error;

use super::commands::Operation;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{operation} is not supported on this system (package manager: {manager})")]
    Unsupported {
        operation: Operation,
        manager: &'static str,
    },

    #[error("Refusing to run an empty command")]
    EmptyCommand,

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read output of `{command}`: {source}")]
    Output {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({})", exit_label(.code))]
    Failed { command: String, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl CommandError {
    /// Exit code of a command that ran and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}
