//! Running state-changing commands on behalf of the CLI.

use anyhow::{Result, bail};
use dialoguer::Confirm;
use std::io::IsTerminal;

use crate::common::package::runner::run_streaming;
use crate::common::package::{CommandError, CommandLine};
use crate::ui::prelude::*;

/// Print what would run. A JSON array of arguments in JSON mode.
pub fn print_dry_run(commands: &[CommandLine]) -> Result<()> {
    if is_json() {
        return match commands {
            [single] => print_json(single),
            _ => print_json(&commands),
        };
    }
    for command in commands {
        println!("{command}");
    }
    Ok(())
}

/// Run a command, streaming its output, and treat the listed exit codes as
/// success in addition to 0.
pub fn run_accepting(command: &CommandLine, accepted: &[i32]) -> Result<(), CommandError> {
    emit(
        Level::Info,
        "maintenance.run",
        &format!("Running: {command}"),
        None,
    );

    let result = run_streaming(command, |line| {
        emit(Level::Info, "maintenance.output", line, None);
    });

    match result {
        Err(e) if e.exit_code().is_some_and(|code| accepted.contains(&code)) => {
            emit(
                Level::Debug,
                "maintenance.accepted_exit",
                &format!("`{command}` finished with an accepted exit code: {e}"),
                None,
            );
            Ok(())
        }
        other => other,
    }
}

pub fn run(command: &CommandLine) -> Result<(), CommandError> {
    run_accepting(command, &[])
}

/// Ask before a destructive action. `assume_yes` skips the prompt; without a
/// terminal the prompt cannot be shown and the action is refused.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() || is_json() {
        bail!("Confirmation required, pass --yes to proceed non-interactively");
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
