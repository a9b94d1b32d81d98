//! First-run welcome.

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::common::config::SetupState;
use crate::context::AppContext;
use crate::ui::prelude::*;

/// Show the welcome overview unless it was shown before, then remember that it
/// was. Returns whether it was shown.
pub fn maybe_welcome(ctx: &AppContext, state_file: &Path, force: bool) -> Result<bool> {
    if !force && SetupState::load_from(state_file).setup_done {
        return Ok(false);
    }

    print_welcome(ctx);
    SetupState::mark_done(state_file)?;
    emit(
        Level::Debug,
        "setup.done",
        &format!("Wrote first-run state to {}", state_file.display()),
        None,
    );
    Ok(true)
}

fn print_welcome(ctx: &AppContext) {
    let profile = &ctx.profile;
    if is_json() {
        emit(
            Level::Info,
            "setup.welcome",
            "Welcome to insert",
            Some(serde_json::json!({
                "distro": profile.id(),
                "family": profile.family().as_str(),
                "pkg_mgr": profile.package_manager_name(),
            })),
        );
        return;
    }

    println!("{}", "Welcome to insert".bold());
    println!();
    println!(
        "Detected {} ({} family), package manager: {}",
        profile.id().cyan(),
        profile.family(),
        profile.package_manager_name().cyan()
    );
    println!();
    println!("  insert scan          Find drivers your hardware needs");
    println!("  insert essentials    Baseline packages for a fresh install");
    println!("  insert info          System overview");
    println!("  insert refresh       Refresh package and firmware metadata");
    println!("  insert cleanup       Caches, old logs and temporary files");
    println!("  insert orphans       Packages nothing depends on anymore");
    println!();
    println!("Run insert --help for all commands.");
}
