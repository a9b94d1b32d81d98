use anyhow::{Result, anyhow, bail};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use super::exec::{confirm, print_dry_run, run, run_accepting};
use crate::common::package::cleanup::{CleanupTask, system_cleanup_tasks};
use crate::common::package::commands::{self, Operation};
use crate::common::package::orphans::find_orphans;
use crate::common::package::{
    CommandError, CommandLine, OrphanReport, PackageManager, SystemRunner,
};
use crate::context::AppContext;
use crate::hardware::firmware;
use crate::ui::prelude::*;

/// `dnf check-update` exits 100 when updates are available.
const DNF_UPDATES_AVAILABLE: i32 = 100;

pub fn handle_install(ctx: &AppContext, packages: &[String], dry_run: bool) -> Result<()> {
    let profile = &ctx.profile;
    let command = commands::install(profile, packages).require(Operation::Install, profile)?;

    if dry_run {
        return print_dry_run(&[command]);
    }

    run(&command)?;
    emit(
        Level::Success,
        "maintenance.install.done",
        &format!("Installed {}", packages.join(", ")),
        None,
    );
    Ok(())
}

pub fn handle_remove(ctx: &AppContext, packages: &[String], dry_run: bool, yes: bool) -> Result<()> {
    let profile = &ctx.profile;
    let command = commands::remove(profile, packages).require(Operation::Remove, profile)?;

    if dry_run {
        return print_dry_run(&[command]);
    }

    if !confirm(&format!("Remove {}?", packages.join(", ")), yes)? {
        emit(Level::Info, "maintenance.remove.cancelled", "Cancelled", None);
        return Ok(());
    }

    run(&command)?;
    emit(
        Level::Success,
        "maintenance.remove.done",
        &format!("Removed {}", packages.join(", ")),
        None,
    );
    Ok(())
}

/// Exit codes besides 0 that mean success for a package database refresh.
fn accepted_refresh_codes(manager: Option<PackageManager>) -> &'static [i32] {
    match manager {
        Some(PackageManager::Dnf) => &[DNF_UPDATES_AVAILABLE],
        _ => &[],
    }
}

/// Refresh the package database, then fwupd metadata. Stops at the first
/// failure.
pub fn handle_refresh(ctx: &AppContext, dry_run: bool) -> Result<()> {
    let profile = &ctx.profile;
    let package_refresh = commands::refresh_database(profile);
    let firmware_refresh = firmware::is_fwupd_available().then(|| firmware::refresh_command(profile));

    if package_refresh.is_empty() {
        emit(
            Level::Info,
            "maintenance.refresh.unsupported",
            &format!(
                "Package database refresh is not supported for {}",
                profile.package_manager_name()
            ),
            None,
        );
        if firmware_refresh.is_none() {
            return Err(CommandError::Unsupported {
                operation: Operation::Refresh,
                manager: profile.package_manager_name(),
            }
            .into());
        }
    }

    let accepted = accepted_refresh_codes(profile.package_manager());
    let steps: Vec<(CommandLine, &[i32])> = std::iter::once((package_refresh, accepted))
        .filter(|(c, _)| !c.is_empty())
        .chain(firmware_refresh.map(|c| (c, &[][..])))
        .collect();

    if dry_run {
        let commands: Vec<CommandLine> = steps.into_iter().map(|(c, _)| c).collect();
        return print_dry_run(&commands);
    }

    for (step, accepted) in &steps {
        run_accepting(step, accepted)?;
    }

    emit(
        Level::Success,
        "maintenance.refresh.done",
        "Databases refreshed",
        None,
    );
    Ok(())
}

pub fn handle_orphans(ctx: &AppContext) -> Result<()> {
    let report = find_orphans(&ctx.profile, &SystemRunner);

    if is_json() {
        return print_json(&report);
    }

    match report {
        OrphanReport::Unavailable => {
            let reason = CommandError::Unsupported {
                operation: Operation::ListOrphans,
                manager: ctx.profile.package_manager_name(),
            };
            emit(
                Level::Warn,
                "maintenance.orphans.unsupported",
                &reason.to_string(),
                None,
            );
        }
        OrphanReport::Found(packages) if packages.is_empty() => emit(
            Level::Success,
            "maintenance.orphans.none",
            "No orphans found! Your system is clean.",
            None,
        ),
        OrphanReport::Found(packages) => {
            println!("{}", "Orphaned packages:".bold());
            for pkg in &packages {
                println!("  {pkg}");
            }
            println!();
            println!("Remove one with: insert remove <package>");
        }
    }
    Ok(())
}

pub fn handle_cleanup(ctx: &AppContext, task: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    let tasks = system_cleanup_tasks(&ctx.profile);

    let Some(name) = task else {
        return list_cleanup_tasks(&tasks);
    };

    let task = find_task(&tasks, name).ok_or_else(|| {
        let available: Vec<_> = tasks.iter().map(|t| task_slug(t.name)).collect();
        anyhow!(
            "Unknown cleanup task '{name}'. Available: {}",
            available.join(", ")
        )
    })?;

    if dry_run {
        return print_dry_run(std::slice::from_ref(&task.command));
    }

    if !confirm(&format!("{}: {}?", task.name, task.description), yes)? {
        emit(Level::Info, "maintenance.cleanup.cancelled", "Cancelled", None);
        return Ok(());
    }

    run(&task.command)?;
    emit(
        Level::Success,
        "maintenance.cleanup.done",
        &format!("{} cleaned", task.name),
        None,
    );
    Ok(())
}

fn list_cleanup_tasks(tasks: &[CleanupTask]) -> Result<()> {
    if is_json() {
        return print_json(&tasks);
    }
    if tasks.is_empty() {
        bail!("No cleanup tasks available on this system");
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Task").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Description").add_attribute(Attribute::Bold),
        Cell::new("Command").add_attribute(Attribute::Bold),
    ]);
    for task in tasks {
        table.add_row(vec![
            Cell::new(task_slug(task.name)),
            Cell::new(task.name),
            Cell::new(task.description),
            Cell::new(task.command.to_string()),
        ]);
    }
    println!("{table}");
    println!("Run one with: insert cleanup <task>");
    Ok(())
}

/// "Package Cache" -> "package-cache"
fn task_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn find_task<'a>(tasks: &'a [CleanupTask], name: &str) -> Option<&'a CleanupTask> {
    let wanted = task_slug(name.trim());
    tasks.iter().find(|t| task_slug(t.name) == wanted)
}
