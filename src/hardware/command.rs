use anyhow::{Context, Result, bail};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::Serialize;

use super::FirmwareCommands;
use super::enumerate;
use super::facts::{HostFacts, get_host_facts};
use super::firmware::{self, FirmwareUpdates};
use crate::common::distro::DistroProfile;
use crate::common::progress::create_spinner;
use crate::context::AppContext;
use crate::maintenance::exec::{print_dry_run, run};
use crate::ui::prelude::*;

#[derive(Serialize)]
struct InfoReport<'a> {
    distro: &'a DistroProfile,
    host: HostFacts,
}

pub async fn handle_info(ctx: &AppContext) -> Result<()> {
    let pb = create_spinner("Collecting system info...");
    let os_release = ctx.os_release().to_path_buf();
    let facts = tokio::task::spawn_blocking(move || {
        let pci = enumerate::probe_pci();
        get_host_facts(&os_release, &pci)
    })
    .await
    .context("collecting host facts")?;
    pb.finish_and_clear();

    if is_json() {
        return print_json(&InfoReport {
            distro: &ctx.profile,
            host: facts,
        });
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in facts.rows() {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table.add_row(vec![
        Cell::new("Package Manager").add_attribute(Attribute::Bold),
        Cell::new(
            ctx.profile
                .package_manager()
                .map_or_else(|| "unknown".to_string(), |pm| pm.to_string()),
        ),
    ]);
    println!("{table}");
    Ok(())
}

pub async fn handle_firmware(ctx: &AppContext, command: FirmwareCommands) -> Result<()> {
    match command {
        FirmwareCommands::Check => check(ctx).await,
        FirmwareCommands::Update { dry_run } => update(ctx, dry_run),
    }
}

#[derive(Serialize)]
struct FirmwareReport<'a> {
    status: &'static str,
    updates_available: bool,
    devices: Vec<String>,
    payload: Option<&'a serde_json::Value>,
}

async fn check(ctx: &AppContext) -> Result<()> {
    let pb = create_spinner("Checking for firmware updates...");
    let status =
        firmware::query_with_timeout(ctx.profile.clone(), ctx.config.firmware_timeout()).await;
    pb.finish_and_clear();
    let updates = status.updates();

    if is_json() {
        return print_json(&FirmwareReport {
            status: status.code(),
            updates_available: updates.is_some(),
            devices: updates.map(FirmwareUpdates::device_names).unwrap_or_default(),
            payload: updates.map(FirmwareUpdates::payload),
        });
    }

    print_firmware_summary(updates);
    Ok(())
}

/// Human readable firmware status, shared with `scan`.
pub fn print_firmware_summary(updates: Option<&FirmwareUpdates>) {
    match updates {
        Some(updates) => {
            println!("{}", "Firmware updates available for:".yellow().bold());
            for name in updates.device_names() {
                println!("  {name}");
            }
            println!("Apply them with: insert firmware update");
        }
        None => println!("{}", "No firmware updates pending.".green()),
    }
}

fn update(ctx: &AppContext, dry_run: bool) -> Result<()> {
    let command = firmware::update_command(&ctx.profile);
    if dry_run {
        return print_dry_run(&[command]);
    }
    if !firmware::is_fwupd_available() {
        bail!("fwupdmgr not found, install fwupd to update firmware");
    }

    emit(
        Level::Info,
        "firmware.update.start",
        "Updating firmware... This might take a while.",
        None,
    );
    run(&command)?;
    emit(
        Level::Success,
        "firmware.update.done",
        "Firmware update finished",
        None,
    );
    Ok(())
}
