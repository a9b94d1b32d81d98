use anyhow::{Context, Result};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use super::essentials::PackageSet;
use super::matcher::{DriverMatch, find_needed};
use super::status::{PackageStatus, enrich, package_statuses};
use crate::common::distro::DistroProfile;
use crate::common::package::SystemRunner;
use crate::common::progress::{create_spinner, finish_spinner_with_success};
use crate::context::AppContext;
use crate::hardware::command::print_firmware_summary;
use crate::hardware::enumerate::DeviceListing;
use crate::hardware::firmware::{self, FirmwareStatus, FirmwareUpdates};
use crate::ui::prelude::*;

#[derive(Serialize)]
struct ScanReport<'a> {
    distro: &'a DistroProfile,
    matches: Vec<DriverMatch>,
    firmware_status: Option<&'static str>,
    firmware_updates: Option<FirmwareUpdates>,
}

/// Enumerate devices, match them against the driver database and check what
/// is installed, while asking fwupd for firmware updates in parallel.
pub async fn handle_scan(ctx: &AppContext, no_firmware: bool) -> Result<()> {
    let pb = create_spinner("Scanning hardware...");

    let db = ctx.load_database();
    if db.is_empty() {
        emit(
            Level::Debug,
            "drivers.database.empty",
            "Driver database is empty, nothing can match",
            None,
        );
    }
    let profile = ctx.profile.clone();
    let scan = tokio::task::spawn_blocking(move || {
        let listing = DeviceListing::probe();
        if listing.is_empty() {
            emit(
                Level::Warn,
                "drivers.scan.no_devices",
                "No devices could be enumerated",
                None,
            );
        }
        let matches = find_needed(&listing.lines(), &db, profile.family());
        emit(
            Level::Debug,
            "drivers.scan.done",
            &format!("Scan complete. Found {} driver matches in database.", matches.len()),
            None,
        );
        enrich(matches, &profile, &SystemRunner)
    });

    let check_firmware = ctx.config.check_firmware && !no_firmware;
    let firmware_check = async {
        if check_firmware {
            let status =
                firmware::query_with_timeout(ctx.profile.clone(), ctx.config.firmware_timeout())
                    .await;
            Some(status)
        } else {
            None
        }
    };

    let (matches, firmware_status) = tokio::join!(scan, firmware_check);
    let matches = matches.context("hardware scan task failed")?;
    finish_spinner_with_success(pb, "Scan complete");
    let firmware_code = firmware_status.as_ref().map(FirmwareStatus::code);
    let firmware_updates = firmware_status.and_then(FirmwareStatus::into_updates);

    if is_json() {
        return print_json(&ScanReport {
            distro: &ctx.profile,
            matches,
            firmware_status: firmware_code,
            firmware_updates,
        });
    }

    print_matches(&matches);
    if check_firmware {
        print_firmware_summary(firmware_updates.as_ref());
    }

    if firmware_updates.is_none() && !matches.is_empty() && matches.iter().all(|m| m.is_installed) {
        emit(
            Level::Success,
            "drivers.scan.all_clear",
            "All Clear: every matched driver is installed.",
            None,
        );
    }
    Ok(())
}

fn print_matches(matches: &[DriverMatch]) {
    if matches.is_empty() {
        emit(
            Level::Info,
            "drivers.scan.empty",
            "No matching hardware found in database.",
            None,
        );
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Driver").add_attribute(Attribute::Bold),
        Cell::new("Device").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
    ]);

    for m in matches {
        let status = if m.is_installed {
            Cell::new("Installed").fg(Color::Green)
        } else {
            Cell::new(format!("Missing: {}", m.missing_packages.join(" "))).fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&m.driver_name),
            Cell::new(m.device_label()),
            status,
        ]);
    }
    println!("{table}");

    let missing: Vec<&str> = matches
        .iter()
        .flat_map(|m| m.missing_packages.iter().map(String::as_str))
        .collect();
    if !missing.is_empty() {
        println!("Install them with: insert install {}", missing.join(" "));
    }
}

#[derive(Serialize)]
struct PackageSetReport<'a> {
    family: &'a str,
    packages: Vec<PackageStatus>,
}

pub async fn handle_essentials(ctx: &AppContext, optional: bool) -> Result<()> {
    let set = if optional {
        PackageSet::Optional
    } else {
        PackageSet::Essentials
    };
    let packages = set.packages(&ctx.load_database(), ctx.profile.family());

    let pb = create_spinner(format!("Checking {}...", set.title().to_lowercase()));
    let profile = ctx.profile.clone();
    let statuses =
        tokio::task::spawn_blocking(move || package_statuses(&packages, &profile, &SystemRunner))
            .await
            .context("package status task failed")?;
    pb.finish_and_clear();

    if is_json() {
        return print_json(&PackageSetReport {
            family: ctx.profile.family().as_str(),
            packages: statuses,
        });
    }

    if statuses.is_empty() {
        emit(
            Level::Warn,
            "drivers.essentials.empty",
            "No packages found. Check your driver database.",
            None,
        );
        return Ok(());
    }

    println!("{}", set.title().bold());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Package").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
    ]);
    for status in &statuses {
        let state = if status.installed {
            Cell::new("Installed").fg(Color::Green)
        } else {
            Cell::new("Available for installation")
        };
        table.add_row(vec![Cell::new(&status.name), state]);
    }
    println!("{table}");
    Ok(())
}
