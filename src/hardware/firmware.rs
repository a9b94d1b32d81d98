//! Firmware update discovery through fwupd.
//!
//! `fwupdmgr get-updates --json` exit codes:
//! - 0: JSON document, updates available when `Devices` is non-empty
//! - 2: nothing to do
//! - anything else: failure

use duct::cmd;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, ErrorKind};
use std::time::Duration;

use crate::common::distro::DistroProfile;
use crate::common::package::CommandLine;
use crate::ui::prelude::*;

const FWUPDMGR: &str = "fwupdmgr";

/// Exit code fwupdmgr uses for "no updates available".
const EXIT_NOTHING_TO_DO: i32 = 2;

/// The `get-updates` JSON document, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FirmwareUpdates(Value);

impl FirmwareUpdates {
    pub fn devices(&self) -> &[Value] {
        self.0
            .get("Devices")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Display names of the devices with pending updates.
    pub fn device_names(&self) -> Vec<String> {
        self.devices()
            .iter()
            .map(|d| {
                d.get("Name")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown device")
                    .to_string()
            })
            .collect()
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

/// Everything a firmware query can end in.
#[derive(Debug, Clone, PartialEq)]
pub enum FirmwareStatus {
    Available(FirmwareUpdates),
    UpToDate(&'static str),
    ToolMissing,
    Failed { code: Option<i32>, stderr: String },
    InvalidOutput(String),
    TimedOut(u64),
}

impl FirmwareStatus {
    /// Severity this outcome is logged with.
    pub fn level(&self) -> Level {
        match self {
            FirmwareStatus::Available(_)
            | FirmwareStatus::UpToDate(_)
            | FirmwareStatus::ToolMissing => Level::Info,
            FirmwareStatus::Failed { .. } | FirmwareStatus::TimedOut(_) => Level::Warn,
            FirmwareStatus::InvalidOutput(_) => Level::Error,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FirmwareStatus::Available(_) => "firmware.updates.available",
            FirmwareStatus::UpToDate(_) => "firmware.updates.none",
            FirmwareStatus::ToolMissing => "firmware.fwupdmgr.missing",
            FirmwareStatus::Failed { .. } => "firmware.fwupdmgr.failed",
            FirmwareStatus::InvalidOutput(_) => "firmware.fwupdmgr.invalid_json",
            FirmwareStatus::TimedOut(_) => "firmware.timeout",
        }
    }

    fn message(&self) -> String {
        match self {
            FirmwareStatus::Available(updates) => {
                format!("Firmware updates found for {} device(s)", updates.devices().len())
            }
            FirmwareStatus::UpToDate(reason) => reason.to_string(),
            FirmwareStatus::ToolMissing => "fwupdmgr not found, skipping firmware check.".to_string(),
            FirmwareStatus::Failed { code, stderr } => format!(
                "fwupdmgr failed with code {}: {}",
                code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                stderr.trim()
            ),
            FirmwareStatus::InvalidOutput(e) => format!("Failed to parse fwupdmgr JSON: {e}"),
            FirmwareStatus::TimedOut(secs) => {
                format!("Firmware check did not finish within {secs}s, skipping")
            }
        }
    }

    /// Log the outcome. In JSON mode informational outcomes are left to the
    /// report document, which carries `code()` instead.
    pub fn log(&self) {
        let level = self.level();
        if level == Level::Info && is_json() {
            return;
        }
        emit(level, self.code(), &self.message(), None);
    }

    pub fn updates(&self) -> Option<&FirmwareUpdates> {
        match self {
            FirmwareStatus::Available(updates) => Some(updates),
            _ => None,
        }
    }

    pub fn into_updates(self) -> Option<FirmwareUpdates> {
        match self {
            FirmwareStatus::Available(updates) => Some(updates),
            _ => None,
        }
    }
}

/// Classify a finished `get-updates --json` run.
pub fn interpret_output(code: Option<i32>, stdout: &str, stderr: &str) -> FirmwareStatus {
    match code {
        Some(0) => match serde_json::from_str::<Value>(stdout) {
            Ok(doc) => {
                let updates = FirmwareUpdates(doc);
                if updates.devices().is_empty() {
                    FirmwareStatus::UpToDate("fwupdmgr returned 0 but no devices were found in JSON.")
                } else {
                    FirmwareStatus::Available(updates)
                }
            }
            Err(e) => FirmwareStatus::InvalidOutput(e.to_string()),
        },
        Some(EXIT_NOTHING_TO_DO) => {
            FirmwareStatus::UpToDate("No firmware updates available (fwupdmgr returned 2).")
        }
        code => FirmwareStatus::Failed {
            code,
            stderr: stderr.to_string(),
        },
    }
}

pub fn get_updates_command(profile: &DistroProfile) -> CommandLine {
    CommandLine::new(profile.elevate(vec![
        FWUPDMGR.to_string(),
        "get-updates".to_string(),
        "--json".to_string(),
    ]))
}

/// Apply all pending firmware updates.
pub fn update_command(profile: &DistroProfile) -> CommandLine {
    CommandLine::new(profile.elevate(vec![
        FWUPDMGR.to_string(),
        "update".to_string(),
        "-y".to_string(),
    ]))
}

/// Refresh fwupd metadata.
pub fn refresh_command(profile: &DistroProfile) -> CommandLine {
    CommandLine::new(profile.elevate(vec![FWUPDMGR.to_string(), "refresh".to_string()]))
}

pub fn is_fwupd_available() -> bool {
    which::which(FWUPDMGR).is_ok()
}

/// Classify a failed spawn. Only a missing `fwupdmgr` counts as the tool
/// being absent; a missing launcher is a failure naming the launcher.
fn spawn_failure(program: &str, error: &io::Error) -> FirmwareStatus {
    if error.kind() == ErrorKind::NotFound && program == FWUPDMGR {
        return FirmwareStatus::ToolMissing;
    }
    let stderr = if error.kind() == ErrorKind::NotFound {
        format!("{program} not found")
    } else {
        format!("{program}: {error}")
    };
    FirmwareStatus::Failed { code: None, stderr }
}

/// Query fwupd for pending updates and classify the result. Blocks.
///
/// The payload, if any, is `into_updates()` of the returned status.
pub fn query_firmware_updates(profile: &DistroProfile) -> FirmwareStatus {
    if !is_fwupd_available() {
        return FirmwareStatus::ToolMissing;
    }

    emit(
        Level::Debug,
        "firmware.check",
        "Checking for firmware updates...",
        None,
    );

    let command = get_updates_command(profile);
    let Some(program) = command.program() else {
        return FirmwareStatus::ToolMissing;
    };

    let output = cmd(program, command.args())
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run();

    match output {
        Ok(output) => interpret_output(
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        ),
        Err(e) => spawn_failure(program, &e),
    }
}

/// Run the firmware query on the blocking pool, giving up after `timeout`.
/// The outcome is logged before it is returned.
///
/// The query itself cannot be cancelled; on timeout it finishes in the
/// background and its result is dropped.
pub async fn query_with_timeout(profile: DistroProfile, timeout: Duration) -> FirmwareStatus {
    let task = tokio::task::spawn_blocking(move || query_firmware_updates(&profile));
    let status = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => FirmwareStatus::Failed {
            code: None,
            stderr: format!("firmware check task failed: {e}"),
        },
        Err(_) => FirmwareStatus::TimedOut(timeout.as_secs()),
    };
    status.log();
    status
}
