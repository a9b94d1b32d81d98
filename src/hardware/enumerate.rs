//! PCI and USB device listings.

use duct::cmd;
use serde::Serialize;

use super::error::ProbeError;
use crate::ui::prelude::*;

struct ListingTool {
    program: &'static str,
    args: &'static [&'static str],
    package: &'static str,
}

// -nnmm gives quoted machine-readable fields with [hexid] tags
const LSPCI: ListingTool = ListingTool {
    program: "lspci",
    args: &["-nnmm"],
    package: "pciutils",
};

const LSUSB: ListingTool = ListingTool {
    program: "lsusb",
    args: &[],
    package: "usbutils",
};

fn run_listing(tool: &ListingTool) -> Result<Vec<String>, ProbeError> {
    if which::which(tool.program).is_err() {
        return Err(ProbeError::ToolMissing {
            tool: tool.program,
            package: tool.package,
        });
    }

    emit(
        Level::Debug,
        "hardware.listing.run",
        &format!("Running {} {}", tool.program, tool.args.join(" ")),
        None,
    );

    let output = cmd(tool.program, tool.args)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|e| ProbeError::ExecutionFailed {
            tool: tool.program,
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::ExecutionFailed {
            tool: tool.program,
            reason: format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        });
    }

    Ok(parse_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// One device per non-empty line.
pub fn parse_listing(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// `lspci -nnmm` output, one device per line.
pub fn list_pci() -> Result<Vec<String>, ProbeError> {
    run_listing(&LSPCI)
}

/// `lsusb` output, one device per line.
pub fn list_usb() -> Result<Vec<String>, ProbeError> {
    run_listing(&LSUSB)
}

fn or_report(result: Result<Vec<String>, ProbeError>) -> Vec<String> {
    result.unwrap_or_else(|e| {
        emit(Level::Warn, e.code(), &e.to_string(), None);
        Vec::new()
    })
}

/// PCI lines only, with failures reported.
pub fn probe_pci() -> Vec<String> {
    or_report(list_pci())
}

/// Every device line found on this machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceListing {
    pub pci: Vec<String>,
    pub usb: Vec<String>,
}

impl DeviceListing {
    /// Enumerate PCI and USB devices. A missing or failing tool is reported
    /// and contributes no lines.
    pub fn probe() -> Self {
        Self {
            pci: probe_pci(),
            usb: or_report(list_usb()),
        }
    }

    /// PCI lines first, then USB lines.
    pub fn lines(&self) -> Vec<&str> {
        self.pci
            .iter()
            .chain(self.usb.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pci.is_empty() && self.usb.is_empty()
    }
}
