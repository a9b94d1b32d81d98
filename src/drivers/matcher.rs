//! Matching device listings against the driver database.
//!
//! Stateless and order-stable: the same listing and database always produce
//! the same matches in the same order.

use serde::Serialize;

use super::database::{DriverDatabase, DriverDescriptor};
use crate::common::distro::Family;
use crate::hardware::device;
use crate::ui::prelude::*;

/// A driver the machine needs, together with the device that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverMatch {
    pub driver_name: String,
    pub device_raw: String,
    pub packages: Vec<String>,
    pub category: String,
    /// Filled in by [`super::status::enrich`]
    pub missing_packages: Vec<String>,
    pub is_installed: bool,
}

impl DriverMatch {
    fn new(driver: &DriverDescriptor, device_raw: &str, packages: &[String]) -> Self {
        Self {
            driver_name: driver.name.clone(),
            device_raw: device_raw.to_string(),
            packages: packages.to_vec(),
            category: driver.category.clone(),
            missing_packages: Vec::new(),
            is_installed: false,
        }
    }

    /// `vendor | device` for PCI lines, the category for anything else.
    pub fn device_label(&self) -> String {
        match device::vendor_and_device(&self.device_raw) {
            Some((vendor, dev)) => format!("{vendor} | {dev}"),
            None => format!("Category: {}", self.category.to_uppercase()),
        }
    }
}

/// Decide, per driver, whether one of the listed devices needs it.
///
/// `devices` is expected as PCI lines followed by USB lines. The first device
/// line a driver matches settles that driver: its packages come from the
/// family entry, else the `arch` entry, else the driver is dropped.
pub fn find_needed<S: AsRef<str>>(
    devices: &[S],
    db: &DriverDatabase,
    family: Family,
) -> Vec<DriverMatch> {
    emit(
        Level::Debug,
        "drivers.scan.start",
        &format!(
            "Scanning for missing packages across {} categories",
            db.categories.len()
        ),
        None,
    );

    let mut matches = Vec::new();
    for category in &db.categories {
        for driver in &category.drivers {
            let Some(line) = devices
                .iter()
                .map(|d| d.as_ref())
                .find(|line| driver.matches_line(line))
            else {
                continue;
            };

            if let Some(packages) = driver.resolve_packages(family) {
                emit(
                    Level::Debug,
                    "drivers.scan.matched",
                    &format!(
                        "Matched device '{line}' to driver '{}' ({})",
                        driver.name, category.name
                    ),
                    None,
                );
                matches.push(DriverMatch::new(driver, line, packages));
            }
        }
    }
    matches
}

/// `vendor device` of every display controller, comma separated.
///
/// Vendor and device are the first bracketed token of quoted fields 2 and 3,
/// or the whole field when it has none. `None` when no display controller line
/// has enough fields.
pub fn gpu_summary<S: AsRef<str>>(pci: &[S]) -> Option<String> {
    let gpus: Vec<String> = pci
        .iter()
        .map(|d| d.as_ref())
        .filter(|line| device::is_display_controller(line))
        .filter_map(device::vendor_and_device)
        .map(|(vendor, dev)| {
            let vendor = device::first_bracket_token(vendor).unwrap_or(vendor);
            let dev = device::first_bracket_token(dev).unwrap_or(dev);
            format!("{vendor} {dev}")
        })
        .collect();

    if gpus.is_empty() {
        None
    } else {
        Some(gpus.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/drivers.json"));

    const AMD_GPU: &str = r#"03:00.0 "VGA compatible controller [0300]" "Advanced Micro Devices, Inc. [AMD/ATI] [1002]" "Navi 21 [Radeon RX 6800/6800 XT / 6900 XT] [73bf]" -rc1 -p00 "Sapphire Technology Limited [1da2]" "Device [439e]""#;
    const NVIDIA_GPU: &str = r#"01:00.0 "VGA compatible controller [0300]" "NVIDIA Corporation [10de]" "GeForce RTX 3070 LHR [2484]" -ra1 "ASUSTeK Computer Inc. [1043]" "Device [87b8]""#;
    const HOST_BRIDGE: &str = r#"00:00.0 "Host bridge [0600]" "Advanced Micro Devices, Inc. [AMD] [1022]" "Starship/Matisse Root Complex [1480]" "" """#;

    fn shipped() -> DriverDatabase {
        DriverDatabase::from_json(SHIPPED).unwrap()
    }

    #[test]
    fn amd_gpu_needs_mesa_and_radv() {
        let matches = find_needed(&[AMD_GPU], &shipped(), Family::Arch);
        let gpu = matches
            .iter()
            .find(|m| m.category == "gpu")
            .expect("gpu match");
        assert!(gpu.packages.contains(&"mesa".to_string()));
        assert!(gpu.packages.contains(&"vulkan-radeon".to_string()));
        assert_eq!(gpu.device_raw, AMD_GPU);
        assert!(!gpu.is_installed);
    }

    #[test]
    fn amd_gpu_summary() {
        assert_eq!(
            gpu_summary(&[HOST_BRIDGE, AMD_GPU]).as_deref(),
            Some("AMD/ATI Radeon RX 6800/6800 XT / 6900 XT")
        );
    }

    #[test]
    fn multiple_gpus_are_joined() {
        assert_eq!(
            gpu_summary(&[NVIDIA_GPU, AMD_GPU]).as_deref(),
            Some("10de 2484, AMD/ATI Radeon RX 6800/6800 XT / 6900 XT")
        );
        assert_eq!(gpu_summary(&[HOST_BRIDGE]), None);
        assert_eq!(gpu_summary::<&str>(&[]), None);
    }

    #[test]
    fn nvidia_gpu_needs_nvidia() {
        let matches = find_needed(&[NVIDIA_GPU], &shipped(), Family::Arch);
        let names: Vec<_> = matches.iter().map(|m| m.driver_name.as_str()).collect();
        assert!(names.contains(&"NVIDIA Proprietary Driver"), "{names:?}");
        let nvidia = matches
            .iter()
            .find(|m| m.driver_name == "NVIDIA Proprietary Driver")
            .unwrap();
        assert!(nvidia.packages.contains(&"nvidia".to_string()));
    }

    #[test]
    fn family_packages_preferred_over_arch() {
        let matches = find_needed(&[AMD_GPU], &shipped(), Family::Debian);
        assert!(matches[0].packages.contains(&"mesa-vulkan-drivers".to_string()));
    }

    #[test]
    fn class_filter_excludes_other_classes() {
        // AMD host bridge mentions "Advanced Micro Devices" but is class 0600
        let matches = find_needed(&[HOST_BRIDGE], &shipped(), Family::Arch);
        assert!(matches.iter().all(|m| m.category != "gpu"));
    }

    #[test]
    fn no_family_and_no_arch_entry_means_no_match() {
        let db = DriverDatabase::from_json(
            r#"{"gpu": [{"name": "Debian only", "search_patterns": ["Radeon"], "packages": {"debian": ["firmware-amd-graphics"]}}]}"#,
        )
        .unwrap();
        assert!(find_needed(&[AMD_GPU], &db, Family::Fedora).is_empty());
        assert_eq!(find_needed(&[AMD_GPU], &db, Family::Debian).len(), 1);
    }

    #[test]
    fn first_matching_line_decides() {
        let db = DriverDatabase::from_json(
            r#"{"gpu": [{"name": "Any GPU", "search_patterns": ["controller"], "packages": {"arch": ["mesa"]}}]}"#,
        )
        .unwrap();
        let matches = find_needed(&[NVIDIA_GPU, AMD_GPU], &db, Family::Arch);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].device_raw, NVIDIA_GPU);
    }

    #[test]
    fn matching_is_idempotent() {
        let db = shipped();
        let devices = [HOST_BRIDGE, AMD_GPU, NVIDIA_GPU];
        let first = find_needed(&devices, &db, Family::Arch);
        let second = find_needed(&devices, &db, Family::Arch);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_database_matches_nothing() {
        assert!(find_needed(&[AMD_GPU], &DriverDatabase::default(), Family::Arch).is_empty());
    }

    #[test]
    fn device_label() {
        let matches = find_needed(&[AMD_GPU], &shipped(), Family::Arch);
        assert_eq!(
            matches[0].device_label(),
            "Advanced Micro Devices, Inc. [AMD/ATI] [1002] | Navi 21 [Radeon RX 6800/6800 XT / 6900 XT] [73bf]"
        );

        let usb = DriverMatch {
            driver_name: "Wacom".into(),
            device_raw: "Bus 003 Device 005: ID 056a:0374 Wacom Co., Ltd CTL-4100".into(),
            packages: vec!["xf86-input-wacom".into()],
            category: "input".into(),
            missing_packages: Vec::new(),
            is_installed: false,
        };
        assert_eq!(usb.device_label(), "Category: INPUT");
    }
}
