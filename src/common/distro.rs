use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::common::package::PackageManager;
use crate::ui::prelude::*;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Identifier used when `/etc/os-release` is missing or has no `ID=` line.
pub const UNKNOWN_ID: &str = "unknown";

/// Launcher prepended to state-changing commands when not running as root.
pub const ELEVATION_LAUNCHER: &str = "pkexec";

/// Coarse grouping of distributions sharing driver package names.
///
/// The family is also the key used in the driver database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Arch,
    Fedora,
    Suse,
    Debian,
    Void,
    Gentoo,
    Solus,
    Alpine,
}

impl Family {
    /// Family for a known distro identifier, `None` for anything else.
    pub fn for_distro_id(id: &str) -> Option<Self> {
        let family = match id {
            "arch" | "manjaro" | "endeavouros" => Self::Arch,
            "fedora" | "nobara" => Self::Fedora,
            "opensuse" | "opensuse-tumbleweed" | "opensuse-leap" => Self::Suse,
            "debian" | "ubuntu" | "pop" | "linuxmint" => Self::Debian,
            "void" => Self::Void,
            "gentoo" => Self::Gentoo,
            "solus" => Self::Solus,
            "alpine" => Self::Alpine,
            _ => return None,
        };
        Some(family)
    }

    /// Native package manager of the family, if we can drive it.
    pub fn package_manager(self) -> Option<PackageManager> {
        match self {
            Self::Arch => Some(PackageManager::Pacman),
            Self::Fedora => Some(PackageManager::Dnf),
            Self::Debian => Some(PackageManager::Apt),
            Self::Void => Some(PackageManager::Xbps),
            Self::Solus => Some(PackageManager::Eopkg),
            Self::Alpine => Some(PackageManager::Apk),
            // zypper is only known by the opensuse ids; emerge is not supported
            Self::Suse | Self::Gentoo => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arch => "arch",
            Self::Fedora => "fedora",
            Self::Suse => "suse",
            Self::Debian => "debian",
            Self::Void => "void",
            Self::Gentoo => "gentoo",
            Self::Solus => "solus",
            Self::Alpine => "alpine",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved distribution: identifier, family, dialect and privilege state.
///
/// Built once at startup and handed to everything that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistroProfile {
    id: String,
    family: Family,
    #[serde(rename = "pkg_mgr", serialize_with = "serialize_manager")]
    package_manager: Option<PackageManager>,
    privileged: bool,
}

fn serialize_manager<S: Serializer>(pm: &Option<PackageManager>, s: S) -> Result<S::Ok, S::Error> {
    match pm {
        Some(pm) => s.serialize_str(pm.as_str()),
        None => s.serialize_str("unknown"),
    }
}

impl DistroProfile {
    /// Resolve the profile of the running system.
    pub fn resolve() -> Result<Self> {
        Self::resolve_from(Path::new(OS_RELEASE_PATH))
    }

    /// Resolve from a specific os-release file.
    ///
    /// A missing file yields the `unknown` identifier; other read errors are
    /// returned.
    pub fn resolve_from(path: &Path) -> Result<Self> {
        let id = match fs::read_to_string(path) {
            Ok(content) => parse_os_release_id(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => UNKNOWN_ID.to_string(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let profile = Self::from_id(id, is_running_as_root());
        emit(
            Level::Debug,
            "distro.detected",
            &format!(
                "Distro detected: {} (Family: {}), Package Manager: {}",
                profile.id,
                profile.family,
                profile.package_manager_name()
            ),
            None,
        );
        Ok(profile)
    }

    /// Build a profile from an identifier and an explicit privilege state.
    ///
    /// Unrecognized identifiers default to the arch family but get no package
    /// manager, so every command degrades to "unsupported".
    pub fn from_id(id: impl Into<String>, privileged: bool) -> Self {
        let id = id.into();
        let known_family = Family::for_distro_id(&id);
        let family = known_family.unwrap_or(Family::Arch);
        let package_manager = PackageManager::for_distro_id(&id)
            .or_else(|| known_family.and_then(Family::package_manager));

        Self {
            id,
            family,
            package_manager,
            privileged,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn package_manager(&self) -> Option<PackageManager> {
        self.package_manager
    }

    pub fn package_manager_name(&self) -> &'static str {
        self.package_manager.map(|pm| pm.as_str()).unwrap_or("unknown")
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Prefix a state-changing command with the elevation launcher unless we
    /// already run as root.
    pub fn elevate(&self, mut argv: Vec<String>) -> Vec<String> {
        if self.privileged {
            return argv;
        }
        emit(
            Level::Debug,
            "distro.elevate",
            &format!("Wrapping command with {}: {}", ELEVATION_LAUNCHER, argv.join(" ")),
            None,
        );
        argv.insert(0, ELEVATION_LAUNCHER.to_string());
        argv
    }
}

fn is_running_as_root() -> bool {
    matches!(sudo::check(), sudo::RunningAs::Root)
}

/// Extract the `ID=` value from os-release content.
fn parse_os_release_id(content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("ID="))
        .map(|val| val.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| UNKNOWN_ID.to_string())
}
