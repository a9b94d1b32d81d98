//! Package manager enum and related functionality.

use serde::Serialize;

/// The package manager dialects we can build commands for.
///
/// Every command builder matches on this enum exhaustively, so adding a dialect
/// forces a decision for each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// Pacman - Arch Linux family
    Pacman,
    /// DNF - Fedora family
    Dnf,
    /// APT - Debian/Ubuntu family
    Apt,
    /// Zypper - openSUSE
    Zypper,
    /// XBPS - Void Linux
    Xbps,
    /// eopkg - Solus
    Eopkg,
    /// apk - Alpine Linux
    Apk,
}

impl PackageManager {
    #[cfg(test)]
    pub const ALL: [PackageManager; 7] = [
        Self::Pacman,
        Self::Dnf,
        Self::Apt,
        Self::Zypper,
        Self::Xbps,
        Self::Eopkg,
        Self::Apk,
    ];

    /// Package manager keyed directly by distro identifier.
    ///
    /// Derivatives not listed here resolve through their family.
    pub fn for_distro_id(id: &str) -> Option<Self> {
        let pm = match id {
            "arch" | "manjaro" => Self::Pacman,
            "fedora" => Self::Dnf,
            "opensuse" | "opensuse-tumbleweed" => Self::Zypper,
            "debian" | "ubuntu" => Self::Apt,
            "void" => Self::Xbps,
            "solus" => Self::Eopkg,
            "alpine" => Self::Apk,
            _ => return None,
        };
        Some(pm)
    }

    /// Short lowercase identifier, as used in the CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Dnf => "dnf",
            Self::Apt => "apt",
            Self::Zypper => "zypper",
            Self::Xbps => "xbps",
            Self::Eopkg => "eopkg",
            Self::Apk => "apk",
        }
    }

    /// Get a human-readable name for this package manager.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pacman => "Pacman",
            Self::Dnf => "DNF",
            Self::Apt => "APT",
            Self::Zypper => "Zypper",
            Self::Xbps => "XBPS",
            Self::Eopkg => "eopkg",
            Self::Apk => "apk",
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_distro_id() {
        assert_eq!(PackageManager::for_distro_id("manjaro"), Some(PackageManager::Pacman));
        assert_eq!(PackageManager::for_distro_id("opensuse"), Some(PackageManager::Zypper));
        assert_eq!(PackageManager::for_distro_id("alpine"), Some(PackageManager::Apk));
        // Derivatives resolve through the family table instead
        assert_eq!(PackageManager::for_distro_id("linuxmint"), None);
        assert_eq!(PackageManager::for_distro_id("gentoo"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(PackageManager::Pacman.display_name(), "Pacman");
        assert_eq!(PackageManager::Apt.display_name(), "APT");
        assert_eq!(PackageManager::Xbps.to_string(), "XBPS");
    }

    #[test]
    fn test_all_is_distinct() {
        let mut names: Vec<_> = PackageManager::ALL.iter().map(|pm| pm.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PackageManager::ALL.len());
    }
}
