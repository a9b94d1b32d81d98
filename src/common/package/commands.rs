//! Argument vectors for package manager operations.
//!
//! Nothing here runs a process. Every builder returns a [`CommandLine`]; an
//! empty one means the operation has no equivalent on this system and must not
//! be executed.

use serde::Serialize;

use super::PackageManager;
use super::error::CommandError;
use crate::common::distro::DistroProfile;

/// A program plus its arguments. Never a shell string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(argv.into_iter().map(Into::into).collect())
    }

    /// The "not available on this system" sentinel.
    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Turn the "unsupported" sentinel into an error callers can report.
    pub fn require(self, operation: Operation, profile: &DistroProfile) -> Result<Self, CommandError> {
        if self.is_empty() {
            return Err(CommandError::Unsupported {
                operation,
                manager: profile.package_manager_name(),
            });
        }
        Ok(self)
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&shell_words::join(&self.0))
    }
}

/// The operations a package manager dialect may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Install,
    Remove,
    ListOrphans,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Refresh => "refresh",
            Self::Install => "install",
            Self::Remove => "remove",
            Self::ListOrphans => "list orphans",
        };
        f.write_str(s)
    }
}

/// Command prefix for an operation. Empty when the dialect lacks it.
type Stem = &'static [&'static str];

fn refresh_stem(pm: PackageManager) -> Stem {
    match pm {
        PackageManager::Pacman => &["pacman", "-Sy"],
        PackageManager::Dnf => &["dnf", "check-update"],
        PackageManager::Apt => &["apt", "update"],
        PackageManager::Zypper => &["zypper", "refresh"],
        PackageManager::Xbps | PackageManager::Eopkg | PackageManager::Apk => &[],
    }
}

fn install_stem(pm: PackageManager) -> Stem {
    match pm {
        PackageManager::Pacman => &["pacman", "-S", "--needed", "--noconfirm"],
        PackageManager::Dnf => &["dnf", "install", "-y"],
        PackageManager::Apt => &["apt", "install", "-y"],
        PackageManager::Zypper => &["zypper", "install", "-y"],
        PackageManager::Xbps => &["xbps-install", "-S", "-y"],
        PackageManager::Eopkg => &["eopkg", "install", "-y"],
        PackageManager::Apk => &["apk", "add"],
    }
}

fn remove_stem(pm: PackageManager) -> Stem {
    match pm {
        PackageManager::Pacman => &["pacman", "-Rs", "--noconfirm"],
        PackageManager::Dnf => &["dnf", "remove", "-y"],
        // autoremove also drops every other auto-installed package
        PackageManager::Apt => &["apt", "autoremove", "-y"],
        PackageManager::Zypper => &["zypper", "remove", "-y"],
        PackageManager::Xbps => &["xbps-remove", "-R", "-y"],
        PackageManager::Eopkg => &["eopkg", "remove", "-y"],
        PackageManager::Apk => &["apk", "del"],
    }
}

fn orphans_stem(pm: PackageManager) -> Stem {
    match pm {
        PackageManager::Pacman => &["pacman", "-Qdtq"],
        PackageManager::Dnf => &["dnf", "repoquery", "--unneeded"],
        // Auto-installed packages, close enough to orphans for apt
        PackageManager::Apt => &["apt-mark", "showauto"],
        PackageManager::Zypper
        | PackageManager::Xbps
        | PackageManager::Eopkg
        | PackageManager::Apk => &[],
    }
}

fn with_packages<S: AsRef<str>>(stem: Stem, packages: &[S]) -> Vec<String> {
    stem.iter()
        .map(|s| s.to_string())
        .chain(packages.iter().map(|p| p.as_ref().to_string()))
        .collect()
}

fn elevated(profile: &DistroProfile, argv: Vec<String>) -> CommandLine {
    CommandLine(profile.elevate(argv))
}

/// Update the package database.
pub fn refresh_database(profile: &DistroProfile) -> CommandLine {
    match profile.package_manager().map(refresh_stem) {
        Some(stem) if !stem.is_empty() => elevated(profile, with_packages::<&str>(stem, &[])),
        _ => CommandLine::unsupported(),
    }
}

/// Install packages non-interactively.
pub fn install<S: AsRef<str>>(profile: &DistroProfile, packages: &[S]) -> CommandLine {
    match profile.package_manager() {
        Some(pm) => elevated(profile, with_packages(install_stem(pm), packages)),
        None => CommandLine::unsupported(),
    }
}

/// Remove packages together with the dependencies they pulled in.
pub fn remove<S: AsRef<str>>(profile: &DistroProfile, packages: &[S]) -> CommandLine {
    match profile.package_manager() {
        Some(pm) => elevated(profile, with_packages(remove_stem(pm), packages)),
        None => CommandLine::unsupported(),
    }
}

/// Check whether a single package is installed. Exit status 0 means yes.
///
/// Never elevated. RPM based dialects ask the rpm database directly.
pub fn query(profile: &DistroProfile, package: &str) -> CommandLine {
    let Some(pm) = profile.package_manager() else {
        return CommandLine::unsupported();
    };
    match pm {
        PackageManager::Pacman => {
            let pattern = format!("^{package}$");
            CommandLine::new(["pacman", "-Qs", pattern.as_str()])
        }
        PackageManager::Dnf | PackageManager::Zypper => CommandLine::new(["rpm", "-q", package]),
        PackageManager::Apt => CommandLine::new(["dpkg", "-s", package]),
        PackageManager::Xbps => CommandLine::new(["xbps-query", "-S", package]),
        PackageManager::Eopkg => CommandLine::new(["eopkg", "info", package]),
        PackageManager::Apk => CommandLine::new(["apk", "info", "-e", package]),
    }
}

/// List packages nothing depends on anymore. Never elevated.
pub fn list_orphans(profile: &DistroProfile) -> CommandLine {
    match profile.package_manager().map(orphans_stem) {
        Some(stem) if !stem.is_empty() => CommandLine::new(stem.iter().copied()),
        _ => CommandLine::unsupported(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_for(pm: PackageManager, privileged: bool) -> DistroProfile {
        let id = match pm {
            PackageManager::Pacman => "arch",
            PackageManager::Dnf => "fedora",
            PackageManager::Apt => "debian",
            PackageManager::Zypper => "opensuse-tumbleweed",
            PackageManager::Xbps => "void",
            PackageManager::Eopkg => "solus",
            PackageManager::Apk => "alpine",
        };
        let profile = DistroProfile::from_id(id, privileged);
        assert_eq!(profile.package_manager(), Some(pm));
        profile
    }

    #[test]
    fn install_ends_with_packages_and_elevates_when_unprivileged() {
        for pm in PackageManager::ALL {
            for privileged in [false, true] {
                let cmd = install(&profile_for(pm, privileged), &["firefox"]);
                let argv = cmd.as_slice();
                assert!(!cmd.is_empty(), "{pm}");
                assert_eq!(argv.last().map(String::as_str), Some("firefox"), "{pm}");
                assert_eq!(cmd.program() == Some("pkexec"), !privileged, "{pm}");
            }
        }
    }

    #[test]
    fn install_stems() {
        let cmd = install(&profile_for(PackageManager::Pacman, true), &["mesa", "vulkan-radeon"]);
        assert_eq!(
            cmd.as_slice(),
            ["pacman", "-S", "--needed", "--noconfirm", "mesa", "vulkan-radeon"]
        );

        let cmd = install(&profile_for(PackageManager::Xbps, true), &["mesa"]);
        assert_eq!(cmd.as_slice(), ["xbps-install", "-S", "-y", "mesa"]);

        let cmd = install(&profile_for(PackageManager::Apk, false), &["mesa"]);
        assert_eq!(cmd.as_slice(), ["pkexec", "apk", "add", "mesa"]);
    }

    #[test]
    fn remove_stems() {
        let cmd = remove(&profile_for(PackageManager::Pacman, true), &["nvidia"]);
        assert_eq!(cmd.as_slice(), ["pacman", "-Rs", "--noconfirm", "nvidia"]);

        let cmd = remove(&profile_for(PackageManager::Apt, true), &["nvidia-driver"]);
        assert_eq!(cmd.as_slice(), ["apt", "autoremove", "-y", "nvidia-driver"]);

        let cmd = remove(&profile_for(PackageManager::Xbps, false), &["nvidia"]);
        assert_eq!(cmd.as_slice(), ["pkexec", "xbps-remove", "-R", "-y", "nvidia"]);
    }

    #[test]
    fn query_is_never_elevated() {
        for pm in PackageManager::ALL {
            let cmd = query(&profile_for(pm, false), "bluez");
            assert!(!cmd.is_empty());
            assert_ne!(cmd.program(), Some("pkexec"));
            assert!(cmd.as_slice().last().unwrap().contains("bluez"));
        }
    }

    #[test]
    fn query_uses_rpm_for_rpm_dialects() {
        for pm in [PackageManager::Dnf, PackageManager::Zypper] {
            let cmd = query(&profile_for(pm, false), "mesa");
            assert_eq!(cmd.as_slice(), ["rpm", "-q", "mesa"]);
        }
        let cmd = query(&profile_for(PackageManager::Pacman, false), "mesa");
        assert_eq!(cmd.as_slice(), ["pacman", "-Qs", "^mesa$"]);
    }

    #[test]
    fn refresh_only_for_supported_dialects() {
        let cmd = refresh_database(&profile_for(PackageManager::Zypper, false));
        assert_eq!(cmd.as_slice(), ["pkexec", "zypper", "refresh"]);

        for pm in [PackageManager::Xbps, PackageManager::Eopkg, PackageManager::Apk] {
            assert!(refresh_database(&profile_for(pm, false)).is_empty(), "{pm}");
        }
    }

    #[test]
    fn orphans_only_for_pacman_dnf_apt() {
        let cmd = list_orphans(&profile_for(PackageManager::Pacman, false));
        assert_eq!(cmd.as_slice(), ["pacman", "-Qdtq"]);
        let cmd = list_orphans(&profile_for(PackageManager::Apt, false));
        assert_eq!(cmd.as_slice(), ["apt-mark", "showauto"]);
        let cmd = list_orphans(&profile_for(PackageManager::Dnf, false));
        assert_eq!(cmd.as_slice(), ["dnf", "repoquery", "--unneeded"]);

        for pm in [
            PackageManager::Zypper,
            PackageManager::Xbps,
            PackageManager::Eopkg,
            PackageManager::Apk,
        ] {
            assert!(list_orphans(&profile_for(pm, false)).is_empty(), "{pm}");
        }
    }

    #[test]
    fn unknown_distro_builds_nothing() {
        let profile = DistroProfile::from_id("haiku", false);
        assert!(install(&profile, &["vim"]).is_empty());
        assert!(remove(&profile, &["vim"]).is_empty());
        assert!(query(&profile, "vim").is_empty());
        assert!(refresh_database(&profile).is_empty());
        assert!(list_orphans(&profile).is_empty());
    }

    #[test]
    fn require_rejects_unsupported() {
        let profile = DistroProfile::from_id("alpine", false);
        let err = list_orphans(&profile)
            .require(Operation::ListOrphans, &profile)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Unsupported {
                operation: Operation::ListOrphans,
                manager: "apk"
            }
        ));
        assert!(install(&profile, &["git"]).require(Operation::Install, &profile).is_ok());
    }

    #[test]
    fn command_line_display_quotes_arguments() {
        let cmd = CommandLine::new(["pacman", "-Qs", "^lib32 mesa$"]);
        assert_eq!(cmd.to_string(), "pacman -Qs '^lib32 mesa$'");
        assert_eq!(cmd.args().len(), 2);
        assert!(CommandLine::unsupported().args().is_empty());
    }
}
