//! Housekeeping tasks offered on the cleanup page.

use serde::Serialize;

use super::PackageManager;
use super::commands::CommandLine;
use crate::common::distro::DistroProfile;

/// A named, directly executable maintenance command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupTask {
    pub name: &'static str,
    pub command: CommandLine,
    pub description: &'static str,
}

impl CleanupTask {
    fn new(profile: &DistroProfile, name: &'static str, argv: &[&str], description: &'static str) -> Self {
        let argv = argv.iter().map(|s| s.to_string()).collect();
        Self {
            name,
            command: CommandLine::new(profile.elevate(argv)),
            description,
        }
    }
}

fn package_cache_task(profile: &DistroProfile) -> Option<CleanupTask> {
    let task = match profile.package_manager()? {
        PackageManager::Pacman => CleanupTask::new(
            profile,
            "Package Cache",
            &["pacman", "-Sc", "--noconfirm"],
            "Clear old package downloads",
        ),
        PackageManager::Dnf => CleanupTask::new(
            profile,
            "DNF Cache",
            &["dnf", "clean", "all"],
            "Clear DNF metadata and cache",
        ),
        PackageManager::Apt => CleanupTask::new(
            profile,
            "APT Cache",
            &["apt", "clean"],
            "Clear APT package cache",
        ),
        PackageManager::Zypper
        | PackageManager::Xbps
        | PackageManager::Eopkg
        | PackageManager::Apk => return None,
    };
    Some(task)
}

/// Enumerate the cleanup tasks for this profile.
///
/// `journal_available` controls the log trimming task; the temporary
/// directory purge is always offered.
pub fn cleanup_tasks(profile: &DistroProfile, journal_available: bool) -> Vec<CleanupTask> {
    let mut tasks: Vec<CleanupTask> = package_cache_task(profile).into_iter().collect();

    if journal_available {
        tasks.push(CleanupTask::new(
            profile,
            "System Logs",
            &["journalctl", "--vacuum-time=7d"],
            "Remove logs older than 7 days",
        ));
    }

    // Top-level, non-hidden entries only, like `rm -rf /tmp/*` would
    tasks.push(CleanupTask::new(
        profile,
        "Temporary Files",
        &[
            "find", "/tmp", "-mindepth", "1", "-maxdepth", "1", "!", "-name", ".*", "-exec",
            "rm", "-rf", "{}", "+",
        ],
        "Clear system /tmp directory",
    ));

    tasks
}

/// Cleanup tasks for the running system.
pub fn system_cleanup_tasks(profile: &DistroProfile) -> Vec<CleanupTask> {
    cleanup_tasks(profile, which::which("journalctl").is_ok())
}
