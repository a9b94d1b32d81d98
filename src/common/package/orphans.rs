use serde::Serialize;

use super::commands;
use super::runner::QueryRunner;
use crate::common::distro::DistroProfile;
use crate::ui::prelude::*;

/// Outcome of an orphan scan.
///
/// `Unavailable` means the package manager has no orphan listing at all, which
/// is different from finding none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "packages", rename_all = "lowercase")]
pub enum OrphanReport {
    Unavailable,
    Found(Vec<String>),
}

pub fn find_orphans(profile: &DistroProfile, runner: &impl QueryRunner) -> OrphanReport {
    let command = commands::list_orphans(profile);
    if command.is_empty() {
        return OrphanReport::Unavailable;
    }

    match runner.read_lines(&command) {
        Ok(packages) => OrphanReport::Found(packages),
        Err(e) => {
            emit(
                Level::Warn,
                "package.orphans.failed",
                &format!("Could not list orphaned packages: {e}"),
                None,
            );
            OrphanReport::Found(Vec::new())
        }
    }
}
