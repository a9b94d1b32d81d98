//! Installation status of matched and listed packages.
//!
//! Answers are correct as of the query; nothing is cached.

use serde::Serialize;

use super::matcher::DriverMatch;
use crate::common::distro::DistroProfile;
use crate::common::package::QueryRunner;
use crate::common::package::commands;

/// Whether `package` is installed. Any failure, including an unsupported
/// package manager, counts as not installed.
pub fn is_package_installed(profile: &DistroProfile, runner: &impl QueryRunner, package: &str) -> bool {
    let query = commands::query(profile, package);
    !query.is_empty() && runner.succeeds(&query)
}

/// Fill in `missing_packages` and `is_installed` for every match.
pub fn enrich(
    matches: Vec<DriverMatch>,
    profile: &DistroProfile,
    runner: &impl QueryRunner,
) -> Vec<DriverMatch> {
    matches
        .into_iter()
        .map(|mut m| {
            m.missing_packages = m
                .packages
                .iter()
                .filter(|pkg| !is_package_installed(profile, runner, pkg))
                .cloned()
                .collect();
            m.is_installed = m.missing_packages.is_empty();
            m
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub installed: bool,
}

pub fn package_statuses<S: AsRef<str>>(
    packages: &[S],
    profile: &DistroProfile,
    runner: &impl QueryRunner,
) -> Vec<PackageStatus> {
    packages
        .iter()
        .map(|pkg| PackageStatus {
            name: pkg.as_ref().to_string(),
            installed: is_package_installed(profile, runner, pkg.as_ref()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::package::{CommandError, CommandLine};
    use std::cell::RefCell;

    /// Treats the last argument of a query as the package name.
    struct Installed {
        packages: Vec<&'static str>,
        seen: RefCell<Vec<Vec<String>>>,
    }

    impl Installed {
        fn new(packages: &[&'static str]) -> Self {
            Self {
                packages: packages.to_vec(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl QueryRunner for Installed {
        fn succeeds(&self, command: &CommandLine) -> bool {
            self.seen.borrow_mut().push(command.as_slice().to_vec());
            command
                .as_slice()
                .last()
                .is_some_and(|pkg| self.packages.iter().any(|p| *p == pkg.as_str()))
        }

        fn read_lines(&self, _command: &CommandLine) -> Result<Vec<String>, CommandError> {
            Ok(Vec::new())
        }
    }

    fn driver(packages: &[&str]) -> DriverMatch {
        DriverMatch {
            driver_name: "AMD Radeon Graphics".into(),
            device_raw: "03:00.0 \"VGA compatible controller [0300]\"".into(),
            packages: packages.iter().map(|p| p.to_string()).collect(),
            category: "gpu".into(),
            missing_packages: Vec::new(),
            is_installed: false,
        }
    }

    #[test]
    fn missing_packages_are_listed_in_order() {
        let profile = DistroProfile::from_id("debian", false);
        let runner = Installed::new(&["mesa-vulkan-drivers"]);
        let enriched = enrich(
            vec![driver(&["libgl1-mesa-dri", "mesa-vulkan-drivers", "mesa-va-drivers"])],
            &profile,
            &runner,
        );
        assert_eq!(enriched[0].missing_packages, vec!["libgl1-mesa-dri", "mesa-va-drivers"]);
        assert!(!enriched[0].is_installed);
        // query commands are never elevated
        assert_eq!(runner.seen.borrow()[0], vec!["dpkg", "-s", "libgl1-mesa-dri"]);
    }

    #[test]
    fn fully_installed_match() {
        let profile = DistroProfile::from_id("fedora", false);
        let runner = Installed::new(&["mesa-dri-drivers"]);
        let enriched = enrich(vec![driver(&["mesa-dri-drivers"])], &profile, &runner);
        assert!(enriched[0].missing_packages.is_empty());
        assert!(enriched[0].is_installed);
    }

    #[test]
    fn unknown_package_manager_means_nothing_installed() {
        let profile = DistroProfile::from_id("plan9", false);
        let runner = Installed::new(&["mesa"]);
        let enriched = enrich(vec![driver(&["mesa"])], &profile, &runner);
        assert_eq!(enriched[0].missing_packages, vec!["mesa"]);
        assert!(runner.seen.borrow().is_empty());
    }

    #[test]
    fn package_statuses_report_each_package() {
        let profile = DistroProfile::from_id("alpine", true);
        let runner = Installed::new(&["git"]);
        let statuses = package_statuses(&["git", "curl"], &profile, &runner);
        assert_eq!(
            statuses,
            vec![
                PackageStatus { name: "git".into(), installed: true },
                PackageStatus { name: "curl".into(), installed: false },
            ]
        );
    }
}
