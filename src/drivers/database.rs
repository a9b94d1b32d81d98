//! The driver database.
//!
//! A JSON document whose top-level keys are category names mapping to arrays
//! of driver descriptors. The reserved `essentials` key maps a family to the
//! baseline packages of a fresh install instead.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::common::distro::Family;
use crate::ui::prelude::*;

const ESSENTIALS_KEY: &str = "essentials";

/// Package lists are keyed by family, with `arch` doubling as the default.
const DEFAULT_PACKAGE_KEY: &str = "arch";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("driver database not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read driver database {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("driver database {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("driver database {} must be a JSON object", path.display())]
    NotAnObject { path: PathBuf },
}

impl DatabaseError {
    pub fn code(&self) -> &'static str {
        match self {
            DatabaseError::Missing { .. } => "drivers.database.missing",
            DatabaseError::Read { .. } => "drivers.database.unreadable",
            DatabaseError::Parse { .. } | DatabaseError::NotAnObject { .. } => {
                "drivers.database.invalid"
            }
        }
    }
}

/// On-disk shape of one descriptor. The category comes from the enclosing key.
#[derive(Debug, Deserialize)]
struct DescriptorRecord {
    name: String,
    #[serde(default)]
    class_id: Option<String>,
    search_patterns: Vec<String>,
    #[serde(default)]
    packages: BTreeMap<String, Vec<String>>,
}

/// A driver, the devices it applies to and the packages that provide it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverDescriptor {
    pub name: String,
    pub category: String,
    /// 4-hex-digit PCI class the device line must carry as `[class]`
    pub class_id: Option<String>,
    /// Case-insensitive substrings, any of which selects a device line
    pub search_patterns: Vec<String>,
    pub packages: BTreeMap<String, Vec<String>>,
}

impl DriverDescriptor {
    /// Packages for `family`, falling back to the `arch` list.
    ///
    /// `None` when neither list exists or both are empty.
    pub fn resolve_packages(&self, family: Family) -> Option<&[String]> {
        let non_empty = |key: &str| {
            self.packages
                .get(key)
                .filter(|pkgs| !pkgs.is_empty())
                .map(Vec::as_slice)
        };
        non_empty(family.as_str()).or_else(|| non_empty(DEFAULT_PACKAGE_KEY))
    }

    /// Whether a raw device line is one this driver is for.
    pub fn matches_line(&self, line: &str) -> bool {
        if let Some(class_id) = &self.class_id
            && !crate::hardware::device::has_class(line, class_id)
        {
            return false;
        }
        let line = line.to_lowercase();
        self.search_patterns
            .iter()
            .any(|pattern| line.contains(&pattern.to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub drivers: Vec<DriverDescriptor>,
}

/// Loaded once per process and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriverDatabase {
    /// In document order
    pub categories: Vec<Category>,
    pub essentials: BTreeMap<String, Vec<String>>,
}

impl DriverDatabase {
    /// Load the database, degrading to an empty one with a warning.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(db) => {
                emit(
                    Level::Debug,
                    "drivers.database.loaded",
                    &format!(
                        "Loaded {} drivers in {} categories from {}",
                        db.driver_count(),
                        db.categories.len(),
                        path.display()
                    ),
                    None,
                );
                db
            }
            Err(e) => {
                emit(Level::Warn, e.code(), &e.to_string(), None);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, DatabaseError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                DatabaseError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                DatabaseError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let document: Value =
            serde_json::from_str(&content).map_err(|source| DatabaseError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        match document {
            Value::Object(map) => Ok(Self::from_map(map)),
            _ => Err(DatabaseError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Build from JSON text. Used for fixtures and embedded data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_map(map))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut db = Self::default();

        for (key, value) in map {
            if key == ESSENTIALS_KEY {
                db.essentials = parse_essentials(value);
                continue;
            }

            let Value::Array(records) = value else {
                emit(
                    Level::Debug,
                    "drivers.database.skip_category",
                    &format!("Ignoring non-list category '{key}'"),
                    None,
                );
                continue;
            };

            let drivers = records
                .into_iter()
                .filter_map(|record| parse_descriptor(&key, record))
                .collect();
            db.categories.push(Category { name: key, drivers });
        }

        db
    }

    /// Baseline packages for a family; empty when the database has none.
    pub fn essentials(&self, family: Family) -> &[String] {
        self.essentials
            .get(family.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn driver_count(&self) -> usize {
        self.categories.iter().map(|c| c.drivers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.essentials.is_empty()
    }
}

fn parse_descriptor(category: &str, record: Value) -> Option<DriverDescriptor> {
    match serde_json::from_value::<DescriptorRecord>(record) {
        Ok(r) => Some(DriverDescriptor {
            name: r.name,
            category: category.to_string(),
            class_id: r.class_id.filter(|c| !c.is_empty()),
            search_patterns: r.search_patterns,
            packages: r.packages,
        }),
        Err(e) => {
            emit(
                Level::Debug,
                "drivers.database.skip_record",
                &format!("Ignoring malformed record in '{category}': {e}"),
                None,
            );
            None
        }
    }
}

fn parse_essentials(value: Value) -> BTreeMap<String, Vec<String>> {
    serde_json::from_value(value).unwrap_or_else(|e| {
        emit(
            Level::Warn,
            "drivers.database.essentials_invalid",
            &format!("Ignoring malformed essentials table: {e}"),
            None,
        );
        BTreeMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/drivers.json"));

    #[test]
    fn shipped_database_loads() {
        let db = DriverDatabase::from_json(SHIPPED).unwrap();
        let names: Vec<_> = db.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gpu", "network", "bluetooth", "printers", "input"]);
        assert!(db.driver_count() > 5);
        assert!(db.essentials(Family::Arch).contains(&"git".to_string()));
    }

    #[test]
    fn category_order_follows_document() {
        let db = DriverDatabase::from_json(
            r#"{"zeta": [], "alpha": [], "mid": []}"#,
        )
        .unwrap();
        let names: Vec<_> = db.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn records_without_patterns_and_non_lists_are_skipped() {
        let db = DriverDatabase::from_json(
            r#"{
                "gpu": [
                    {"name": "No patterns", "packages": {"arch": ["x"]}},
                    "not a record",
                    {"name": "Kept", "search_patterns": ["foo"]}
                ],
                "version": 3,
                "essentials": {"arch": ["git"]}
            }"#,
        )
        .unwrap();
        assert_eq!(db.categories.len(), 1);
        assert_eq!(db.categories[0].drivers.len(), 1);
        assert_eq!(db.categories[0].drivers[0].name, "Kept");
        assert_eq!(db.categories[0].drivers[0].category, "gpu");
        assert_eq!(db.essentials(Family::Arch), ["git"]);
        assert!(db.essentials(Family::Void).is_empty());
    }

    #[test]
    fn resolve_packages_falls_back_to_arch() {
        let db = DriverDatabase::from_json(
            r#"{"gpu": [{
                "name": "Driver",
                "search_patterns": ["x"],
                "packages": {"arch": ["a"], "debian": ["d"], "fedora": []}
            }]}"#,
        )
        .unwrap();
        let driver = &db.categories[0].drivers[0];
        assert_eq!(driver.resolve_packages(Family::Debian), Some(&["d".to_string()][..]));
        assert_eq!(driver.resolve_packages(Family::Fedora), Some(&["a".to_string()][..]));
        assert_eq!(driver.resolve_packages(Family::Void), Some(&["a".to_string()][..]));
    }

    #[test]
    fn resolve_packages_without_family_or_arch() {
        let db = DriverDatabase::from_json(
            r#"{"gpu": [{"name": "Driver", "search_patterns": ["x"], "packages": {"debian": ["d"]}}]}"#,
        )
        .unwrap();
        assert_eq!(db.categories[0].drivers[0].resolve_packages(Family::Fedora), None);
    }

    #[test]
    fn class_filter_and_case_insensitive_patterns() {
        let db = DriverDatabase::from_json(
            r#"{"network": [{"name": "Broadcom", "class_id": "0280", "search_patterns": ["broadcom"]}]}"#,
        )
        .unwrap();
        let driver = &db.categories[0].drivers[0];
        assert!(driver.matches_line(r#"02:00.0 "Network controller [0280]" "Broadcom Inc. and subsidiaries [14e4]" "BCM4360 [43a0]""#));
        assert!(!driver.matches_line("Bus 001 Device 004: ID 0a5c:21e8 Broadcom Corp. BCM20702A0"));
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivers.json");
        assert!(matches!(
            DriverDatabase::try_load(&path),
            Err(DatabaseError::Missing { .. })
        ));
        assert!(DriverDatabase::load(&path).is_empty());
    }

    #[test]
    fn malformed_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivers.json");
        fs::write(&path, "{ not json").unwrap();
        let err = DriverDatabase::try_load(&path).unwrap_err();
        assert_eq!(err.code(), "drivers.database.invalid");
        assert!(DriverDatabase::load(&path).is_empty());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            DriverDatabase::try_load(&path),
            Err(DatabaseError::NotAnObject { .. })
        ));
    }
}
