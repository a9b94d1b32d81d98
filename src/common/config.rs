//! User settings and first-run state.
//!
//! Two small documents live in the insert config directory:
//!
//! - `config.toml`: optional settings, every field defaulted
//! - `config.json`: `{"setup_done": true}` once the welcome has been shown

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::paths;
use crate::ui::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Driver database override, `~` is expanded
    pub database: Option<String>,
    /// Look for firmware updates during `scan`
    pub check_firmware: bool,
    /// Upper bound for a single `fwupdmgr get-updates` call
    pub firmware_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: None,
            check_firmware: true,
            firmware_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load settings from the default location.
    ///
    /// A missing file means defaults. A malformed file is reported and ignored.
    pub fn load() -> Self {
        match paths::settings_file() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                emit(
                    Level::Debug,
                    "config.path.unavailable",
                    &format!("No config directory available: {e}"),
                    None,
                );
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };

        match Self::parse(&contents) {
            Ok(config) => config,
            Err(e) => {
                emit(
                    Level::Warn,
                    "config.parse.failed",
                    &format!("Ignoring invalid settings in {}: {e:#}", path.display()),
                    None,
                );
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parsing config.toml")
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.database
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
    }

    pub fn firmware_timeout(&self) -> Duration {
        Duration::from_secs(self.firmware_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    #[serde(default)]
    pub setup_done: bool,
}

impl SetupState {
    /// Absent or unreadable state is treated as a first run.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|c| serde_json::from_str(&c).ok())
            .unwrap_or_default()
    }

    pub fn mark_done(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let state = SetupState { setup_done: true };
        let json = serde_json::to_string(&state).context("serializing setup state")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.check_firmware);
        assert_eq!(config.firmware_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = AppConfig::parse("check_firmware = false\n").unwrap();
        assert!(!config.check_firmware);
        assert_eq!(config.firmware_timeout_secs, 60);
        assert_eq!(config.database, None);
    }

    #[test]
    fn database_path_expands_tilde() {
        let config = AppConfig {
            database: Some("~/drivers.json".to_string()),
            ..Default::default()
        };
        let path = config.database_path().unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("drivers.json"));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = AppConfig {
            firmware_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.firmware_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn missing_settings_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn setup_state_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        assert!(!SetupState::load_from(&path).setup_done);
        SetupState::mark_done(&path).unwrap();
        assert!(SetupState::load_from(&path).setup_done);
    }

    #[test]
    fn garbage_setup_state_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(!SetupState::load_from(&path).setup_done);
    }
}
