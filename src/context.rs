use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common::config::AppConfig;
use crate::common::distro::{DistroProfile, OS_RELEASE_PATH};
use crate::common::paths;
use crate::drivers::database::DriverDatabase;
use crate::ui::prelude::*;

/// Everything resolved once at startup and shared by all commands.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub profile: DistroProfile,
    pub config: AppConfig,
    pub os_release: PathBuf,
    pub database_path: PathBuf,
}

impl AppContext {
    pub fn init(os_release: Option<PathBuf>, database: Option<PathBuf>) -> Result<Self> {
        let config = AppConfig::load();
        let (profile, os_release) = match os_release {
            Some(path) => (DistroProfile::resolve_from(&path)?, path),
            None => (DistroProfile::resolve()?, PathBuf::from(OS_RELEASE_PATH)),
        };
        let database_path = paths::driver_database(database.or_else(|| config.database_path()));

        emit(
            Level::Debug,
            "context.database",
            &format!("Using driver database {}", database_path.display()),
            None,
        );

        Ok(Self {
            profile,
            config,
            os_release,
            database_path,
        })
    }

    pub fn os_release(&self) -> &Path {
        &self.os_release
    }

    pub fn load_database(&self) -> DriverDatabase {
        DriverDatabase::load(&self.database_path)
    }
}
