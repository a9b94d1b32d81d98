use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }
}

/// Isolated config and data directories plus a fake os-release file.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_home(&self) -> PathBuf {
        self.path().join("config")
    }

    /// Write an os-release file with the given `ID=` and return its path.
    pub fn os_release(&self, id: &str) -> Result<PathBuf> {
        let path = self.path().join(format!("os-release-{id}"));
        fs::write(&path, format!("NAME=\"Test {id}\"\nPRETTY_NAME=\"Test {id}\"\nID={id}\n"))?;
        Ok(path)
    }

    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Run the insert binary as distribution `id`.
    pub fn run(&self, id: &str, args: &[&str]) -> Result<CommandOutput> {
        let os_release = self.os_release(id)?;
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_insert"));
        cmd.arg("--os-release")
            .arg(&os_release)
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env("NO_COLOR", "1");

        let output = cmd.output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
