//! Host facts for the system overview.
//!
//! Each field is read on its own and falls back to a fixed "Unknown ..." value,
//! so one unreadable source never hides the others.

use serde::Serialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::drivers::matcher;

const KERNEL_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const CPUINFO_PATH: &str = "/proc/cpuinfo";
const MEMINFO_PATH: &str = "/proc/meminfo";

pub const UNKNOWN_OS: &str = "Unknown OS";
pub const UNKNOWN_KERNEL: &str = "Unknown Kernel";
pub const UNKNOWN_DESKTOP: &str = "Unknown Desktop";
pub const UNKNOWN_SESSION: &str = "Unknown Session";
pub const UNKNOWN_CPU: &str = "Unknown CPU";
pub const UNKNOWN_GPU: &str = "Unknown GPU";
pub const UNKNOWN_RAM: &str = "Unknown RAM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFacts {
    pub os_name: String,
    pub kernel_release: String,
    pub desktop_env: String,
    pub session_type: String,
    pub cpu_model: String,
    pub gpu_summary: String,
    pub ram_summary: String,
}

impl HostFacts {
    /// Label and value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 7] {
        [
            ("OS", self.os_name.as_str()),
            ("Kernel", self.kernel_release.as_str()),
            ("Desktop", self.desktop_env.as_str()),
            ("Session", self.session_type.as_str()),
            ("CPU", self.cpu_model.as_str()),
            ("GPU", self.gpu_summary.as_str()),
            ("RAM", self.ram_summary.as_str()),
        ]
    }
}

/// Collect host facts. `pci` is the `lspci -nnmm` listing used for the GPU
/// summary.
pub fn get_host_facts<S: AsRef<str>>(os_release: &Path, pci: &[S]) -> HostFacts {
    HostFacts {
        os_name: read_with(os_release, parse_pretty_name, UNKNOWN_OS),
        kernel_release: read_with(Path::new(KERNEL_RELEASE_PATH), parse_kernel_release, UNKNOWN_KERNEL),
        desktop_env: env_or("XDG_CURRENT_DESKTOP", UNKNOWN_DESKTOP),
        session_type: env_or("XDG_SESSION_TYPE", UNKNOWN_SESSION),
        cpu_model: read_with(Path::new(CPUINFO_PATH), parse_cpu_model, UNKNOWN_CPU),
        gpu_summary: matcher::gpu_summary(pci).unwrap_or_else(|| UNKNOWN_GPU.to_string()),
        ram_summary: read_with(Path::new(MEMINFO_PATH), parse_ram_summary, UNKNOWN_RAM),
    }
}

fn read_with(path: &Path, parse: fn(&str) -> Option<String>, fallback: &str) -> String {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| parse(&content))
        .unwrap_or_else(|| fallback.to_string())
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn parse_pretty_name(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("PRETTY_NAME="))
        .map(|v| v.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|v| !v.is_empty())
}

fn parse_kernel_release(content: &str) -> Option<String> {
    Some(content.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_cpu_model(content: &str) -> Option<String> {
    content
        .lines()
        .filter(|line| line.starts_with("model name"))
        .find_map(|line| line.split_once(':'))
        .map(|(_, model)| model.trim().to_string())
        .filter(|model| !model.is_empty())
}

/// `MemTotal` in GiB with one decimal.
fn parse_ram_summary(content: &str) -> Option<String> {
    let kb: f64 = content
        .lines()
        .find_map(|line| line.strip_prefix("MemTotal:"))?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(format!("{:.1} GB", kb / (1024.0 * 1024.0)))
}
