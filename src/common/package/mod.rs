//! Distro-agnostic package management.
//!
//! # Architecture
//!
//! - [`PackageManager`]: the closed set of supported dialects
//! - [`commands`]: pure builders producing [`CommandLine`] argument vectors
//! - [`cleanup`]: housekeeping tasks per profile
//! - [`runner`]: the only place that actually spawns processes
//!
//! An empty [`CommandLine`] means "not supported here". Use
//! [`CommandLine::require`] before handing a command to the runner.

pub mod cleanup;
pub mod commands;
mod error;
mod manager;
pub mod orphans;
pub mod runner;

pub use cleanup::CleanupTask;
pub use commands::{CommandLine, Operation};
pub use error::CommandError;
pub use manager::PackageManager;
pub use orphans::OrphanReport;
pub use runner::{QueryRunner, SystemRunner};
