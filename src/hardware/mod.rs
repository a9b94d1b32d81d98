//! Hardware enumeration: device listings, firmware updates and host facts.

pub mod command;
pub mod device;
pub mod enumerate;
pub mod error;
pub mod facts;
pub mod firmware;

#[derive(clap::Subcommand, Debug, Clone)]
pub enum FirmwareCommands {
    /// Check fwupd for pending firmware updates
    Check,
    /// Apply all pending firmware updates
    Update {
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}
