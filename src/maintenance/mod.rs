//! Package installation, removal, refresh and housekeeping from the command
//! line.

pub mod command;
pub mod exec;
