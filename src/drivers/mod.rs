//! Driver discovery: the driver database, matching device listings against it
//! and checking which of the matched packages are installed.

pub mod command;
pub mod database;
pub mod essentials;
pub mod matcher;
pub mod status;
