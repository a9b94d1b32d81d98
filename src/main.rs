mod common;
mod completions;
mod context;
mod drivers;
mod hardware;
mod maintenance;
mod setup;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use colored::*;
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::common::paths;
use crate::completions::SupportedShell;
use crate::context::AppContext;
use crate::hardware::FirmwareCommands;
use crate::ui::prelude::*;

/// Find missing hardware drivers and manage packages on any Linux distribution
#[derive(Parser, Debug)]
#[command(name = "insert", author, version, about, long_about = None)]
struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    output: OutputFormat,

    /// Read the distribution from this os-release file
    #[arg(long, value_name = "PATH", global = true)]
    os_release: Option<PathBuf>,

    /// Driver database to use instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    database: Option<PathBuf>,

    /// Show the first-run welcome again
    #[arg(long, global = true)]
    reset_setup: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the detected distribution and package manager
    Distro,
    /// Show a system overview
    Info,
    /// Scan hardware for missing drivers
    Scan {
        /// Skip the firmware update check
        #[arg(long)]
        no_firmware: bool,
    },
    /// List baseline packages for this distribution and their status
    Essentials {
        /// List optional desktop tools instead
        #[arg(long)]
        optional: bool,
    },
    /// Install packages
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove packages together with unneeded dependencies
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Refresh package and firmware metadata
    Refresh {
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },
    /// List packages nothing depends on anymore
    Orphans,
    /// List cleanup tasks, or run one
    Cleanup {
        /// Task to run, e.g. package-cache
        task: Option<String>,
        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Firmware updates through fwupd
    Firmware {
        #[command(subcommand)]
        command: FirmwareCommands,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: SupportedShell,
    },
}

pub(crate) fn cli_command() -> clap::Command {
    Cli::command()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(cli.output, std::io::stdout().is_terminal());

    if let Err(e) = run(cli).await {
        emit(Level::Error, "insert.error", &format!("Error: {e:#}"), None);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        print!("{}", completions::generate(*shell)?);
        return Ok(());
    }

    let ctx = AppContext::init(cli.os_release, cli.database)?;

    if cli.command.is_none() || cli.reset_setup {
        let shown = setup::maybe_welcome(&ctx, &paths::setup_state_file()?, cli.reset_setup)?;
        if cli.command.is_none() {
            if !shown {
                println!("insert: run with --help for usage");
            }
            return Ok(());
        }
    }

    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Distro => print_distro(&ctx),
        Commands::Info => hardware::command::handle_info(&ctx).await,
        Commands::Scan { no_firmware } => drivers::command::handle_scan(&ctx, no_firmware).await,
        Commands::Essentials { optional } => {
            drivers::command::handle_essentials(&ctx, optional).await
        }
        Commands::Install { packages, dry_run } => {
            maintenance::command::handle_install(&ctx, &packages, dry_run)
        }
        Commands::Remove {
            packages,
            dry_run,
            yes,
        } => maintenance::command::handle_remove(&ctx, &packages, dry_run, yes),
        Commands::Refresh { dry_run } => maintenance::command::handle_refresh(&ctx, dry_run),
        Commands::Orphans => maintenance::command::handle_orphans(&ctx),
        Commands::Cleanup { task, dry_run, yes } => {
            maintenance::command::handle_cleanup(&ctx, task.as_deref(), dry_run, yes)
        }
        Commands::Firmware { command } => hardware::command::handle_firmware(&ctx, command).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn print_distro(ctx: &AppContext) -> Result<()> {
    let profile = &ctx.profile;
    if is_json() {
        return print_json(profile);
    }

    println!("{: <17} {}", "Distribution:".bold(), profile.id());
    println!("{: <17} {}", "Family:".bold(), profile.family());
    println!(
        "{: <17} {}",
        "Package manager:".bold(),
        profile.package_manager_name()
    );
    println!(
        "{: <17} {}",
        "Privileged:".bold(),
        if profile.is_privileged() { "yes" } else { "no" }
    );
    Ok(())
}
