//! resync: keep a Go implementation package in step with its contract
//! interfaces.
//!
//! # Usage
//!
//! ```text
//! resync sync  [--contracts <dir>] [--impl <dir>] [--dry-run] [--no-format]
//! resync check [--contracts <dir>] [--impl <dir>] [--json]
//! resync diff  [--contracts <dir>] [--impl <dir>] [--no-format]
//! ```
//!
//! Every subcommand reads `resync.yaml` from the working directory (or
//! `--config <file>`); flags override file values.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{check::CheckArgs, diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "resync",
    version,
    about = "Synchronize Go resolver implementations with their contract interfaces",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the implementation and write changed files.
    Sync(SyncArgs),

    /// Report what sync would do; exits non-zero when out of date.
    Check(CheckArgs),

    /// Show unified diffs of what sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
