//! `resync sync`: reconcile and write changed files.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use resync_sync::{pipeline, ActionKind, SyncReport, WriteResult};

use super::{display_path, formatter, ModuleArgs};

/// Arguments for `resync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub modules: ModuleArgs,

    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Write files without running the external formatter.
    #[arg(long)]
    pub no_format: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = self.modules.load_config()?;
        let formatter = formatter(&config, self.no_format)?;
        let report = pipeline::run(&config, formatter.as_ref(), self.dry_run).context("sync failed")?;

        print_report(&report, config.implementation.as_deref(), self.dry_run);

        let failed = report.failures().count();
        if failed > 0 {
            bail!("{failed} file(s) could not be written");
        }
        Ok(())
    }
}

fn print_report(report: &SyncReport, root: Option<&std::path::Path>, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.is_up_to_date() {
        println!("{prefix}✓ implementation is up to date");
        return;
    }

    let count = |f: fn(&ActionKind) -> bool| report.actions.iter().filter(|a| f(&a.kind)).count();
    println!(
        "{prefix}✓ synced ({} generated, {} patched, {} receivers, {} skipped)",
        count(|k| matches!(k, ActionKind::Generated)),
        count(|k| matches!(k, ActionKind::Patched { .. })),
        count(|k| matches!(k, ActionKind::ReceiverGenerated)),
        count(|k| matches!(k, ActionKind::Skipped { .. })),
    );

    for w in &report.writes {
        match w {
            WriteResult::Written { path, formatted } => {
                let note = if *formatted { "" } else { " (unformatted)" };
                println!("  ✎  {}{note}", display_path(path, root));
            }
            WriteResult::WouldWrite { path } => println!("  ~  {}", display_path(path, root)),
            WriteResult::Failed { path, reason } => {
                println!("  {}  {}: {reason}", "✗".red(), display_path(path, root));
            }
        }
    }

    for action in report.skipped() {
        if let ActionKind::Skipped { reason } = &action.kind {
            let target = match &action.method {
                Some(method) => format!("{}.{method}", action.receiver),
                None => action.receiver.clone(),
            };
            println!("  {}  skipped {target}: {reason}", "!".yellow());
        }
    }
}
