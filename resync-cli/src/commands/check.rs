//! `resync check`: per-method status without writing anything.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use resync_sync::{pipeline, Action, ActionKind, NoopFormatter};

use super::{display_path, ModuleArgs};

/// Arguments for `resync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub modules: ModuleArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CheckReportJson<'a> {
    up_to_date: bool,
    actions: &'a [Action],
}

#[derive(Tabled)]
struct CheckTableRow {
    #[tabled(rename = "contract")]
    contract: String,
    #[tabled(rename = "method")]
    method: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "file")]
    file: String,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let config = self.modules.load_config()?;
        // Formatting does not change which methods are out of date.
        let plan = pipeline::plan(&config, &NoopFormatter).context("check failed")?;
        let actions = &plan.reconciliation.actions;
        let up_to_date = plan.reconciliation.is_up_to_date();

        if self.json {
            let payload = CheckReportJson {
                up_to_date,
                actions,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize check JSON")?
            );
        } else {
            print_table(actions, plan.implementation.dir(), up_to_date);
        }

        if !up_to_date {
            bail!("implementation is out of date; run `resync sync`");
        }
        Ok(())
    }
}

fn print_table(actions: &[Action], root: &Path, up_to_date: bool) {
    let rows: Vec<CheckTableRow> = actions
        .iter()
        .map(|a| CheckTableRow {
            contract: a.contract.clone(),
            method: a.method.clone().unwrap_or_else(|| "-".to_string()),
            status: status_label(&a.kind),
            file: display_path(&a.file, Some(root)),
        })
        .collect();
    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    let changes = actions.iter().filter(|a| a.is_change()).count();
    if up_to_date {
        println!("{} {} methods up to date", "■".green().bold(), actions.len());
    } else {
        println!("{} {changes} change(s) pending", "■".yellow().bold());
    }
}

fn status_label(kind: &ActionKind) -> String {
    match kind {
        ActionKind::Match => "ok".green().to_string(),
        ActionKind::Patched { guarded: true } => "signature drift".yellow().to_string(),
        ActionKind::Patched { guarded: false } => "signature drift (stub)".yellow().to_string(),
        ActionKind::Generated => "missing".red().to_string(),
        ActionKind::ReceiverGenerated => "missing receiver".red().to_string(),
        ActionKind::Skipped { reason } => format!("{} ({reason})", "skipped".magenta()),
    }
}
