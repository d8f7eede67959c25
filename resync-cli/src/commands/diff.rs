//! `resync diff`: show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use resync_sync::pipeline;

use super::{formatter, ModuleArgs};

/// Arguments for `resync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub modules: ModuleArgs,

    /// Diff against unformatted output.
    #[arg(long)]
    pub no_format: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let config = self.modules.load_config()?;
        let formatter = formatter(&config, self.no_format)?;
        let diffs = pipeline::diff(&config, formatter.as_ref()).context("diff failed")?;

        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
