pub mod check;
pub mod diff;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use resync_core::Config;
use resync_sync::{formatter_for, Formatter, NoopFormatter};

/// Module locations and overrides shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct ModuleArgs {
    /// Configuration file (default: ./resync.yaml if present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of the contract (generated interfaces) package.
    #[arg(long, value_name = "DIR")]
    pub contracts: Option<PathBuf>,

    /// Directory of the implementation package.
    #[arg(long = "impl", value_name = "DIR")]
    pub implementation: Option<PathBuf>,

    /// Import path of the contract package, as used by the implementation.
    #[arg(long, value_name = "PATH")]
    pub contract_import: Option<String>,

    /// Directory of `.tera` files overriding the built-in stub templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,
}

impl ModuleArgs {
    /// Config file values with command-line overrides applied.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_at(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => {
                let cwd = std::env::current_dir().context("could not determine working directory")?;
                Config::discover(&cwd).context("failed to load resync.yaml")?
            }
        };
        if let Some(dir) = &self.contracts {
            config.contracts = Some(dir.clone());
        }
        if let Some(dir) = &self.implementation {
            config.implementation = Some(dir.clone());
        }
        if let Some(path) = &self.contract_import {
            config.contract_import = Some(path.clone());
        }
        if let Some(dir) = &self.templates {
            config.templates = Some(dir.clone());
        }
        Ok(config)
    }
}

/// The configured formatter, or a no-op when `no_format` is set.
pub fn formatter(config: &Config, no_format: bool) -> Result<Box<dyn Formatter>> {
    if no_format {
        return Ok(Box::new(NoopFormatter));
    }
    let dir = config
        .implementation_dir()
        .context("no implementation directory configured")?;
    Ok(formatter_for(config, dir))
}

/// `path` relative to `root` for display.
pub fn display_path(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|r| path.strip_prefix(r).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}
