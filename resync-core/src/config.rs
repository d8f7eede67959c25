//! `resync.yaml` configuration.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration as long as the two module directories are supplied
//! on the command line. Relative paths in the file resolve against the
//! directory containing it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE: &str = "resync.yaml";

pub const DEFAULT_GUARD_MESSAGE: &str = "FIXME: method signature updated, please check";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory of the contract module.
    pub contracts: Option<PathBuf>,
    /// Directory of the implementation module.
    pub implementation: Option<PathBuf>,
    /// Import path of the contract module as seen from the implementation.
    /// Inferred from existing implementation imports when unset.
    pub contract_import: Option<String>,
    /// Package name for an implementation directory with no files yet.
    pub package: Option<String>,
    /// Directory of `.tera` files overriding the built-in stub templates.
    pub templates: Option<PathBuf>,
    pub root_contract: String,
    pub root_receiver: String,
    pub suffix: String,
    pub base_file: String,
    pub guard_message: String,
    /// Interfaces that are never reconciled.
    pub skip: Vec<String>,
    pub formatter: FormatterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            contracts: None,
            implementation: None,
            contract_import: None,
            package: None,
            templates: None,
            root_contract: "ResolverRoot".to_string(),
            root_receiver: "Resolver".to_string(),
            suffix: "Resolver".to_string(),
            base_file: "base.go".to_string(),
            guard_message: DEFAULT_GUARD_MESSAGE.to_string(),
            skip: Vec::new(),
            formatter: FormatterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    /// Program and arguments. `{dir}` is replaced by the implementation
    /// directory.
    pub command: Vec<String>,
    pub timeout_secs: u64,
    pub enabled: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        FormatterConfig {
            command: vec!["goimports".to_string()],
            timeout_secs: 10,
            enabled: true,
        }
    }
}

impl FormatterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load `path`. Relative module paths are resolved against its parent.
    pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        let base = path.parent().unwrap_or(Path::new("."));
        config.contracts = config.contracts.map(|p| base.join(p));
        config.implementation = config.implementation.map(|p| base.join(p));
        config.templates = config.templates.map(|p| base.join(p));
        Ok(config)
    }

    /// Load `<dir>/resync.yaml` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Config, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Config::load_at(&path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn contracts_dir(&self) -> Result<&Path, ConfigError> {
        self.contracts
            .as_deref()
            .ok_or(ConfigError::Missing { field: "contracts" })
    }

    pub fn implementation_dir(&self) -> Result<&Path, ConfigError> {
        self.implementation
            .as_deref()
            .ok_or(ConfigError::Missing {
                field: "implementation",
            })
    }
}
