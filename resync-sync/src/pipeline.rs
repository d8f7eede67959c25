//! Shared pipeline entrypoints used by `resync sync`, `check` and `diff`.
//!
//! One run is a single batch: load both modules, reconcile, then write the
//! dirty files back. Nothing is written before every load has succeeded.

use std::path::Path;

use serde::Serialize;

use resync_core::{Config, ConfigError, LoadError, SourceModel};
use resync_renderer::StubRenderer;

use crate::diff::{diff_files, FileDiff};
use crate::error::SyncError;
use crate::formatter::{CommandFormatter, Formatter, NoopFormatter};
use crate::reconcile::{Action, ActionKind, ReconcileOptions, Reconciler, Reconciliation};
use crate::writer::{plan_files, write_files, PlannedFile, WriteResult};

/// Everything a run would do, computed without touching disk.
#[derive(Debug)]
pub struct Plan {
    pub implementation: SourceModel,
    pub reconciliation: Reconciliation,
    pub files: Vec<PlannedFile>,
    /// Dirty files whose content could not be rendered.
    pub failed: Vec<WriteResult>,
}

/// Result of a `sync` run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub actions: Vec<Action>,
    pub writes: Vec<WriteResult>,
}

impl SyncReport {
    pub fn is_up_to_date(&self) -> bool {
        self.writes.is_empty() && !self.actions.iter().any(Action::is_change)
    }

    /// Stubs and receivers that could not be rendered.
    pub fn skipped(&self) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(|a| matches!(a.kind, ActionKind::Skipped { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriteResult> {
        self.writes.iter().filter(|w| w.is_failure())
    }
}

/// The formatter a run should use: the configured command, or a no-op when
/// formatting is disabled.
pub fn formatter_for(config: &Config, implementation_dir: &Path) -> Box<dyn Formatter> {
    if config.formatter.enabled {
        Box::new(CommandFormatter::from_config(&config.formatter, implementation_dir))
    } else {
        Box::new(NoopFormatter)
    }
}

/// Load, reconcile and merge. Nothing is written.
pub fn plan(config: &Config, formatter: &dyn Formatter) -> Result<Plan, SyncError> {
    let contracts_dir = config.contracts_dir()?;
    let implementation_dir = config.implementation_dir()?;

    let contracts = SourceModel::load(contracts_dir)?;
    tracing::debug!(
        "loaded contract package {} from {}",
        contracts.package(),
        contracts_dir.display()
    );
    let mut implementation = load_implementation(config, implementation_dir)?;

    let contract_import = infer_contract_import(config, &implementation, contracts.package())?;
    let options = ReconcileOptions::from_config(config, contract_import);
    let renderer = StubRenderer::new(config.templates.as_deref())?;

    let reconciliation = Reconciler::new(&options, &renderer).reconcile(&contracts, &mut implementation);
    let (files, failed) = plan_files(&implementation, &reconciliation, &renderer, formatter);

    Ok(Plan {
        implementation,
        reconciliation,
        files,
        failed,
    })
}

/// Full cycle. With `dry_run` every file is reported as
/// [`WriteResult::WouldWrite`] and the disk is left untouched.
pub fn run(config: &Config, formatter: &dyn Formatter, dry_run: bool) -> Result<SyncReport, SyncError> {
    let plan = plan(config, formatter)?;
    let mut writes = plan.failed;
    writes.extend(write_files(&plan.files, dry_run));
    writes.sort_by(|a, b| a.path().cmp(b.path()));

    Ok(SyncReport {
        actions: plan.reconciliation.actions,
        writes,
    })
}

/// Unified diffs between on-disk and would-be content of every dirty file.
pub fn diff(config: &Config, formatter: &dyn Formatter) -> Result<Vec<FileDiff>, SyncError> {
    let plan = plan(config, formatter)?;
    diff_files(&plan.files, plan.implementation.dir())
}

/// An implementation directory that is missing or has no sources yet is an
/// empty package.
fn load_implementation(config: &Config, dir: &Path) -> Result<SourceModel, SyncError> {
    match SourceModel::load(dir) {
        Ok(model) => Ok(model),
        Err(LoadError::NotFound { .. } | LoadError::NoSourceFiles { .. }) => {
            let package = config.package.clone().unwrap_or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            tracing::info!(
                "{} has no sources; starting package {package}",
                dir.display()
            );
            Ok(SourceModel::empty(dir, package))
        }
        Err(e) => Err(e.into()),
    }
}

/// The configured import path, or the first implementation import whose
/// package name is the contract package.
pub fn infer_contract_import(
    config: &Config,
    implementation: &SourceModel,
    contract_package: &str,
) -> Result<String, ConfigError> {
    if let Some(path) = &config.contract_import {
        return Ok(path.clone());
    }
    implementation
        .files()
        .iter()
        .flat_map(|f| f.imports.iter())
        .find(|i| i.name() == contract_package)
        .map(|i| i.path.clone())
        .ok_or(ConfigError::Missing {
            field: "contract_import",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(contracts: &Path, implementation: &Path) -> Config {
        Config {
            contracts: Some(contracts.to_path_buf()),
            implementation: Some(implementation.to_path_buf()),
            ..Config::default()
        }
    }

    fn fixture() -> (TempDir, Config) {
        let tmp = TempDir::new().expect("tmp");
        let gql = tmp.path().join("gql");
        let resolver = tmp.path().join("resolver");
        fs::create_dir_all(&gql).expect("mkdir");
        fs::create_dir_all(&resolver).expect("mkdir");
        fs::write(
            gql.join("generated.go"),
            "package gql\n\ntype ResolverRoot interface {\n\tQuery() QueryResolver\n}\n\ntype QueryResolver interface {\n\tPing() string\n}\n",
        )
        .expect("write");
        let config = config_for(&gql, &resolver);
        (tmp, config)
    }

    #[test]
    fn missing_contract_import_is_config_error() {
        let (tmp, config) = fixture();
        fs::write(
            tmp.path().join("resolver/base.go"),
            "package resolver\n\ntype Resolver struct{}\n",
        )
        .expect("write");
        let err = plan(&config, &NoopFormatter).unwrap_err();
        assert!(
            matches!(
                err,
                SyncError::Config(ConfigError::Missing {
                    field: "contract_import"
                })
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn contract_import_is_inferred_from_existing_imports() {
        let (tmp, config) = fixture();
        fs::write(
            tmp.path().join("resolver/base.go"),
            "package resolver\n\nimport \"example.com/app/gql\"\n\ntype Resolver struct{}\n\nvar _ gql.ResolverRoot = &Resolver{}\n",
        )
        .expect("write");
        let plan = plan(&config, &NoopFormatter).expect("plan");
        let ping = plan
            .files
            .iter()
            .find(|f| f.path.ends_with("query_ping.go"))
            .expect("stub file");
        assert!(ping.is_new);
        assert!(ping.content.starts_with("package resolver\n"));
    }

    #[test]
    fn empty_implementation_dir_uses_dir_name_as_package() {
        let (tmp, mut config) = fixture();
        config.contract_import = Some("example.com/app/gql".to_string());
        let report = run(&config, &NoopFormatter, false).expect("run");
        assert!(report.failures().next().is_none(), "{:?}", report.writes);

        let base = fs::read_to_string(tmp.path().join("resolver/base.go")).expect("base.go");
        assert!(base.starts_with("package resolver\n"));
        assert!(base.contains("type Resolver struct{}"));
        assert!(base.contains("func (r *Resolver) Query() (result gql.QueryResolver) {"));
        assert!(base.contains("\t\"example.com/app/gql\""));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (tmp, mut config) = fixture();
        config.contract_import = Some("example.com/app/gql".to_string());
        let report = run(&config, &NoopFormatter, true).expect("run");
        assert!(!report.writes.is_empty());
        assert!(report
            .writes
            .iter()
            .all(|w| matches!(w, WriteResult::WouldWrite { .. })));
        assert_eq!(fs::read_dir(tmp.path().join("resolver")).expect("dir").count(), 0);
    }

    #[test]
    fn missing_contract_dir_is_load_error() {
        let tmp = TempDir::new().expect("tmp");
        let config = config_for(&tmp.path().join("nope"), tmp.path());
        assert!(matches!(
            plan(&config, &NoopFormatter),
            Err(SyncError::Load(_))
        ));
    }

    #[test]
    fn formatter_disabled_is_noop() {
        let mut config = Config::default();
        config.formatter.enabled = false;
        let formatter = formatter_for(&config, Path::new("."));
        assert_eq!(
            formatter.format(Path::new("a.go"), "package a").expect("format"),
            "package a"
        );
    }
}
