//! The reconciler: walks every contract and decides, per required method,
//! whether the implementation matches, needs its signature patched, or
//! needs a new stub.
//!
//! Patches are applied to the implementation model in place. New text is
//! collected in [`PendingEdits`] keyed by destination file. Every file that
//! must be written ends up in the [`DirtySet`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use resync_core::syntax::default_package_name;
use resync_core::types::{Contract, ContractMethod, ImplMethod, MethodSignature};
use resync_core::{Config, Import, SourceModel};
use resync_renderer::StubRenderer;

use crate::compare::{is_structurally_equal, translate};
use crate::naming::Naming;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// What the reconciler did for one contract method or receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    /// Implementation already matches the contract.
    Match,
    /// Signature rewritten in place; `guarded` if a guard statement was added.
    Patched { guarded: bool },
    /// New method stub.
    Generated,
    /// New receiver type declaration.
    ReceiverGenerated,
    /// Stub could not be rendered.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub contract: String,
    pub receiver: String,
    /// `None` for receiver-level actions.
    pub method: Option<String>,
    pub file: PathBuf,
    #[serde(flatten)]
    pub kind: ActionKind,
}

impl Action {
    /// Anything other than a match means the implementation is out of date.
    pub fn is_change(&self) -> bool {
        !matches!(self.kind, ActionKind::Match)
    }
}

/// Text appended to one file, plus the imports that text needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdit {
    pub imports: BTreeSet<Import>,
    pub text: String,
}

pub type PendingEdits = BTreeMap<PathBuf, PendingEdit>;
pub type DirtySet = BTreeSet<PathBuf>;

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub actions: Vec<Action>,
    pub pending: PendingEdits,
    pub dirty: DirtySet,
}

impl Reconciliation {
    fn append(&mut self, path: &Path, text: &str, imports: BTreeSet<Import>) {
        let edit = self.pending.entry(path.to_path_buf()).or_default();
        edit.text.push_str(text);
        edit.imports.extend(imports);
        self.dirty.insert(path.to_path_buf());
    }

    fn record(
        &mut self,
        contract: &str,
        receiver: &str,
        method: Option<&str>,
        file: &Path,
        kind: ActionKind,
    ) {
        self.actions.push(Action {
            contract: contract.to_string(),
            receiver: receiver.to_string(),
            method: method.map(str::to_string),
            file: file.to_path_buf(),
            kind,
        });
    }

    pub fn is_up_to_date(&self) -> bool {
        self.dirty.is_empty() && !self.actions.iter().any(Action::is_change)
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub naming: Naming,
    /// Import path of the contract package as seen from the implementation.
    pub contract_import: String,
    pub guard_message: String,
    /// Contracts that are never reconciled.
    pub skip: BTreeSet<String>,
}

impl ReconcileOptions {
    pub fn from_config(config: &Config, contract_import: impl Into<String>) -> Self {
        ReconcileOptions {
            naming: Naming::from_config(config),
            contract_import: contract_import.into(),
            guard_message: config.guard_message.clone(),
            skip: config.skip.iter().cloned().collect(),
        }
    }
}

pub struct Reconciler<'a> {
    options: &'a ReconcileOptions,
    renderer: &'a StubRenderer,
}

impl<'a> Reconciler<'a> {
    pub fn new(options: &'a ReconcileOptions, renderer: &'a StubRenderer) -> Self {
        Reconciler { options, renderer }
    }

    /// Reconcile every contract of `contracts` against `implementation`.
    ///
    /// Contracts are visited by name, methods in declaration order, so the
    /// result is deterministic for a given pair of models.
    pub fn reconcile(
        &self,
        contracts: &SourceModel,
        implementation: &mut SourceModel,
    ) -> Reconciliation {
        let mut out = Reconciliation::default();
        for contract in contracts.contracts() {
            if !self.options.naming.is_contract(&contract.name) {
                continue;
            }
            if self.options.skip.contains(&contract.name) {
                tracing::debug!("skipping contract {}", contract.name);
                continue;
            }
            self.reconcile_contract(&contract, contracts.package(), implementation, &mut out);
        }
        out
    }

    fn reconcile_contract(
        &self,
        contract: &Contract,
        contract_package: &str,
        implementation: &mut SourceModel,
        out: &mut Reconciliation,
    ) {
        let naming = &self.options.naming;
        let receiver = naming.receiver_name(&contract.name);
        for embed in &contract.embeds {
            tracing::debug!(
                "{} embeds {embed} ({}); embedded methods are not reconciled",
                contract.name,
                contract.file.display()
            );
        }

        let unit = implementation.implementation_unit(&receiver);
        let receiver_missing = unit.file.is_none()
            && !out.actions.iter().any(|a| {
                a.receiver == receiver && a.kind == ActionKind::ReceiverGenerated
            });
        if receiver_missing {
            let path = implementation.dir().join(&naming.base_file);
            match self.renderer.render_receiver(&receiver, &naming.root_receiver) {
                Ok(text) => {
                    tracing::info!("generated receiver {receiver} in {}", path.display());
                    out.append(&path, &text, BTreeSet::new());
                    out.record(&contract.name, &receiver, None, &path, ActionKind::ReceiverGenerated);
                }
                Err(e) => {
                    tracing::warn!("cannot render receiver {receiver}: {e}");
                    out.record(
                        &contract.name,
                        &receiver,
                        None,
                        &path,
                        ActionKind::Skipped {
                            reason: e.to_string(),
                        },
                    );
                    return;
                }
            }
        }

        for method in &contract.methods {
            match unit.methods.get(&method.name) {
                Some(existing) => {
                    self.reconcile_method(contract, contract_package, method, existing, implementation, out)
                }
                None => {
                    self.generate_stub(contract, contract_package, &receiver, method, implementation, out)
                }
            }
        }
    }

    /// Compare an implemented method with its contract method and patch the
    /// signature in place on drift.
    fn reconcile_method(
        &self,
        contract: &Contract,
        contract_package: &str,
        method: &ContractMethod,
        existing: &ImplMethod,
        implementation: &mut SourceModel,
        out: &mut Reconciliation,
    ) {
        let receiver = &self.options.naming.receiver_name(&contract.name);
        let key = format!("{receiver}.{}", method.name);
        let path = existing.file.clone();

        let alias = self.contract_alias(implementation, &path, contract_package);
        if is_structurally_equal(&existing.signature, &method.signature, alias.as_deref()) {
            tracing::debug!("{key} matches {}", contract.name);
            out.record(&contract.name, receiver, Some(&method.name), &path, ActionKind::Match);
            return;
        }

        let translated = translate(&method.signature, alias.as_deref());
        let imports = self.required_imports(&translated, contract, alias.as_deref(), contract_package);
        let guarded = match implementation.func_decl_mut(&key) {
            Some(func) => {
                func.set_signature(translated);
                func.insert_guard(&self.options.guard_message)
            }
            None => false,
        };
        if let Some(file) = implementation.file_mut(&path) {
            for import in imports {
                file.add_import(import);
            }
        }
        out.dirty.insert(path.clone());
        tracing::info!("patched signature of {key} in {}", path.display());
        out.record(
            &contract.name,
            receiver,
            Some(&method.name),
            &path,
            ActionKind::Patched { guarded },
        );
    }

    fn generate_stub(
        &self,
        contract: &Contract,
        contract_package: &str,
        receiver: &str,
        method: &ContractMethod,
        implementation: &SourceModel,
        out: &mut Reconciliation,
    ) {
        let naming = &self.options.naming;
        let path = implementation
            .dir()
            .join(naming.file_for(receiver, &method.name));
        let alias = self.contract_alias(implementation, &path, contract_package);
        let translated = translate(&method.signature, alias.as_deref());
        let root_child = naming
            .is_root_receiver(receiver)
            .then(|| naming.receiver_name(&method.name));

        match self
            .renderer
            .render_method(receiver, &method.name, &translated, root_child.as_deref())
        {
            Ok(text) => {
                let imports =
                    self.required_imports(&translated, contract, alias.as_deref(), contract_package);
                tracing::info!("generated {receiver}.{} in {}", method.name, path.display());
                out.append(&path, &text, imports);
                out.record(&contract.name, receiver, Some(&method.name), &path, ActionKind::Generated);
            }
            Err(e) => {
                tracing::warn!("skipping stub {receiver}.{}: {e}", method.name);
                out.record(
                    &contract.name,
                    receiver,
                    Some(&method.name),
                    &path,
                    ActionKind::Skipped {
                        reason: e.to_string(),
                    },
                );
            }
        }
    }

    /// Name the contract package goes by in `path`: the file's own import
    /// alias if it has one, the contract package name otherwise. `None` when
    /// the file dot-imports the package and contract types are unqualified.
    fn contract_alias(
        &self,
        implementation: &SourceModel,
        path: &Path,
        contract_package: &str,
    ) -> Option<String> {
        let import = implementation
            .file(path)
            .and_then(|f| f.import(&self.options.contract_import));
        match import.and_then(|i| i.alias.as_deref()) {
            Some(".") => None,
            Some(alias) => Some(alias.to_string()),
            None => Some(contract_package.to_string()),
        }
    }

    /// Imports for every package qualifier in `signature`. Qualifiers other
    /// than the contract alias resolve through the contract file's imports.
    fn required_imports(
        &self,
        signature: &MethodSignature,
        contract: &Contract,
        alias: Option<&str>,
        contract_package: &str,
    ) -> BTreeSet<Import> {
        let mut imports = BTreeSet::new();
        for namespace in signature.namespaces() {
            if let Some(alias) = alias.filter(|a| *a == namespace) {
                let path = &self.options.contract_import;
                if alias == contract_package && default_package_name(path) == alias {
                    imports.insert(Import::new(path.as_str()));
                } else {
                    imports.insert(Import::aliased(alias, path.as_str()));
                }
            } else if let Some(path) = contract.imports.get(&namespace) {
                if default_package_name(path) == namespace {
                    imports.insert(Import::new(path.as_str()));
                } else {
                    imports.insert(Import::aliased(namespace.as_str(), path.as_str()));
                }
            } else {
                tracing::debug!("no import known for package {namespace}");
            }
        }
        imports
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
