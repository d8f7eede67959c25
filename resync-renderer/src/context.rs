//! Template contexts: serializable payloads for the stub templates.
//!
//! Contexts are built from already-translated signatures, so every type
//! string is exactly what ends up in the implementation file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use resync_core::types::{MethodSignature, Param};
use resync_core::Import;

use crate::error::RenderError;

/// One `name type` entry of a rendered parameter or result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTypePair {
    pub name: String,
    pub ty: String,
}

/// Payload for `method.go.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodStubContext {
    pub receiver: String,
    /// Receiver variable, `r` unless a parameter already uses that name.
    pub receiver_var: String,
    pub method: String,
    pub params: Vec<NameTypePair>,
    pub results: Vec<NameTypePair>,
    pub has_results: bool,
    /// Root methods return a child receiver instead of panicking.
    pub is_root: bool,
    pub child_receiver: String,
}

impl MethodStubContext {
    /// Build a stub context. `root_child` is the receiver a root method
    /// returns; `None` for ordinary methods.
    ///
    /// Unnamed parameters become `param<i>`. Unnamed results become `err`
    /// for `error`, `result` for the first other one and `result<i>` after.
    /// A generated name that is already taken gets a numeric suffix.
    pub fn build(
        receiver: &str,
        method: &str,
        signature: &MethodSignature,
        root_child: Option<&str>,
    ) -> Result<Self, RenderError> {
        check_ident("receiver", receiver)?;
        check_ident("method", method)?;
        if let Some(child) = root_child {
            check_ident("child receiver", child)?;
        }

        let mut taken: BTreeSet<String> = signature
            .params
            .iter()
            .chain(&signature.results)
            .filter_map(|p| p.name.clone())
            .collect();

        let params = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| pair(p, || fresh_name(&mut taken, format!("param{i}"))))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen_value = false;
        let results = signature
            .results
            .iter()
            .enumerate()
            .map(|(i, p)| {
                pair(p, || {
                    let base = if p.ty.is_error() {
                        "err".to_string()
                    } else if !seen_value {
                        seen_value = true;
                        "result".to_string()
                    } else {
                        format!("result{i}")
                    };
                    fresh_name(&mut taken, base)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let receiver_var = fresh_name(&mut taken, "r".to_string());

        Ok(MethodStubContext {
            receiver: receiver.to_string(),
            receiver_var,
            method: method.to_string(),
            has_results: !results.is_empty(),
            params,
            results,
            is_root: root_child.is_some(),
            child_receiver: root_child.unwrap_or_default().to_string(),
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

fn pair(param: &Param, fallback: impl FnOnce() -> String) -> Result<NameTypePair, RenderError> {
    let name = match &param.name {
        Some(name) => {
            check_ident("parameter", name)?;
            name.clone()
        }
        None => fallback(),
    };
    let ty = param.ty.to_string();
    if ty.trim().is_empty() {
        return Err(RenderError::InvalidInput(format!("empty type for `{name}`")));
    }
    Ok(NameTypePair { name, ty })
}

/// `base`, or `base` plus the smallest numeric suffix not in `taken`.
fn fresh_name(taken: &mut BTreeSet<String>, base: String) -> String {
    let mut name = base.clone();
    let mut n = 1;
    while taken.contains(&name) {
        name = format!("{base}{n}");
        n += 1;
    }
    taken.insert(name.clone());
    name
}

/// Payload for `receiver.go.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverContext {
    pub name: String,
    /// Embedded root receiver; ignored when `is_root`.
    pub root: String,
    pub is_root: bool,
}

impl ReceiverContext {
    pub fn build(name: &str, root: &str) -> Result<Self, RenderError> {
        check_ident("receiver", name)?;
        check_ident("root receiver", root)?;
        Ok(ReceiverContext {
            name: name.to_string(),
            root: root.to_string(),
            is_root: name == root,
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCtx {
    /// Empty when the import uses its default name.
    pub alias: String,
    pub path: String,
}

/// Payload for `header.go.tera`: package clause and imports of a new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHeaderContext {
    pub package: String,
    pub imports: Vec<ImportCtx>,
    pub has_imports: bool,
}

impl FileHeaderContext {
    pub fn build<'a>(
        package: &str,
        imports: impl IntoIterator<Item = &'a Import>,
    ) -> Result<Self, RenderError> {
        check_ident("package", package)?;
        let imports: Vec<ImportCtx> = imports
            .into_iter()
            .map(|i| ImportCtx {
                alias: i.alias.clone().unwrap_or_default(),
                path: i.path.clone(),
            })
            .collect();
        Ok(FileHeaderContext {
            package: package.to_string(),
            has_imports: !imports.is_empty(),
            imports,
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Go identifier: a letter or `_` followed by letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn check_ident(what: &str, value: &str) -> Result<(), RenderError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(RenderError::InvalidInput(format!(
            "{what} name `{value}` is not an identifier"
        )))
    }
}
