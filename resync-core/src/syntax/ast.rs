//! Syntax tree for one Go source file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::types::MethodSignature;

use super::Span;

/// An import spec: `alias "path"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Import {
    pub path: String,
    pub alias: Option<String>,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Import {
            path: path.into(),
            alias: None,
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Import {
            path: path.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name the package is referenced by in the importing file.
    pub fn name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => default_package_name(&self.path),
        }
    }
}

/// Conventional package name for an import path: the last path element,
/// skipping a `/vN` major-version element and stripping `.vN`, `go-` and
/// `-go` decorations.
pub fn default_package_name(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() > 1 {
        if let Some(last) = segments.last() {
            if is_major_version(last) {
                segments.pop();
            }
        }
    }
    let mut name = segments.last().copied().unwrap_or(path);
    if let Some((base, version)) = name.rsplit_once('.') {
        if is_major_version(version) {
            name = base;
        }
    }
    let name = name.strip_prefix("go-").unwrap_or(name);
    let name = name.strip_suffix("-go").unwrap_or(name);
    name.replace('-', "_")
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// The receiver clause of a method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: Option<String>,
    /// Bare type name, without `*` or type arguments.
    pub type_name: String,
    pub pointer: bool,
}

/// A function body, tracked by span only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// From `{` through `}`.
    pub(crate) span: Span,
    /// The first statement is a `panic(...)` call.
    pub starts_with_panic: bool,
    /// Guard statement to print right after `{`.
    pub(crate) guard: Option<String>,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: String,
    pub signature: MethodSignature,
    /// From the parameter list's `(` through the end of the results.
    pub(crate) signature_span: Span,
    pub body: Option<Body>,
    pub(crate) rewritten: bool,
}

impl FuncDecl {
    /// `receiver.method` for methods, the bare name for functions.
    pub fn key(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}", recv.type_name, self.name),
            None => self.name.clone(),
        }
    }

    /// Replace the parameter and result lists. The printer re-renders the
    /// signature; the rest of the declaration is kept verbatim.
    pub fn set_signature(&mut self, signature: MethodSignature) {
        self.signature = signature;
        self.rewritten = true;
    }

    /// Prepend `panic("<message>")` to the body unless its first statement is
    /// already a panic call. Returns whether a guard was added.
    pub fn insert_guard(&mut self, message: &str) -> bool {
        match &mut self.body {
            Some(body) if !body.starts_with_panic && body.guard.is_none() => {
                body.guard = Some(message.to_string());
                body.starts_with_panic = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.rewritten || self.body.as_ref().is_some_and(|b| b.guard.is_some())
    }
}

/// One element of an interface body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method {
        name: String,
        signature: MethodSignature,
    },
    /// Embedded interface or type-set term, as written.
    Embed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Interface(Vec<InterfaceElem>),
    Other,
}

/// A single `type` spec (grouped declarations yield one per name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeSpec),
}

/// A parsed source file. Keeps the original text so unmodified regions
/// print back byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub package: String,
    /// Offset right after the package name.
    pub(crate) package_end: usize,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
    pub(crate) added_imports: BTreeSet<Import>,
}

impl SourceFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The import of `path`, including imports added in memory. Blank
    /// (`_`) imports are not usable names and are skipped.
    pub fn import(&self, path: &str) -> Option<&Import> {
        self.imports
            .iter()
            .chain(self.added_imports.iter())
            .find(|i| i.path == path && i.alias.as_deref() != Some("_"))
    }

    /// Name under which `path` is imported, if it is.
    pub fn import_name(&self, path: &str) -> Option<String> {
        self.import(path).map(Import::name)
    }

    /// Import table keyed by package name.
    pub fn import_table(&self) -> BTreeMap<String, String> {
        self.imports
            .iter()
            .chain(self.added_imports.iter())
            .map(|i| (i.name(), i.path.clone()))
            .collect()
    }

    /// Schedule an import for printing. No-op if the path is already imported.
    pub fn add_import(&mut self, import: Import) -> bool {
        if self.import_name(&import.path).is_some() {
            return false;
        }
        self.added_imports.insert(import)
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            Decl::Type(_) => None,
        })
    }

    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Type(t) => Some(t),
            Decl::Func(_) => None,
        })
    }

    /// Mutable access to the declaration at `index`, if it is a function.
    pub fn func_mut(&mut self, index: usize) -> Option<&mut FuncDecl> {
        match self.decls.get_mut(index) {
            Some(Decl::Func(f)) => Some(f),
            _ => None,
        }
    }

    pub fn is_modified(&self) -> bool {
        !self.added_imports.is_empty() || self.funcs().any(FuncDecl::is_modified)
    }
}
