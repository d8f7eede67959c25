//! Source model: one Go package loaded into lookup tables.
//!
//! A model owns its parsed files. Three tables index into them:
//! functions and methods by `receiver.method`, type declarations by name,
//! and the subset of types that are interfaces. Each entry remembers which
//! file it came from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{io_err, LoadError};
use crate::syntax::{self, parse_file, Decl, FuncDecl, InterfaceElem, SourceFile, TypeKind};
use crate::types::{Contract, ContractMethod, ImplMethod, ImplementationUnit};

/// Location of a declaration: file index and declaration index in that file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeclRef {
    file: usize,
    decl: usize,
}

#[derive(Debug, Clone)]
pub struct SourceModel {
    dir: PathBuf,
    package: String,
    files: Vec<SourceFile>,
    func_decls: BTreeMap<String, DeclRef>,
    type_specs: BTreeMap<String, DeclRef>,
    interfaces: BTreeMap<String, DeclRef>,
}

/// `*.go`, excluding tests.
fn is_source_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

impl SourceModel {
    /// Parse every source file of the package in `dir`.
    pub fn load(dir: &Path) -> Result<SourceModel, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let path = entry.map_err(|e| io_err(dir, e))?.path();
            if is_source_file(&path) && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(LoadError::NoSourceFiles {
                path: dir.to_path_buf(),
            });
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let file = parse_file(path.clone(), source.as_str()).map_err(|e| {
                let (line, column) = syntax::line_col(&source, e.offset);
                LoadError::Syntax {
                    path: path.clone(),
                    line,
                    column,
                    message: e.message,
                }
            })?;
            files.push(file);
        }
        SourceModel::from_files(dir, files)
    }

    /// Build a model from already-parsed files. Files must share one package.
    pub fn from_files(dir: &Path, files: Vec<SourceFile>) -> Result<SourceModel, LoadError> {
        let package = match files.first() {
            Some(first) => first.package.clone(),
            None => {
                return Err(LoadError::NoSourceFiles {
                    path: dir.to_path_buf(),
                })
            }
        };
        if let Some(other) = files.iter().find(|f| f.package != package) {
            return Err(LoadError::MixedPackages {
                path: other.path.clone(),
                expected: package,
                found: other.package.clone(),
            });
        }

        let mut model = SourceModel {
            dir: dir.to_path_buf(),
            package,
            files,
            func_decls: BTreeMap::new(),
            type_specs: BTreeMap::new(),
            interfaces: BTreeMap::new(),
        };
        model.index()?;
        Ok(model)
    }

    /// A model for a package with no files yet.
    pub fn empty(dir: &Path, package: impl Into<String>) -> SourceModel {
        SourceModel {
            dir: dir.to_path_buf(),
            package: package.into(),
            files: Vec::new(),
            func_decls: BTreeMap::new(),
            type_specs: BTreeMap::new(),
            interfaces: BTreeMap::new(),
        }
    }

    fn index(&mut self) -> Result<(), LoadError> {
        for (fi, file) in self.files.iter().enumerate() {
            for (di, decl) in file.decls.iter().enumerate() {
                let at = DeclRef { file: fi, decl: di };
                match decl {
                    Decl::Func(func) => {
                        if func.receiver.is_none() && matches!(func.name.as_str(), "init" | "_") {
                            continue;
                        }
                        insert_unique(&self.files, &mut self.func_decls, func.key(), at)?;
                    }
                    Decl::Type(spec) => {
                        if spec.name == "_" {
                            continue;
                        }
                        insert_unique(&self.files, &mut self.type_specs, spec.name.clone(), at)?;
                        if matches!(spec.kind, TypeKind::Interface(_)) {
                            self.interfaces.insert(spec.name.clone(), at);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn file_mut(&mut self, path: &Path) -> Option<&mut SourceFile> {
        self.files.iter_mut().find(|f| f.path == path)
    }

    pub fn func_decl(&self, key: &str) -> Option<&FuncDecl> {
        let at = self.func_decls.get(key)?;
        match &self.files[at.file].decls[at.decl] {
            Decl::Func(func) => Some(func),
            Decl::Type(_) => None,
        }
    }

    pub fn func_decl_mut(&mut self, key: &str) -> Option<&mut FuncDecl> {
        let at = *self.func_decls.get(key)?;
        self.files[at.file].func_mut(at.decl)
    }

    /// File declaring `key`: a `receiver.method`, a function or a type name.
    pub fn file_of(&self, key: &str) -> Option<&Path> {
        self.func_decls
            .get(key)
            .or_else(|| self.type_specs.get(key))
            .map(|at| self.files[at.file].path())
    }

    /// Every interface, sorted by name.
    pub fn contracts(&self) -> Vec<Contract> {
        self.interfaces
            .iter()
            .filter_map(|(name, at)| {
                let file = &self.files[at.file];
                let Decl::Type(spec) = &file.decls[at.decl] else {
                    return None;
                };
                let TypeKind::Interface(elems) = &spec.kind else {
                    return None;
                };
                let mut methods = Vec::new();
                let mut embeds = Vec::new();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { name, signature } => methods.push(ContractMethod {
                            name: name.clone(),
                            signature: signature.clone(),
                        }),
                        InterfaceElem::Embed(text) => embeds.push(text.clone()),
                    }
                }
                Some(Contract {
                    name: name.clone(),
                    methods,
                    embeds,
                    file: file.path.clone(),
                    imports: file.import_table(),
                })
            })
            .collect()
    }

    /// The receiver type `receiver` and its methods.
    pub fn implementation_unit(&self, receiver: &str) -> ImplementationUnit {
        let prefix = format!("{receiver}.");
        let methods = self
            .func_decls
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, at)| {
                let file = &self.files[at.file];
                let Decl::Func(func) = &file.decls[at.decl] else {
                    return None;
                };
                Some((
                    key[prefix.len()..].to_string(),
                    ImplMethod {
                        signature: func.signature.clone(),
                        file: file.path.clone(),
                    },
                ))
            })
            .collect();
        ImplementationUnit {
            receiver: receiver.to_string(),
            file: self.file_of(receiver).map(Path::to_path_buf),
            methods,
        }
    }
}

fn insert_unique(
    files: &[SourceFile],
    table: &mut BTreeMap<String, DeclRef>,
    key: String,
    at: DeclRef,
) -> Result<(), LoadError> {
    if let Some(first) = table.get(&key) {
        return Err(LoadError::Duplicate {
            name: key,
            first: files[first.file].path.clone(),
            second: files[at.file].path.clone(),
        });
    }
    table.insert(key, at);
    Ok(())
}
