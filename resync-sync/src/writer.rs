//! Write-back: merge patched files and pending text, format, write.
//!
//! ## Per dirty file
//!
//! 1. Existing file: print the (possibly patched) syntax tree, add the
//!    imports the pending text needs, append the pending text.
//!    New file: render the package header with those imports, append.
//! 2. Run the formatter; on failure log and keep the unformatted text.
//! 3. Write to `<path>.resync.tmp`, then rename over the final path.
//!
//! Files outside the dirty set are never touched. A failure on one file is
//! reported and the remaining files are still written.

use std::path::{Path, PathBuf};

use serde::Serialize;

use resync_core::SourceModel;
use resync_renderer::{RenderError, StubRenderer};

use crate::error::WriteError;
use crate::formatter::Formatter;
use crate::reconcile::{PendingEdit, Reconciliation};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteResult {
    /// File was written. `formatted` is false when the formatter failed or
    /// was disabled.
    Written { path: PathBuf, formatted: bool },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
    /// The file could not be produced or written; it was left untouched.
    Failed { path: PathBuf, reason: String },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::WouldWrite { path }
            | WriteResult::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, WriteResult::Failed { .. })
    }
}

/// Final content for one dirty file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub content: String,
    pub formatted: bool,
    /// The file does not exist in the implementation module yet.
    pub is_new: bool,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Unformatted content of `path` after reconciliation.
pub fn merge_file(
    implementation: &SourceModel,
    path: &Path,
    pending: Option<&PendingEdit>,
    renderer: &StubRenderer,
) -> Result<String, RenderError> {
    let Some(existing) = implementation.file(path) else {
        let imports = pending.map(|p| p.imports.iter()).into_iter().flatten();
        let mut text = renderer.render_header(implementation.package(), imports)?;
        if let Some(edit) = pending {
            text.push_str(&edit.text);
        }
        return Ok(text);
    };

    let Some(edit) = pending else {
        return Ok(existing.render());
    };
    let mut file = existing.clone();
    for import in &edit.imports {
        file.add_import(import.clone());
    }
    let mut text = file.render();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&edit.text);
    Ok(text)
}

/// Merge and format every dirty file. Files that cannot be rendered are
/// returned as failures.
pub fn plan_files(
    implementation: &SourceModel,
    reconciliation: &Reconciliation,
    renderer: &StubRenderer,
    formatter: &dyn Formatter,
) -> (Vec<PlannedFile>, Vec<WriteResult>) {
    let mut planned = Vec::new();
    let mut failed = Vec::new();
    for path in &reconciliation.dirty {
        let pending = reconciliation.pending.get(path);
        let content = match merge_file(implementation, path, pending, renderer) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("cannot render {}: {e}", path.display());
                failed.push(WriteResult::Failed {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let (content, formatted) = match formatter.format(path, &content) {
            Ok(out) => (out, true),
            Err(e) => {
                tracing::warn!("formatter failed for {}: {e}; keeping unformatted text", path.display());
                (content, false)
            }
        };
        planned.push(PlannedFile {
            path: path.clone(),
            content,
            formatted,
            is_new: implementation.file(path).is_none(),
        });
    }
    (planned, failed)
}

// ---------------------------------------------------------------------------
// Write
// ---------------------------------------------------------------------------

/// Write every planned file, or only report them under `dry_run`.
pub fn write_files(files: &[PlannedFile], dry_run: bool) -> Vec<WriteResult> {
    files
        .iter()
        .map(|file| {
            if dry_run {
                tracing::info!("[dry-run] would write: {}", file.path.display());
                return WriteResult::WouldWrite {
                    path: file.path.clone(),
                };
            }
            match atomic_write(&file.path, &file.content) {
                Ok(()) => {
                    tracing::info!("wrote: {}", file.path.display());
                    WriteResult::Written {
                        path: file.path.clone(),
                        formatted: file.formatted,
                    }
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    WriteResult::Failed {
                        path: file.path.clone(),
                        reason: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

/// Full-file overwrite through a sibling temporary file.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), WriteError> {
    let tmp = PathBuf::from(format!("{}.resync.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), WriteError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source| WriteError::Io { path, source }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io(parent))?;
    }
    std::fs::write(tmp, content).map_err(io(tmp))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io(path)(e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::formatter::NoopFormatter;
    use pretty_assertions::assert_eq;
    use resync_core::syntax::parse_file;
    use resync_core::Import;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    struct FailingFormatter;

    impl Formatter for FailingFormatter {
        fn format(&self, _path: &Path, _source: &str) -> Result<String, FormatError> {
            Err(FormatError::NotUtf8)
        }
    }

    fn model(dir: &Path, files: &[(&str, &str)]) -> SourceModel {
        let parsed = files
            .iter()
            .map(|(name, src)| parse_file(dir.join(name), *src).unwrap())
            .collect();
        SourceModel::from_files(dir, parsed).unwrap()
    }

    fn edit(text: &str, imports: &[Import]) -> PendingEdit {
        PendingEdit {
            imports: imports.iter().cloned().collect::<BTreeSet<_>>(),
            text: text.to_string(),
        }
    }

    #[test]
    fn pending_text_is_appended_to_existing_file() {
        let dir = Path::new("/impl");
        let m = model(dir, &[("base.go", "package resolver\n\ntype Resolver struct{}")]);
        let renderer = StubRenderer::new(None).unwrap();
        let pending = edit("\ntype queryResolver struct{ *Resolver }\n", &[]);
        let out = merge_file(&m, &dir.join("base.go"), Some(&pending), &renderer).unwrap();
        assert_eq!(
            out,
            "package resolver\n\ntype Resolver struct{}\n\ntype queryResolver struct{ *Resolver }\n"
        );
    }

    #[test]
    fn new_file_gets_header_and_imports() {
        let dir = Path::new("/impl");
        let m = model(dir, &[("base.go", "package resolver\n")]);
        let renderer = StubRenderer::new(None).unwrap();
        let pending = edit(
            "\nfunc (r *queryResolver) Ping(ctx context.Context) {\n\tpanic(\"not implemented\")\n}\n",
            &[Import::new("context")],
        );
        let out = merge_file(&m, &dir.join("query_ping.go"), Some(&pending), &renderer).unwrap();
        assert_eq!(
            out,
            "package resolver\n\nimport (\n\t\"context\"\n)\n\nfunc (r *queryResolver) Ping(ctx context.Context) {\n\tpanic(\"not implemented\")\n}\n"
        );
    }

    #[test]
    fn imports_for_appended_text_are_added_to_existing_file() {
        let dir = Path::new("/impl");
        let m = model(dir, &[("base.go", "package resolver\n\nimport \"context\"\n")]);
        let renderer = StubRenderer::new(None).unwrap();
        let pending = edit(
            "\nfunc x() {}\n",
            &[Import::new("context"), Import::new("example.com/gql")],
        );
        let out = merge_file(&m, &dir.join("base.go"), Some(&pending), &renderer).unwrap();
        assert_eq!(out.matches("\"context\"").count(), 1);
        assert!(out.starts_with("package resolver\n\nimport (\n\t\"example.com/gql\"\n)"));
    }

    #[test]
    fn formatter_failure_keeps_unformatted_text() {
        let tmp = TempDir::new().unwrap();
        let m = model(tmp.path(), &[("base.go", "package resolver\n")]);
        let renderer = StubRenderer::new(None).unwrap();
        let mut rec = Reconciliation::default();
        let target = tmp.path().join("base.go");
        rec.pending.insert(target.clone(), edit("\nfunc x() {}\n", &[]));
        rec.dirty.insert(target.clone());

        let (planned, failed) = plan_files(&m, &rec, &renderer, &FailingFormatter);
        assert!(failed.is_empty());
        assert_eq!(planned.len(), 1);
        assert!(!planned[0].formatted);
        assert_eq!(planned[0].content, "package resolver\n\nfunc x() {}\n");
    }

    #[test]
    fn invalid_package_fails_only_the_new_file() {
        let tmp = TempDir::new().unwrap();
        let m = SourceModel::empty(tmp.path(), "not-an-ident");
        let renderer = StubRenderer::new(None).unwrap();
        let mut rec = Reconciliation::default();
        let target = tmp.path().join("x.go");
        rec.pending.insert(target.clone(), edit("\nfunc x() {}\n", &[]));
        rec.dirty.insert(target.clone());

        let (planned, failed) = plan_files(&m, &rec, &renderer, &NoopFormatter);
        assert!(planned.is_empty());
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path(), target.as_path());
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.go");
        let files = vec![PlannedFile {
            path: path.clone(),
            content: "package x\n".to_string(),
            formatted: true,
            is_new: true,
        }];
        let results = write_files(&files, true);
        assert!(matches!(results[0], WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.go");
        atomic_write(&path, "package x\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "package x\n");
        let tmp_path = PathBuf::from(format!("{}.resync.tmp", path.display()));
        assert!(!tmp_path.exists(), ".resync.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn write_failure_is_reported_and_other_files_still_written() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly = root.path().join("readonly");
        fs::create_dir_all(&readonly).unwrap();
        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly, perms).unwrap();

        let files = vec![
            PlannedFile {
                path: readonly.join("a.go"),
                content: "package a\n".to_string(),
                formatted: true,
                is_new: true,
            },
            PlannedFile {
                path: root.path().join("b.go"),
                content: "package a\n".to_string(),
                formatted: true,
                is_new: true,
            },
        ];
        let results = write_files(&files, false);

        let mut perms = fs::metadata(&readonly).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly, perms).unwrap();

        // Root ignores directory permissions; only assert when they apply.
        if results[0].is_failure() {
            assert!(!readonly.join("a.go").exists());
            assert!(!readonly.join("a.go.resync.tmp").exists());
        }
        assert!(matches!(results[1], WriteResult::Written { .. }));
        assert!(root.path().join("b.go").exists());
    }
}
