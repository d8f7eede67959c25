//! Tera rendering engine for Go stubs.
//!
//! | Template           | Output                                      |
//! |--------------------|---------------------------------------------|
//! | `method.go.tera`   | one method stub, preceded by a blank line   |
//! | `receiver.go.tera` | a receiver type declaration                 |
//! | `header.go.tera`   | package clause and imports of a new file    |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use resync_core::types::MethodSignature;
use resync_core::Import;

use crate::context::{FileHeaderContext, MethodStubContext, ReceiverContext};
use crate::error::RenderError;

pub const METHOD_TEMPLATE: &str = "method.go.tera";
pub const RECEIVER_TEMPLATE: &str = "receiver.go.tera";
pub const HEADER_TEMPLATE: &str = "header.go.tera";

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (METHOD_TEMPLATE, include_str!("templates/method.go.tera")),
    (RECEIVER_TEMPLATE, include_str!("templates/receiver.go.tera")),
    (HEADER_TEMPLATE, include_str!("templates/header.go.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

/// Overrides are matched by file name; subdirectories are not searched.
fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let path = entry.map_err(|e| io_err(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = name.to_lowercase();
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents.replace("\r\n", "\n")));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| (name.to_string(), content.to_string()))
        .collect();
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// StubRenderer
// ---------------------------------------------------------------------------

/// Renders method stubs, receiver types and file headers.
///
/// `user_template_dir` may contain `.tera` files named like the embedded
/// ones; those replace the defaults. Create once and reuse.
pub struct StubRenderer {
    tera: Tera,
}

impl StubRenderer {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(StubRenderer {
            tera: build_tera(user_template_dir)?,
        })
    }

    /// Stub for `receiver.method`. Root methods (`root_child` is `Some`)
    /// return a new child receiver; all others panic.
    pub fn render_method(
        &self,
        receiver: &str,
        method: &str,
        signature: &MethodSignature,
        root_child: Option<&str>,
    ) -> Result<String, RenderError> {
        let ctx = MethodStubContext::build(receiver, method, signature, root_child)?;
        Ok(self.tera.render(METHOD_TEMPLATE, &ctx.to_tera_context()?)?)
    }

    /// `type <name> struct{ *<root> }`, or an empty struct for the root itself.
    pub fn render_receiver(&self, name: &str, root: &str) -> Result<String, RenderError> {
        let ctx = ReceiverContext::build(name, root)?;
        Ok(self.tera.render(RECEIVER_TEMPLATE, &ctx.to_tera_context()?)?)
    }

    /// Package clause plus one grouped import declaration.
    pub fn render_header<'a>(
        &self,
        package: &str,
        imports: impl IntoIterator<Item = &'a Import>,
    ) -> Result<String, RenderError> {
        let ctx = FileHeaderContext::build(package, imports)?;
        Ok(self.tera.render(HEADER_TEMPLATE, &ctx.to_tera_context()?)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
