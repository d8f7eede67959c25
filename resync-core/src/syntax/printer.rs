//! Prints a [`SourceFile`] back to text.
//!
//! Unmodified regions are copied byte-for-byte from the original source.
//! Only three kinds of edits are spliced in: new imports after the package
//! clause, re-rendered signatures, and guard statements at the top of bodies.

use super::ast::SourceFile;

impl SourceFile {
    pub fn render(&self) -> String {
        if !self.is_modified() {
            return self.source.clone();
        }
        let src = self.source.as_str();
        let mut out = String::with_capacity(src.len() + 128);
        let mut cursor = 0;

        if !self.added_imports.is_empty() {
            out.push_str(&src[..self.package_end]);
            out.push_str("\n\nimport (\n");
            for import in &self.added_imports {
                out.push('\t');
                if let Some(alias) = &import.alias {
                    out.push_str(alias);
                    out.push(' ');
                }
                out.push_str(&quote(&import.path));
                out.push('\n');
            }
            out.push(')');
            cursor = self.package_end;
        }

        for func in self.funcs() {
            if func.rewritten {
                out.push_str(&src[cursor..func.signature_span.start]);
                out.push_str(&func.signature.render());
                cursor = func.signature_span.end;
            }
            let Some(body) = &func.body else { continue };
            let Some(message) = &body.guard else { continue };
            let open = body.span.start + 1;
            out.push_str(&src[cursor..open]);
            out.push_str("\n\tpanic(");
            out.push_str(&quote(message));
            out.push(')');
            if src.as_bytes().get(open) != Some(&b'\n') {
                out.push('\n');
            }
            cursor = open;
        }

        out.push_str(&src[cursor..]);
        out
    }
}

/// Go interpreted string literal for `text`.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
