//! Declaration-level Go syntax: lexer, parser, and a verbatim printer.
//!
//! Only what the reconciler needs is modelled: the package clause, imports,
//! type declarations, interface method sets, and function declarations with
//! their signatures and body spans. Everything else is kept as source text
//! and printed back unchanged.

mod ast;
pub mod lexer;
mod parser;
mod printer;

pub use ast::{
    default_package_name, Body, Decl, FuncDecl, Import, InterfaceElem, Receiver, SourceFile,
    TypeKind, TypeSpec,
};
pub use parser::{parse_file, SyntaxError};

/// Byte range into a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    (line, offset - line_start + 1)
}
