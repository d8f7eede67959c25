//! Hand-written Go lexer.
//!
//! Produces the token stream the declaration parser needs: identifiers,
//! literals, punctuation and semicolons. Comments and whitespace are dropped,
//! but newlines still drive Go's automatic semicolon insertion.

use super::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifiers and keywords.
    Ident,
    Number,
    Char,
    String,
    Punct,
    /// Explicit `;` or one inserted at a line break.
    Semi,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// A lexical error at a byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub offset: usize,
    pub message: String,
}

/// Keywords that do not end a statement at a line break.
const NON_TERMINATING_KEYWORDS: &[&str] = &[
    "case",
    "chan",
    "const",
    "default",
    "defer",
    "else",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ";", ".", ":",
];

/// Lex `source` into tokens. The last token is always `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    lexer.scan_all()?;
    Ok(lexer.tokens)
}

struct Lexer<'src> {
    text: &'src str,
    source: &'src [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            text: source,
            source: source.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn scan_all(&mut self) -> Result<(), LexError> {
        loop {
            self.skip_blanks();
            if self.is_at_end() {
                self.line_break(self.pos);
                self.emit(TokenKind::Eof, self.pos, self.pos);
                return Ok(());
            }
            self.scan_token()?;
        }
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let ch = self.source[self.pos];

        match ch {
            b'\n' => {
                self.pos += 1;
                self.line_break(start);
            }
            b'/' if self.peek_next() == Some(b'/') => {
                while self.peek().is_some_and(|c| c != b'\n') {
                    self.pos += 1;
                }
            }
            b'/' if self.peek_next() == Some(b'*') => {
                self.pos += 2;
                let mut has_newline = false;
                loop {
                    match self.peek() {
                        None => return Err(self.error(start, "unterminated block comment")),
                        Some(b'*') if self.peek_next() == Some(b'/') => {
                            self.pos += 2;
                            break;
                        }
                        Some(c) => {
                            has_newline |= c == b'\n';
                            self.pos += 1;
                        }
                    }
                }
                if has_newline {
                    self.line_break(start);
                }
            }
            b'"' => self.scan_quoted(start, b'"', TokenKind::String)?,
            b'\'' => self.scan_quoted(start, b'\'', TokenKind::Char)?,
            b'`' => {
                self.pos += 1;
                while self.peek().is_some_and(|c| c != b'`') {
                    self.pos += 1;
                }
                if self.is_at_end() {
                    return Err(self.error(start, "unterminated raw string"));
                }
                self.pos += 1;
                self.emit(TokenKind::String, start, self.pos);
            }
            b'0'..=b'9' => self.scan_number(start),
            b'.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number(start)
            }
            c if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => self.scan_ident(start)?,
            _ => self.scan_operator(start)?,
        }
        Ok(())
    }

    fn scan_quoted(&mut self, start: usize, quote: u8, kind: TokenKind) -> Result<(), LexError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error(start, "unterminated literal")),
                Some(b'\\') => self.pos += 2,
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.emit(kind, start, self.pos);
        Ok(())
    }

    fn scan_number(&mut self, start: usize) {
        let literal = &self.text[start..];
        let hex = literal.starts_with("0x") || literal.starts_with("0X");
        let mut prev: Option<u8> = None;
        while let Some(c) = self.peek() {
            let exponent_sign = (c == b'+' || c == b'-')
                && match prev {
                    Some(b'e' | b'E') => !hex,
                    Some(b'p' | b'P') => true,
                    _ => false,
                };
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || exponent_sign {
                prev = Some(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        self.emit(TokenKind::Number, start, self.pos);
    }

    fn scan_ident(&mut self, start: usize) -> Result<(), LexError> {
        while let Some(ch) = self.text[self.pos..].chars().next() {
            if ch == '_' || ch.is_alphanumeric() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error(start, "unexpected character"));
        }
        self.emit(TokenKind::Ident, start, self.pos);
        Ok(())
    }

    fn scan_operator(&mut self, start: usize) -> Result<(), LexError> {
        let rest = &self.text[start..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            return Err(self.error(start, "unexpected character"));
        };
        self.pos += op.len();
        let kind = if *op == ";" {
            TokenKind::Semi
        } else {
            TokenKind::Punct
        };
        self.emit(kind, start, self.pos);
        Ok(())
    }

    /// Insert a semicolon if the last token can end a statement.
    fn line_break(&mut self, at: usize) {
        let Some(last) = self.tokens.last() else {
            return;
        };
        let text = &self.text[last.span.start..last.span.end];
        let terminates = match last.kind {
            TokenKind::Ident => !NON_TERMINATING_KEYWORDS.contains(&text),
            TokenKind::Number | TokenKind::Char | TokenKind::String => true,
            TokenKind::Punct => matches!(text, ")" | "]" | "}" | "++" | "--"),
            TokenKind::Semi | TokenKind::Eof => false,
        };
        if terminates {
            self.emit(TokenKind::Semi, at, at);
        }
    }

    // -- Helpers --

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r')) {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.pos + 1).copied()
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, end),
        });
    }

    fn error(&self, offset: usize, message: &str) -> LexError {
        LexError {
            offset,
            message: message.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
