//! Recursive descent parser for Go declarations.
//!
//! Function bodies, struct bodies and `var`/`const` declarations are skipped
//! by balanced-bracket scanning; their text survives untouched through the
//! printer.

use std::path::PathBuf;

use crate::types::{is_basic_type, ChanDir, MethodSignature, Param, TypeExpr};

use super::ast::{Body, Decl, FuncDecl, Import, InterfaceElem, Receiver, SourceFile, TypeKind, TypeSpec};
use super::lexer::{lex, Token, TokenKind};
use super::Span;

/// A parse failure at a byte offset of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

type PResult<T> = Result<T, SyntaxError>;

/// Parse one Go source file.
pub fn parse_file(
    path: impl Into<PathBuf>,
    source: impl Into<String>,
) -> Result<SourceFile, SyntaxError> {
    let source = source.into();
    let tokens = lex(&source).map_err(|e| SyntaxError {
        offset: e.offset,
        message: e.message,
    })?;
    let parsed = Parser::new(&source, tokens).file()?;
    Ok(SourceFile {
        path: path.into(),
        source,
        package: parsed.package,
        package_end: parsed.package_end,
        imports: parsed.imports,
        decls: parsed.decls,
        added_imports: Default::default(),
    })
}

struct ParsedFile {
    package: String,
    package_end: usize,
    imports: Vec<Import>,
    decls: Vec<Decl>,
}

/// Keywords that begin a type and can therefore never be a parameter name.
const TYPE_KEYWORDS: &[&str] = &["chan", "func", "interface", "map", "struct"];

struct Parser<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(src: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
        }
    }

    // -----------------------------------------------------------------------
    // File structure
    // -----------------------------------------------------------------------

    fn file(mut self) -> PResult<ParsedFile> {
        self.skip_semis();
        self.expect("package")?;
        let name_tok = self.peek();
        let package = self.expect_ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        loop {
            self.skip_semis();
            if !self.at("import") {
                break;
            }
            self.import_decl(&mut imports)?;
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semis();
            let tok = self.peek();
            if tok.kind == TokenKind::Eof {
                break;
            }
            match (tok.kind, self.text(tok)) {
                (TokenKind::Ident, "func") => decls.push(Decl::Func(self.func_decl()?)),
                (TokenKind::Ident, "type") => self.type_decl(&mut decls)?,
                (TokenKind::Ident, "var" | "const") => self.skip_decl()?,
                (TokenKind::Ident, "import") => {
                    return Err(self.error_here("imports must precede other declarations"))
                }
                _ => return Err(self.error_here("expected declaration")),
            }
        }

        Ok(ParsedFile {
            package,
            package_end: name_tok.span.end,
            imports,
            decls,
        })
    }

    fn import_decl(&mut self, out: &mut Vec<Import>) -> PResult<()> {
        self.expect("import")?;
        if self.eat("(") {
            loop {
                self.skip_semis();
                if self.eat(")") {
                    break;
                }
                self.import_spec(out)?;
                self.expect_semi()?;
            }
        } else {
            self.import_spec(out)?;
        }
        self.expect_semi()
    }

    fn import_spec(&mut self, out: &mut Vec<Import>) -> PResult<()> {
        let alias = if self.peek().kind == TokenKind::Ident || self.at(".") {
            let tok = self.bump();
            Some(self.text(tok).to_string())
        } else {
            None
        };
        let tok = self.peek();
        if tok.kind != TokenKind::String {
            return Err(self.error_here("expected import path"));
        }
        self.bump();
        let quoted = self.text(tok);
        out.push(Import {
            path: quoted[1..quoted.len() - 1].to_string(),
            alias,
        });
        Ok(())
    }

    fn type_decl(&mut self, decls: &mut Vec<Decl>) -> PResult<()> {
        self.expect("type")?;
        if self.eat("(") {
            loop {
                self.skip_semis();
                if self.eat(")") {
                    break;
                }
                decls.push(Decl::Type(self.type_spec()?));
                self.expect_semi()?;
            }
        } else {
            decls.push(Decl::Type(self.type_spec()?));
        }
        self.expect_semi()
    }

    fn type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.expect_ident()?;
        if self.at("[") && self.has_type_params() {
            self.skip_balanced()?;
        }
        self.eat("=");
        let kind = if self.at("struct") {
            self.bump();
            if !self.at("{") {
                return Err(self.error_here("expected '{'"));
            }
            self.skip_balanced()?;
            TypeKind::Struct
        } else if self.at("interface") {
            TypeKind::Interface(self.interface_body()?)
        } else {
            self.parse_type()?;
            TypeKind::Other
        };
        Ok(TypeSpec { name, kind })
    }

    /// `type G[T any]` rather than the array type `type A [N]T`.
    fn has_type_params(&self) -> bool {
        let first = self.peek_at(1);
        let second = self.peek_at(2);
        first.kind == TokenKind::Ident && !(second.kind == TokenKind::Punct && self.text(second) == "]")
    }

    fn interface_body(&mut self) -> PResult<Vec<InterfaceElem>> {
        self.expect("interface")?;
        self.expect("{")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.eat("}") {
                break;
            }
            let tok = self.peek();
            if tok.kind == TokenKind::Ident && self.text(self.peek_at(1)) == "(" {
                let name = self.expect_ident()?;
                let signature = self.signature()?;
                elems.push(InterfaceElem::Method { name, signature });
            } else {
                let start = self.pos;
                self.skip_until_semi()?;
                elems.push(InterfaceElem::Embed(self.verbatim(start)));
            }
            self.expect_semi()?;
        }
        Ok(elems)
    }

    fn func_decl(&mut self) -> PResult<FuncDecl> {
        self.expect("func")?;
        let receiver = if self.at("(") {
            Some(self.receiver()?)
        } else {
            None
        };
        let name = self.expect_ident()?;
        if self.at("[") {
            self.skip_balanced()?;
        }
        let sig_start = self.peek().span.start;
        let signature = self.signature()?;
        let signature_span = Span::new(sig_start, self.prev_end());
        let body = if self.at("{") {
            Some(self.body()?)
        } else {
            None
        };
        self.expect_semi()?;
        Ok(FuncDecl {
            receiver,
            name,
            signature,
            signature_span,
            body,
            rewritten: false,
        })
    }

    fn receiver(&mut self) -> PResult<Receiver> {
        self.expect("(")?;
        let next = self.peek_at(1);
        let name = if self.peek().kind == TokenKind::Ident
            && (next.kind == TokenKind::Ident || self.text(next) == "*")
        {
            let tok = self.bump();
            Some(self.text(tok).to_string())
        } else {
            None
        };
        let pointer = self.eat("*");
        let type_name = self.expect_ident()?;
        if self.at("[") {
            self.skip_balanced()?;
        }
        self.expect(")")?;
        Ok(Receiver {
            name,
            type_name,
            pointer,
        })
    }

    fn body(&mut self) -> PResult<Body> {
        let mut first = self.pos + 1;
        while self.token_at(first).kind == TokenKind::Semi {
            first += 1;
        }
        let head = self.token_at(first);
        let starts_with_panic = head.kind == TokenKind::Ident
            && self.text(head) == "panic"
            && self.text(self.token_at(first + 1)) == "(";
        let span = self.skip_balanced()?;
        Ok(Body {
            span,
            starts_with_panic,
            guard: None,
        })
    }

    fn skip_decl(&mut self) -> PResult<()> {
        self.bump();
        if self.at("(") {
            self.skip_balanced()?;
        } else {
            self.skip_until_semi()?;
        }
        self.expect_semi()
    }

    // -----------------------------------------------------------------------
    // Signatures and types
    // -----------------------------------------------------------------------

    fn signature(&mut self) -> PResult<MethodSignature> {
        let params = self.param_list()?;
        let results = if self.at("(") {
            self.param_list()?
        } else if self.starts_type() {
            vec![Param::unnamed(self.parse_type()?)]
        } else {
            Vec::new()
        };
        Ok(MethodSignature::new(params, results))
    }

    fn starts_type(&self) -> bool {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Ident => true,
            TokenKind::Punct => matches!(self.text(tok), "*" | "[" | "(" | "<-"),
            _ => false,
        }
    }

    /// `(a, b int, c string)` → one [`Param`] per name.
    fn param_list(&mut self) -> PResult<Vec<Param>> {
        let open = self.expect("(")?;
        let mut entries: Vec<(Option<String>, TypeExpr)> = Vec::new();
        loop {
            if self.eat(")") {
                break;
            }
            let tok = self.peek();
            let next = self.peek_at(1);
            let named = tok.kind == TokenKind::Ident
                && !TYPE_KEYWORDS.contains(&self.text(tok))
                && !(next.kind == TokenKind::Punct && matches!(self.text(next), "." | "," | ")"));
            if named {
                let name_tok = self.bump();
                let name = self.text(name_tok).to_string();
                entries.push((Some(name), self.param_type()?));
            } else {
                entries.push((None, self.param_type()?));
            }
            if !self.eat(",") {
                self.expect(")")?;
                break;
            }
        }

        if entries.iter().all(|(name, _)| name.is_none()) {
            return Ok(entries.into_iter().map(|(_, ty)| Param::unnamed(ty)).collect());
        }

        // Named list: a bare identifier takes the type of the next named entry.
        let mut params = Vec::with_capacity(entries.len());
        let mut group_type: Option<TypeExpr> = None;
        for (name, ty) in entries.into_iter().rev() {
            match name {
                Some(name) => {
                    group_type = Some(ty.clone());
                    params.push(Param::named(name, ty));
                }
                None => {
                    let bare = match &ty {
                        TypeExpr::Named {
                            namespace: None,
                            name,
                        } => Some(name.clone()),
                        TypeExpr::Basic(name) => Some(name.clone()),
                        _ => None,
                    };
                    match (bare, &group_type) {
                        (Some(name), Some(group)) => params.push(Param::named(name, group.clone())),
                        _ => {
                            return Err(SyntaxError {
                                offset: open.span.start,
                                message: "mixed named and unnamed parameters".to_string(),
                            })
                        }
                    }
                }
            }
        }
        params.reverse();
        Ok(params)
    }

    fn param_type(&mut self) -> PResult<TypeExpr> {
        if self.eat("...") {
            return Ok(TypeExpr::variadic(self.parse_type()?));
        }
        self.parse_type()
    }

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let start = self.pos;
        let tok = self.peek();
        match (tok.kind, self.text(tok)) {
            (TokenKind::Ident, "map") => {
                self.bump();
                self.expect("[")?;
                let key = self.parse_type()?;
                self.expect("]")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::map(key, value))
            }
            (TokenKind::Ident, "chan") => {
                self.bump();
                let dir = if self.eat("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::channel(dir, self.parse_type()?))
            }
            (TokenKind::Ident, "func") => {
                self.bump();
                Ok(TypeExpr::Func(self.signature()?))
            }
            (TokenKind::Ident, "struct") => {
                self.bump();
                if !self.at("{") {
                    return Err(self.error_here("expected '{'"));
                }
                self.skip_balanced()?;
                Ok(TypeExpr::Verbatim(self.verbatim(start)))
            }
            (TokenKind::Ident, "interface") => {
                self.bump();
                if !self.at("{") {
                    return Err(self.error_here("expected '{'"));
                }
                if self.text(self.peek_at(1)) == "}" {
                    self.bump();
                    self.bump();
                    return Ok(TypeExpr::EmptyInterface);
                }
                self.skip_balanced()?;
                Ok(TypeExpr::Verbatim(self.verbatim(start)))
            }
            (TokenKind::Ident, "any") => {
                self.bump();
                Ok(TypeExpr::EmptyInterface)
            }
            (TokenKind::Ident, word) => {
                self.bump();
                let ty = if self.at(".") && self.peek_at(1).kind == TokenKind::Ident {
                    self.bump();
                    let name_tok = self.bump();
                    TypeExpr::qualified(word, self.text(name_tok))
                } else if is_basic_type(word) {
                    TypeExpr::basic(word)
                } else {
                    TypeExpr::local(word)
                };
                if self.eat("[") {
                    let args = self.type_args()?;
                    return Ok(TypeExpr::generic(ty, args));
                }
                Ok(ty)
            }
            (TokenKind::Punct, "*") => {
                self.bump();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            (TokenKind::Punct, "[") => {
                if self.text(self.peek_at(1)) == "]" {
                    self.bump();
                    self.bump();
                    return Ok(TypeExpr::slice(self.parse_type()?));
                }
                self.bump();
                let len_start = self.pos;
                self.skip_until_semi()?;
                let len = self.verbatim(len_start);
                self.expect("]")?;
                if len.is_empty() {
                    return Err(self.error_here("expected array length"));
                }
                Ok(TypeExpr::array(len, self.parse_type()?))
            }
            (TokenKind::Punct, "<-") => {
                self.bump();
                self.expect("chan")?;
                Ok(TypeExpr::channel(ChanDir::Recv, self.parse_type()?))
            }
            (TokenKind::Punct, "(") => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(")")?;
                Ok(inner)
            }
            _ => Err(self.error_here("expected type")),
        }
    }

    /// `A, B]` after the opening bracket of a generic instantiation.
    fn type_args(&mut self) -> PResult<Vec<TypeExpr>> {
        let mut args = vec![self.parse_type()?];
        while self.eat(",") {
            if self.at("]") {
                break;
            }
            args.push(self.parse_type()?);
        }
        self.expect("]")?;
        Ok(args)
    }

    /// Canonical text of the tokens consumed since `start`, so the same type
    /// written with different spacing compares equal.
    fn verbatim(&self, start: usize) -> String {
        let mut out = String::new();
        let mut prev: Option<Token> = None;
        for tok in &self.tokens[start..self.pos] {
            let text = if tok.kind == TokenKind::Semi {
                ";"
            } else {
                self.text(*tok)
            };
            if let Some(p) = prev {
                let prev_text = self.text(p);
                let word = |t: &Token| matches!(t.kind, TokenKind::Ident | TokenKind::Number);
                let space = (word(&p) && word(tok))
                    || matches!(prev_text, "," | ";")
                    || p.kind == TokenKind::Semi
                    || (prev_text == ")" && (word(tok) || matches!(text, "(" | "*" | "[")));
                if space {
                    out.push(' ');
                }
            }
            out.push_str(text);
            prev = Some(*tok);
        }
        out
    }

    // -----------------------------------------------------------------------
    // Skipping
    // -----------------------------------------------------------------------

    /// Consume a bracketed group starting at the current opening bracket.
    fn skip_balanced(&mut self) -> PResult<Span> {
        let open = self.peek();
        let mut depth = 0usize;
        loop {
            let tok = self.bump();
            match (tok.kind, self.text(tok)) {
                (TokenKind::Eof, _) => {
                    return Err(SyntaxError {
                        offset: open.span.start,
                        message: "unbalanced brackets".to_string(),
                    })
                }
                (TokenKind::Punct, "(" | "[" | "{") => depth += 1,
                (TokenKind::Punct, ")" | "]" | "}") => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(Span::new(open.span.start, tok.span.end));
                    }
                }
                _ => {}
            }
        }
    }

    /// Advance to the next semicolon or closing bracket at depth zero.
    fn skip_until_semi(&mut self) -> PResult<()> {
        loop {
            let tok = self.peek();
            match (tok.kind, self.text(tok)) {
                (TokenKind::Semi | TokenKind::Eof, _) => return Ok(()),
                (TokenKind::Punct, "(" | "[" | "{") => {
                    self.skip_balanced()?;
                }
                (TokenKind::Punct, ")" | "]" | "}") => return Ok(()),
                _ => {
                    self.bump();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------------

    fn token_at(&self, index: usize) -> Token {
        self.tokens[index.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> Token {
        self.token_at(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Token {
        self.token_at(self.pos + offset)
    }

    fn text(&self, tok: Token) -> &'src str {
        &self.src[tok.span.start..tok.span.end]
    }

    fn bump(&mut self) -> Token {
        let tok = self.peek();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map(|i| self.tokens[i].span.end)
            .unwrap_or(0)
    }

    fn at(&self, text: &str) -> bool {
        let tok = self.peek();
        matches!(tok.kind, TokenKind::Punct | TokenKind::Ident) && self.text(tok) == text
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> PResult<Token> {
        if self.at(text) {
            Ok(self.bump())
        } else {
            Err(self.error_here(&format!("expected '{text}'")))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        let tok = self.peek();
        if tok.kind != TokenKind::Ident {
            return Err(self.error_here("expected identifier"));
        }
        self.bump();
        Ok(self.text(tok).to_string())
    }

    fn skip_semis(&mut self) {
        while self.peek().kind == TokenKind::Semi {
            self.bump();
        }
    }

    /// A statement ends at `;`, a line break, a closing bracket or EOF.
    fn expect_semi(&mut self) -> PResult<()> {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Semi => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::Punct if matches!(self.text(tok), ")" | "}") => Ok(()),
            _ => Err(self.error_here("expected ';' or newline")),
        }
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let tok = self.peek();
        let found = match tok.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Semi if tok.span.start == tok.span.end => "newline".to_string(),
            _ => format!("'{}'", self.text(tok)),
        };
        SyntaxError {
            offset: tok.span.start,
            message: format!("{message}, found {found}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> SourceFile {
        parse_file("test.go", src).expect("parse")
    }

    fn only_func(file: &SourceFile) -> &FuncDecl {
        file.funcs().next().expect("one func")
    }

    #[test]
    fn package_and_imports() {
        let file = parse(
            "package resolver\n\nimport (\n\t\"context\"\n\tm \"example.com/app/gql\"\n)\n\nimport \"fmt\"\n",
        );
        assert_eq!(file.package, "resolver");
        assert_eq!(
            file.imports,
            vec![
                Import::new("context"),
                Import::aliased("m", "example.com/app/gql"),
                Import::new("fmt"),
            ]
        );
    }

    #[test]
    fn method_with_pointer_receiver() {
        let file = parse(
            "package r\n\nfunc (r *queryResolver) Todos(ctx context.Context, limit *int) ([]*gql.Todo, error) {\n\treturn nil, nil\n}\n",
        );
        let f = only_func(&file);
        assert_eq!(f.key(), "queryResolver.Todos");
        assert!(f.receiver.as_ref().unwrap().pointer);
        assert_eq!(
            f.signature,
            MethodSignature::new(
                vec![
                    Param::named("ctx", TypeExpr::qualified("context", "Context")),
                    Param::named("limit", TypeExpr::pointer(TypeExpr::basic("int"))),
                ],
                vec![
                    Param::unnamed(TypeExpr::slice(TypeExpr::pointer(TypeExpr::qualified(
                        "gql", "Todo"
                    )))),
                    Param::unnamed(TypeExpr::basic("error")),
                ],
            )
        );
        assert!(!f.body.as_ref().unwrap().starts_with_panic);
    }

    #[test]
    fn grouped_parameters_are_flattened() {
        let file = parse("package r\nfunc F(a, b int, c string) {}\n");
        let names: Vec<_> = only_func(&file)
            .signature
            .params
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(names, vec!["a int", "b int", "c string"]);
    }

    #[test]
    fn value_receiver_without_name() {
        let file = parse("package r\nfunc (Resolver) Query() QueryResolver { return nil }\n");
        let f = only_func(&file);
        assert_eq!(f.key(), "Resolver.Query");
        assert_eq!(
            f.signature.results,
            vec![Param::unnamed(TypeExpr::local("QueryResolver"))]
        );
    }

    #[test]
    fn interface_methods_and_embeds() {
        let file = parse(
            "package gql\n\ntype ResolverRoot interface {\n\tQuery() QueryResolver\n\tfmt.Stringer\n}\n\ntype QueryResolver interface {\n\tTodos(ctx context.Context) ([]*Todo, error)\n\tNode(ctx context.Context, id string) (Node, error)\n}\n",
        );
        let specs: Vec<_> = file.type_specs().collect();
        assert_eq!(specs.len(), 2);
        let TypeKind::Interface(elems) = &specs[0].kind else {
            panic!("expected interface");
        };
        assert_eq!(elems.len(), 2);
        assert_eq!(elems[1], InterfaceElem::Embed("fmt.Stringer".to_string()));
        let TypeKind::Interface(elems) = &specs[1].kind else {
            panic!("expected interface");
        };
        let names: Vec<_> = elems
            .iter()
            .map(|e| match e {
                InterfaceElem::Method { name, .. } => name.as_str(),
                InterfaceElem::Embed(text) => text.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["Todos", "Node"]);
    }

    #[test]
    fn grouped_type_declarations() {
        let file = parse(
            "package r\n\ntype (\n\tResolver struct{ db *sql.DB }\n\tqueryResolver struct{ *Resolver }\n\tID = string\n)\n",
        );
        let names: Vec<_> = file.type_specs().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Resolver", "queryResolver", "ID"]);
        assert_eq!(file.type_specs().nth(2).unwrap().kind, TypeKind::Other);
    }

    #[test]
    fn channels_maps_and_empty_interfaces() {
        let file = parse(
            "package r\nfunc F(a <-chan int, b chan<- string, c map[string]interface{}, d any) {}\n",
        );
        let rendered: Vec<_> = only_func(&file)
            .signature
            .params
            .iter()
            .map(|p| p.ty.to_string())
            .collect();
        assert_eq!(
            rendered,
            vec!["<-chan int", "chan<- string", "map[string]interface{}", "interface{}"]
        );
    }

    #[test]
    fn function_types_arrays_and_variadics() {
        let file = parse("package r\nfunc F(cb func(ctx  context.Context) error, xs [4]byte, rest ...string) {}\n");
        let tys: Vec<_> = only_func(&file)
            .signature
            .params
            .iter()
            .map(|p| p.ty.clone())
            .collect();
        assert_eq!(
            tys,
            vec![
                TypeExpr::Func(MethodSignature::new(
                    vec![Param::named("ctx", TypeExpr::qualified("context", "Context"))],
                    vec![Param::unnamed(TypeExpr::basic("error"))],
                )),
                TypeExpr::array("4", TypeExpr::basic("byte")),
                TypeExpr::variadic(TypeExpr::basic("string")),
            ]
        );
        assert_eq!(tys[0].to_string(), "func(ctx context.Context) error");
    }

    #[test]
    fn qualified_names_inside_composite_types() {
        let file = parse(
            "package r\nfunc (r *q) Many(ids ...gql.Todo, n [N * 2]gql.ID, p gql.Page[gql.Todo, int]) [2]gql.Todo {}\n",
        );
        let sig = &only_func(&file).signature;
        let rendered: Vec<_> = sig.params.iter().map(|p| p.ty.to_string()).collect();
        assert_eq!(rendered, vec!["...gql.Todo", "[N*2]gql.ID", "gql.Page[gql.Todo, int]"]);
        assert_eq!(
            sig.params[2].ty,
            TypeExpr::generic(
                TypeExpr::qualified("gql", "Page"),
                vec![TypeExpr::qualified("gql", "Todo"), TypeExpr::basic("int")],
            )
        );
        assert_eq!(
            sig.results,
            vec![Param::unnamed(TypeExpr::array("2", TypeExpr::qualified("gql", "Todo")))]
        );
    }

    #[test]
    fn panic_as_first_statement_is_detected() {
        let file = parse(
            "package r\nfunc (r *a) F() {\n\n\tpanic(\"FIXME\")\n\treturn\n}\n",
        );
        assert!(only_func(&file).body.as_ref().unwrap().starts_with_panic);
    }

    #[test]
    fn skips_vars_consts_and_bodies_with_braces_in_strings() {
        let file = parse(
            "package r\n\nvar (\n\tx = map[string]int{\"}\": 1}\n)\n\nconst y = `{`\n\nvar z = func() int {\n\treturn 1\n}()\n\nfunc G() string { return \"}\" }\n",
        );
        assert_eq!(file.funcs().count(), 1);
        assert_eq!(only_func(&file).name, "G");
    }

    #[test]
    fn generic_receivers_and_type_params() {
        let file = parse(
            "package r\ntype Box[T any] struct{ v T }\nfunc (b *Box[T]) Get() T { return b.v }\nfunc Map[T, U any](xs []T) []U { return nil }\n",
        );
        let keys: Vec<_> = file.funcs().map(FuncDecl::key).collect();
        assert_eq!(keys, vec!["Box.Get", "Map"]);
    }

    #[test]
    fn syntax_error_reports_offset() {
        let err = parse_file("bad.go", "package r\nfunc (r *x Broken(\n").unwrap_err();
        assert!(err.message.contains("expected ')'"), "{}", err.message);
    }

    #[test]
    fn missing_package_clause_is_an_error() {
        let err = parse_file("bad.go", "func F() {}\n").unwrap_err();
        assert_eq!(err.offset, 0);
    }
}
