//! The Pratt-style parser (component C): turns a token stream into an
//! [`Expr`] tree, consulting [`crate::registry`] for binding powers and
//! keyword/axis/node-type classification the lexer doesn't attempt.
//!
//! Comment folding is done here, not in the lexer: `(:` / `:)` can nest, and
//! deciding which token a comment attaches to needs the token stream the
//! lexer doesn't keep around.

mod sequence_type;

use std::rc::Rc;

use xpath2_lexer::{Lexer, Token};
use xpath2_name::Name;

use crate::ast::{
    Binding, Expr, ExprKind, GeneralCompareOp, NodeCompareOp, NodeTest, SetOp, Step,
    ValueCompareOp,
};
use crate::atomic::ops::ArithOp as AtomicArithOp;
use crate::ast::ArithOp;
use crate::context::StaticContext;
use crate::error::{Error, SpannedError, SpannedResult};
use crate::registry::{self, Axis};
use crate::span::SourceSpan;

type ParseResult<T> = SpannedResult<T>;

/// `ast::ArithOp` and `atomic::ops::ArithOp` are deliberately two distinct
/// types — the first is a parse-time AST tag, the second an evaluation-time
/// operation descriptor consumed by [`crate::atomic::ops`] — kept in sync by
/// this conversion rather than merged, so `atomic::ops` has no dependency on
/// the AST.
impl From<ArithOp> for AtomicArithOp {
    fn from(op: ArithOp) -> Self {
        match op {
            ArithOp::Add => AtomicArithOp::Add,
            ArithOp::Subtract => AtomicArithOp::Subtract,
            ArithOp::Multiply => AtomicArithOp::Multiply,
            ArithOp::Divide => AtomicArithOp::Divide,
            ArithOp::IntegerDivide => AtomicArithOp::IntegerDivide,
            ArithOp::Modulo => AtomicArithOp::Modulo,
        }
    }
}

/// A single lexical token plus the comment folded onto it, if any.
struct Lexeme<'a> {
    token: Token<'a>,
    span: SourceSpan,
    comment: Option<String>,
}

fn tokenize_with_comments(source: &str) -> ParseResult<Vec<Lexeme<'_>>> {
    let mut out: Vec<Lexeme<'_>> = Vec::new();
    let mut pending_comment: Option<String> = None;
    let mut lexer = Lexer::new(source);
    while let Some((token, span)) = lexer.next() {
        match token {
            Token::Whitespace => continue,
            Token::Error => {
                return Err(Error::XPST0003.with_span(SourceSpan::from(span)));
            }
            Token::CommentStart => {
                let comment_start = span.start;
                let mut depth = 1usize;
                let mut comment_end = span.end;
                loop {
                    match lexer.next() {
                        Some((Token::CommentStart, s)) => {
                            depth += 1;
                            comment_end = s.end;
                        }
                        Some((Token::CommentEnd, s)) => {
                            depth -= 1;
                            comment_end = s.end;
                            if depth == 0 {
                                break;
                            }
                        }
                        Some((_, s)) => comment_end = s.end,
                        None => {
                            return Err(Error::XPST0003
                                .with_span(SourceSpan::from(comment_start..source.len())));
                        }
                    }
                }
                let text = source[comment_start + 2..comment_end - 2].to_string();
                if let Some(last) = out.last_mut() {
                    last.comment = Some(match last.comment.take() {
                        Some(existing) => format!("{existing} {text}"),
                        None => text,
                    });
                } else {
                    pending_comment = Some(match pending_comment.take() {
                        Some(existing) => format!("{existing} {text}"),
                        None => text,
                    });
                }
            }
            Token::CommentEnd => {
                return Err(Error::XPST0003.with_span(SourceSpan::from(span)));
            }
            _ => out.push(Lexeme {
                token,
                span: SourceSpan::from(span),
                comment: pending_comment.take(),
            }),
        }
    }
    Ok(out)
}

struct TokenStream<'a> {
    lexemes: Vec<Lexeme<'a>>,
    pos: usize,
    source_len: usize,
}

impl<'a> TokenStream<'a> {
    fn new(lexemes: Vec<Lexeme<'a>>, source_len: usize) -> Self {
        Self { lexemes, pos: 0, source_len }
    }

    fn peek_token(&self) -> Option<&Token<'a>> {
        self.lexemes.get(self.pos).map(|l| &l.token)
    }

    fn peek_token_at(&self, offset: usize) -> Option<&Token<'a>> {
        self.lexemes.get(self.pos + offset).map(|l| &l.token)
    }

    fn peek_is_ncname(&self, name: &str) -> bool {
        matches!(self.peek_token(), Some(Token::NCName(n)) if *n == name)
    }

    fn peek_span(&self) -> SourceSpan {
        self.lexemes
            .get(self.pos)
            .map(|l| l.span)
            .unwrap_or_else(|| SourceSpan::new(self.source_len, self.source_len))
    }

    fn current_span(&self) -> SourceSpan {
        if self.pos == 0 {
            self.peek_span()
        } else {
            self.lexemes
                .get(self.pos - 1)
                .map(|l| l.span)
                .unwrap_or_else(|| self.peek_span())
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    /// Consumes and returns the current lexeme.
    fn advance(&mut self) -> ParseResult<Lexeme<'a>> {
        if self.pos >= self.lexemes.len() {
            return Err(Error::XPST0003.with_span(self.peek_span()));
        }
        let mut placeholder = Lexeme { token: Token::Error, span: self.peek_span(), comment: None };
        std::mem::swap(&mut placeholder, &mut self.lexemes[self.pos]);
        self.pos += 1;
        Ok(placeholder)
    }

    fn expect(&mut self, expected: &Token<'_>) -> ParseResult<SourceSpan> {
        let span = self.peek_span();
        match self.peek_token() {
            Some(t) if t == expected => {
                self.advance()?;
                Ok(span)
            }
            _ => Err(Error::XPST0003.with_span(span)),
        }
    }

    fn expect_ncname(&mut self, expected: &str) -> ParseResult<SourceSpan> {
        let span = self.peek_span();
        match self.peek_token() {
            Some(Token::NCName(n)) if *n == expected => {
                self.advance()?;
                Ok(span)
            }
            _ => Err(Error::XPST0003.with_span(span)),
        }
    }
}

/// Binds the current token's textual "symbol" (the string the precedence
/// table is keyed on) for binding-power lookups — operators map directly,
/// operator keywords (`and`, `to`, `instance`, ...) come through as
/// `NCName`s since the lexer doesn't recognize keywords.
fn current_symbol<'a>(token: &Token<'a>) -> Option<&'a str> {
    Some(match token {
        Token::NCName(n) => n,
        Token::Comma => ",",
        Token::Plus => "+",
        Token::Minus => "-",
        Token::Asterisk => "*",
        Token::Pipe => "|",
        Token::Equal => "=",
        Token::NotEqual => "!=",
        Token::LessThan => "<",
        Token::LessThanEqual => "<=",
        Token::GreaterThan => ">",
        Token::GreaterThanEqual => ">=",
        Token::Precedes => "<<",
        Token::Follows => ">>",
        Token::Slash => "/",
        Token::DoubleSlash => "//",
        Token::LeftBracket => "[",
        _ => return None,
    })
}

/// The parse-time engine for one `parse` call: holds the static context it
/// resolves names against and the token stream for the text being parsed.
pub struct Parser<'a> {
    static_context: &'a StaticContext,
    tokens: TokenStream<'a>,
    source: &'a str,
}

impl<'a> Parser<'a> {
    /// Parses `source` to completion against `static_context`, per the
    /// parser's public surface (§6): a namespace-aware, schema-aware
    /// front end producing one [`Expr`] tree.
    pub fn parse(static_context: &'a StaticContext, source: &'a str) -> ParseResult<Expr> {
        let lexemes = tokenize_with_comments(source)?;
        let mut parser = Parser {
            static_context,
            tokens: TokenStream::new(lexemes, source.len()),
            source,
        };
        let expr = parser.parse_expr(0)?;
        if !parser.tokens.at_end() {
            return Err(Error::XPST0003.with_span(parser.tokens.peek_span()));
        }
        Ok(expr)
    }

    fn span_from(&self, start: SourceSpan) -> SourceSpan {
        let end = self.tokens.current_span();
        SourceSpan::new(start.range().start, end.range().end)
    }

    /// `None` when the static context declares no default element
    /// namespace (the empty string is `Namespaces`' "unset" sentinel, not a
    /// real namespace URI).
    fn default_element_namespace(&self) -> Option<&'a str> {
        let ns = self.static_context.namespaces().default_element_namespace();
        if ns.is_empty() { None } else { Some(ns) }
    }

    fn peek_led_binding_power(&self) -> Option<u8> {
        let token = self.tokens.peek_token()?;
        let symbol = current_symbol(token)?;
        registry::infix_binding_power(symbol)
    }

    fn parse_expr(&mut self, rbp: u8) -> ParseResult<Expr> {
        let mut left = self.parse_nud()?;
        loop {
            match self.peek_led_binding_power() {
                Some(bp) if bp > rbp => {
                    left = self.parse_led(left, bp)?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // ---- nud: expressions that can open (literals, prefix ops, keywords, steps) ----

    fn parse_nud(&mut self) -> ParseResult<Expr> {
        if let Some(kind_test) = self.try_parse_kind_test()? {
            let start = self.tokens.current_span();
            return Ok(Expr::new(ExprKind::KindTestExpr(kind_test), start));
        }
        let start = self.tokens.peek_span();
        let lexeme = self.tokens.advance()?;
        let comment = lexeme.comment;
        let expr = match lexeme.token {
            Token::IntegerLiteral(v) => Expr::new(ExprKind::IntegerLiteral(v), lexeme.span),
            Token::DecimalLiteral(v) => Expr::new(ExprKind::DecimalLiteral(v), lexeme.span),
            Token::DoubleLiteral(v) => Expr::new(ExprKind::DoubleLiteral(v), lexeme.span),
            Token::StringLiteral(s) => {
                Expr::new(ExprKind::StringLiteral(Rc::from(s.as_ref())), lexeme.span)
            }
            Token::LeftParen => self.parse_parenthesized(start)?,
            Token::Dot => Expr::new(ExprKind::ContextItem, lexeme.span),
            Token::DotDot => {
                self.parse_first_step(Axis::Parent, NodeTest::Kind(crate::ast::KindTest::Node), start)?
            }
            Token::At => {
                let test = self.parse_node_test()?;
                self.parse_first_step(Axis::Attribute, test, start)?
            }
            Token::Asterisk => self.parse_first_step(Axis::Child, NodeTest::Wildcard, start)?,
            Token::Dollar => {
                let name = self.parse_qname()?;
                Expr::new(ExprKind::VarRef(name), self.span_from(start))
            }
            Token::Minus => {
                let operand = self.parse_expr(70)?;
                Expr::new(ExprKind::Negate(Box::new(operand)), self.span_from(start))
            }
            Token::Plus => self.parse_expr(70)?,
            Token::Slash => self.parse_absolute_path(start, false)?,
            Token::DoubleSlash => self.parse_absolute_path(start, true)?,
            Token::NCName(name) => self.parse_ncname_nud(name, start)?,
            Token::BracedURILiteral(uri) => {
                let local = self.parse_local_after_braced_uri()?;
                let name = Name::uri_qualified(uri, &local);
                self.parse_name_or_call(name, start)?
            }
            _ => return Err(Error::XPST0003.with_span(start)),
        };
        Ok(match comment {
            Some(c) => expr.with_comment(c),
            None => expr,
        })
    }

    fn parse_parenthesized(&mut self, start: SourceSpan) -> ParseResult<Expr> {
        if self.tokens.peek_token() == Some(&Token::RightParen) {
            self.tokens.advance()?;
            return Ok(Expr::new(ExprKind::EmptySequence, self.span_from(start)));
        }
        let mut items = vec![self.parse_expr(0)?];
        while self.tokens.peek_token() == Some(&Token::Comma) {
            self.tokens.advance()?;
            items.push(self.parse_expr(5)?);
        }
        self.tokens.expect(&Token::RightParen)?;
        let span = self.span_from(start);
        let kind = if items.len() == 1 {
            return Ok(items.into_iter().next().unwrap());
        } else {
            ExprKind::Sequence(items)
        };
        Ok(Expr::new(kind, span))
    }

    fn parse_local_after_braced_uri(&mut self) -> ParseResult<String> {
        match self.tokens.peek_token() {
            Some(Token::NCName(n)) => {
                let n = n.to_string();
                self.tokens.advance()?;
                Ok(n)
            }
            _ => Err(Error::XPST0003.with_span(self.tokens.peek_span())),
        }
    }

    /// Dispatch for a bare `NCName` in primary-expression position: a
    /// compound keyword (`if`/`for`/`some`/`every`), an axis (`child::`),
    /// `instance`/`cast`-family leading names never reach here (they're
    /// `led`s), a function call, a constructor, or — the fallback — a
    /// relative path step naming a child element.
    fn parse_ncname_nud(&mut self, name: &'a str, start: SourceSpan) -> ParseResult<Expr> {
        match name {
            "if" => self.parse_if(start),
            "for" => self.parse_for(start),
            "some" => self.parse_quantifier(start, false),
            "every" => self.parse_quantifier(start, true),
            _ => {
                if self.tokens.peek_token() == Some(&Token::DoubleColon) {
                    let axis = registry::lookup_axis(name)
                        .ok_or_else(|| Error::XPST0003.with_span(start))?;
                    self.tokens.advance()?;
                    let test = self.parse_node_test()?;
                    self.parse_first_step(axis, test, start)
                } else {
                    let qname = self.resolve_ncname_as_qname(name)?;
                    self.parse_name_or_call(qname, start)
                }
            }
        }
    }

    /// Builds a full `Name` for a bare (possibly prefixed via `:`) name
    /// already positioned at the first `NCName`.
    fn resolve_ncname_as_qname(&mut self, first: &'a str) -> ParseResult<Name> {
        if self.tokens.peek_token() == Some(&Token::Colon) {
            self.tokens.advance()?;
            match self.tokens.peek_token() {
                Some(Token::NCName(local)) => {
                    let local = local.to_string();
                    self.tokens.advance()?;
                    Name::prefixed(first, &local, self.static_context.namespaces())
                        .ok_or_else(|| Error::XPST0081.with_span(self.tokens.current_span()))
                }
                _ => Err(Error::XPST0003.with_span(self.tokens.peek_span())),
            }
        } else {
            Ok(Name::unprefixed(first).with_default_namespace(self.default_element_namespace()))
        }
    }

    /// Given a resolved name, decides whether it opens a function call, a
    /// constructor, or a relative path step (the fallback when no `(`
    /// follows — a bare name is always a `NodeTest`, never a standalone
    /// value reference, per the grammar).
    fn parse_name_or_call(&mut self, name: Name, start: SourceSpan) -> ParseResult<Expr> {
        if self.tokens.peek_token() == Some(&Token::LeftParen) {
            self.parse_call_or_constructor(name, start)
        } else if self.tokens.peek_token() == Some(&Token::Colon) {
            // `prefix:*` wildcard local-name test.
            self.tokens.advance()?;
            self.tokens.expect(&Token::Asterisk)?;
            self.parse_first_step(
                Axis::Child,
                NodeTest::WildcardLocal(name.to_full_name()),
                start,
            )
        } else {
            self.parse_first_step(Axis::Child, NodeTest::Name(name), start)
        }
    }

    fn parse_call_or_constructor(&mut self, name: Name, start: SourceSpan) -> ParseResult<Expr> {
        self.tokens.advance()?; // consume '('
        let arg = if self.tokens.peek_token() == Some(&Token::RightParen) {
            None
        } else {
            let mut args = vec![self.parse_expr(5)?];
            while self.tokens.peek_token() == Some(&Token::Comma) {
                self.tokens.advance()?;
                args.push(self.parse_expr(5)?);
            }
            Some(args)
        };
        self.tokens.expect(&Token::RightParen)?;
        let span = self.span_from(start);

        let is_constructor = name.namespace() == Some(xpath2_name::XS_NAMESPACE)
            && xpath2_schema_type::Xs::by_local_name(name.local_name()).is_some();
        let is_schema_constructor = !is_constructor
            && self.static_context.symbol_table().is_registered_constructor(&name.to_full_name());

        if is_constructor || is_schema_constructor {
            let arity_ok = match &arg {
                None => true,
                Some(a) => a.len() == 1,
            };
            if !arity_ok {
                return Err(Error::XPST0017.with_span(span));
            }
            let single = arg.map(|mut a| Box::new(a.remove(0)));
            let kind = if is_constructor {
                ExprKind::Constructor(name, single)
            } else {
                ExprKind::SchemaConstructor(name, single)
            };
            let expr = Expr::new(kind, span);
            return Ok(self.try_static_constructor_fold(expr));
        }

        let args = arg.unwrap_or_default();
        Ok(Expr::new(ExprKind::FunctionCall(name, args), span))
    }

    /// §4.C "static pre-evaluation for constructors": immediately attempt
    /// to evaluate a freshly parsed constructor call with no dynamic
    /// context. A literal argument (`xs:date("2024-01-01")`) evaluates
    /// cleanly and folds to its value right here; anything depending on the
    /// dynamic context fails with `XPDY0002` and is left for runtime. Any
    /// other error is swallowed too — it will resurface, identically, when
    /// the unevaluated node is actually run.
    fn try_static_constructor_fold(&self, expr: Expr) -> Expr {
        match crate::eval::try_evaluate_constructor_statically(&expr) {
            Some(Ok(value)) => Expr::new(ExprKind::AtomicValue(value), expr.span),
            _ => expr,
        }
    }

    fn parse_if(&mut self, start: SourceSpan) -> ParseResult<Expr> {
        self.tokens.expect(&Token::LeftParen)?;
        let cond = self.parse_expr(0)?;
        self.tokens.expect(&Token::RightParen)?;
        self.tokens.expect_ncname("then")?;
        let then_branch = self.parse_expr(registry::COMPOUND_KEYWORD_BP)?;
        self.tokens.expect_ncname("else")?;
        let else_branch = self.parse_expr(registry::COMPOUND_KEYWORD_BP)?;
        Ok(Expr::new(
            ExprKind::If(Box::new(cond), Box::new(then_branch), Box::new(else_branch)),
            self.span_from(start),
        ))
    }

    fn parse_bindings(&mut self) -> ParseResult<Vec<Binding>> {
        let mut bindings = Vec::new();
        loop {
            self.tokens.expect(&Token::Dollar)?;
            let name = self.parse_qname()?;
            self.tokens.expect_ncname("in")?;
            let source_expr = self.parse_expr(5)?;
            bindings.push(Binding { name, source: source_expr });
            if self.tokens.peek_token() == Some(&Token::Comma) {
                self.tokens.advance()?;
                continue;
            }
            break;
        }
        Ok(bindings)
    }

    fn parse_for(&mut self, start: SourceSpan) -> ParseResult<Expr> {
        let bindings = self.parse_bindings()?;
        self.tokens.expect_ncname("return")?;
        let body = self.parse_expr(registry::COMPOUND_KEYWORD_BP)?;
        Ok(Expr::new(ExprKind::For(bindings, Box::new(body)), self.span_from(start)))
    }

    fn parse_quantifier(&mut self, start: SourceSpan, is_every: bool) -> ParseResult<Expr> {
        let bindings = self.parse_bindings()?;
        self.tokens.expect_ncname("satisfies")?;
        let body = self.parse_expr(registry::COMPOUND_KEYWORD_BP)?;
        let kind = if is_every {
            ExprKind::Every(bindings, Box::new(body))
        } else {
            ExprKind::Some(bindings, Box::new(body))
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_node_test(&mut self) -> ParseResult<NodeTest> {
        if let Some(kind) = self.try_parse_kind_test()? {
            return Ok(NodeTest::Kind(kind));
        }
        match self.tokens.peek_token() {
            Some(Token::Asterisk) => {
                self.tokens.advance()?;
                Ok(NodeTest::Wildcard)
            }
            Some(Token::BracedURILiteral(uri)) => {
                let uri = uri.to_string();
                self.tokens.advance()?;
                let local = self.parse_local_after_braced_uri()?;
                Ok(NodeTest::Name(Name::uri_qualified(&uri, &local)))
            }
            Some(Token::NCName(n)) => {
                let n = *n;
                self.tokens.advance()?;
                if self.tokens.peek_token() == Some(&Token::Colon) {
                    self.tokens.advance()?;
                    if self.tokens.peek_token() == Some(&Token::Asterisk) {
                        self.tokens.advance()?;
                        return Ok(NodeTest::WildcardLocal(n.to_string()));
                    }
                    let name = self.resolve_ncname_as_qname(n)?;
                    Ok(NodeTest::Name(name))
                } else {
                    let name = Name::unprefixed(n).with_default_namespace(self.default_element_namespace());
                    Ok(NodeTest::Name(name))
                }
            }
            _ => Err(Error::XPST0003.with_span(self.tokens.peek_span())),
        }
    }

    fn parse_qname(&mut self) -> ParseResult<Name> {
        match self.tokens.peek_token() {
            Some(Token::NCName(n)) => {
                let n = *n;
                self.tokens.advance()?;
                self.resolve_ncname_as_qname(n)
            }
            Some(Token::BracedURILiteral(uri)) => {
                let uri = uri.to_string();
                self.tokens.advance()?;
                let local = self.parse_local_after_braced_uri()?;
                Ok(Name::uri_qualified(&uri, &local))
            }
            _ => Err(Error::XPST0003.with_span(self.tokens.peek_span())),
        }
    }

    // ---- path/step machinery ----

    /// `next_is_path_step_token`: whether the upcoming token can start a
    /// relative step (name test, `*`, `@`, `.`, `..`, or a braced-URI name).
    fn next_is_path_step_token(&self) -> bool {
        matches!(
            self.tokens.peek_token(),
            Some(Token::NCName(_))
                | Some(Token::Asterisk)
                | Some(Token::At)
                | Some(Token::Dot)
                | Some(Token::DotDot)
                | Some(Token::BracedURILiteral(_))
        )
    }

    fn parse_absolute_path(&mut self, start: SourceSpan, leading_double_slash: bool) -> ParseResult<Expr> {
        let mut steps = Vec::new();
        if leading_double_slash {
            steps.push(descendant_or_self_step(start));
        }
        if self.next_is_path_step_token() {
            let first = self.parse_step()?;
            steps.push(first);
            while matches!(self.tokens.peek_token(), Some(Token::Slash) | Some(Token::DoubleSlash)) {
                let is_double = self.tokens.peek_token() == Some(&Token::DoubleSlash);
                let sep_span = self.tokens.peek_span();
                self.tokens.advance()?;
                if is_double {
                    steps.push(descendant_or_self_step(sep_span));
                }
                steps.push(self.parse_step()?);
            }
        }
        Ok(Expr::new(
            ExprKind::Path { is_absolute: true, root: None, steps },
            self.span_from(start),
        ))
    }

    /// Parses one `AxisStep` once its opening token has already told us the
    /// axis (used for `.`/`..`/`@`/explicit `axis::`); wraps it as a
    /// single-step relative `Path` and consumes any immediately trailing
    /// predicates.
    fn parse_first_step(&mut self, axis: Axis, test: NodeTest, start: SourceSpan) -> ParseResult<Expr> {
        let predicates = self.parse_predicates()?;
        let step_span = self.span_from(start);
        let step = Step { axis, test, predicates, span: step_span };
        Ok(Expr::new(
            ExprKind::Path { is_absolute: false, root: None, steps: vec![step] },
            step_span,
        ))
    }

    /// Parses one `AxisStep` from scratch (used after a `/`/`//` separator,
    /// where the previous token gave no hint about the step to come).
    fn parse_step(&mut self) -> ParseResult<Step> {
        let start = self.tokens.peek_span();
        match self.tokens.peek_token() {
            Some(Token::Dot) => {
                self.tokens.advance()?;
                let predicates = self.parse_predicates()?;
                Ok(Step { axis: Axis::Self_, test: NodeTest::Kind(crate::ast::KindTest::Node), predicates, span: self.span_from(start) })
            }
            Some(Token::DotDot) => {
                self.tokens.advance()?;
                let predicates = self.parse_predicates()?;
                Ok(Step { axis: Axis::Parent, test: NodeTest::Kind(crate::ast::KindTest::Node), predicates, span: self.span_from(start) })
            }
            Some(Token::At) => {
                self.tokens.advance()?;
                let test = self.parse_node_test()?;
                let predicates = self.parse_predicates()?;
                Ok(Step { axis: Axis::Attribute, test, predicates, span: self.span_from(start) })
            }
            Some(Token::NCName(n)) if self.tokens.peek_token_at(1) == Some(&Token::DoubleColon) => {
                let n = *n;
                let axis = registry::lookup_axis(n).ok_or_else(|| Error::XPST0003.with_span(start))?;
                self.tokens.advance()?;
                self.tokens.advance()?;
                let test = self.parse_node_test()?;
                let predicates = self.parse_predicates()?;
                Ok(Step { axis, test, predicates, span: self.span_from(start) })
            }
            _ => {
                let test = self.parse_node_test()?;
                let predicates = self.parse_predicates()?;
                Ok(Step { axis: Axis::Child, test, predicates, span: self.span_from(start) })
            }
        }
    }

    fn parse_predicates(&mut self) -> ParseResult<Vec<Expr>> {
        let mut predicates = Vec::new();
        while self.tokens.peek_token() == Some(&Token::LeftBracket) {
            self.tokens.advance()?;
            predicates.push(self.parse_expr(0)?);
            self.tokens.expect(&Token::RightBracket)?;
        }
        Ok(predicates)
    }

    // ---- led: infix/postfix continuations ----

    fn parse_led(&mut self, left: Expr, bp: u8) -> ParseResult<Expr> {
        let start = left.span;
        let token = self.tokens.advance()?.token;
        match token {
            Token::Comma => {
                let mut items = flatten_sequence(left);
                items.push(self.parse_expr(bp)?);
                Ok(Expr::new(ExprKind::Sequence(items), self.span_from(start)))
            }
            Token::Plus => self.binary_arith(left, ArithOp::Add, bp, start),
            Token::Minus => self.binary_arith(left, ArithOp::Subtract, bp, start),
            Token::Asterisk => self.binary_arith(left, ArithOp::Multiply, bp, start),
            Token::Equal => self.general_compare(left, GeneralCompareOp::Eq, bp, start),
            Token::NotEqual => self.general_compare(left, GeneralCompareOp::Ne, bp, start),
            Token::LessThan => self.general_compare(left, GeneralCompareOp::Lt, bp, start),
            Token::LessThanEqual => self.general_compare(left, GeneralCompareOp::Le, bp, start),
            Token::GreaterThan => self.general_compare(left, GeneralCompareOp::Gt, bp, start),
            Token::GreaterThanEqual => self.general_compare(left, GeneralCompareOp::Ge, bp, start),
            Token::Precedes => self.node_compare(left, NodeCompareOp::Precedes, bp, start),
            Token::Follows => self.node_compare(left, NodeCompareOp::Follows, bp, start),
            Token::Pipe => self.set_op(left, SetOp::Union, bp, start),
            Token::Slash => self.path_step_led(left, false, start),
            Token::DoubleSlash => self.path_step_led(left, true, start),
            Token::LeftBracket => {
                let predicate = self.parse_expr(0)?;
                self.tokens.expect(&Token::RightBracket)?;
                Ok(Expr::new(
                    ExprKind::Filter(Box::new(left), vec![predicate]),
                    self.span_from(start),
                ))
            }
            Token::NCName(name) => self.keyword_led(left, name, bp, start),
            _ => Err(Error::XPST0003.with_span(self.tokens.current_span())),
        }
    }

    fn binary_arith(&mut self, left: Expr, op: ArithOp, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        let right = self.parse_expr(bp)?;
        Ok(Expr::new(ExprKind::Arith(op, Box::new(left), Box::new(right)), self.span_from(start)))
    }

    fn general_compare(&mut self, left: Expr, op: GeneralCompareOp, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        let right = self.parse_expr(bp)?;
        Ok(Expr::new(ExprKind::GeneralCompare(op, Box::new(left), Box::new(right)), self.span_from(start)))
    }

    fn node_compare(&mut self, left: Expr, op: NodeCompareOp, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        let right = self.parse_expr(bp)?;
        Ok(Expr::new(ExprKind::NodeCompare(op, Box::new(left), Box::new(right)), self.span_from(start)))
    }

    fn set_op(&mut self, left: Expr, op: SetOp, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        let right = self.parse_expr(bp)?;
        Ok(Expr::new(ExprKind::SetOp(op, Box::new(left), Box::new(right)), self.span_from(start)))
    }

    fn path_step_led(&mut self, left: Expr, is_double: bool, start: SourceSpan) -> ParseResult<Expr> {
        let step = self.parse_step()?;
        let kind = match left.kind {
            ExprKind::Path { is_absolute, root, mut steps } => {
                if is_double {
                    steps.push(descendant_or_self_step(start));
                }
                steps.push(step);
                ExprKind::Path { is_absolute, root, steps }
            }
            other => {
                let mut steps = Vec::new();
                if is_double {
                    steps.push(descendant_or_self_step(start));
                }
                steps.push(step);
                ExprKind::Path {
                    is_absolute: false,
                    root: Some(Box::new(Expr::new(other, left.span))),
                    steps,
                }
            }
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn keyword_led(&mut self, left: Expr, name: &'a str, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        match name {
            "or" => {
                let right = self.parse_expr(bp)?;
                Ok(Expr::new(ExprKind::Or(Box::new(left), Box::new(right)), self.span_from(start)))
            }
            "and" => {
                let right = self.parse_expr(bp)?;
                Ok(Expr::new(ExprKind::And(Box::new(left), Box::new(right)), self.span_from(start)))
            }
            "to" => {
                let right = self.parse_expr(bp)?;
                Ok(Expr::new(ExprKind::Range(Box::new(left), Box::new(right)), self.span_from(start)))
            }
            "div" => self.binary_arith(left, ArithOp::Divide, bp, start),
            "mod" => self.binary_arith(left, ArithOp::Modulo, bp, start),
            "idiv" => self.binary_arith(left, ArithOp::IntegerDivide, bp, start),
            "union" => self.set_op(left, SetOp::Union, bp, start),
            "intersect" => self.set_op(left, SetOp::Intersect, bp, start),
            "except" => self.set_op(left, SetOp::Except, bp, start),
            "eq" => self.value_compare(left, ValueCompareOp::Eq, bp, start),
            "ne" => self.value_compare(left, ValueCompareOp::Ne, bp, start),
            "lt" => self.value_compare(left, ValueCompareOp::Lt, bp, start),
            "le" => self.value_compare(left, ValueCompareOp::Le, bp, start),
            "gt" => self.value_compare(left, ValueCompareOp::Gt, bp, start),
            "ge" => self.value_compare(left, ValueCompareOp::Ge, bp, start),
            "is" => self.node_compare(left, NodeCompareOp::Is, bp, start),
            "instance" => {
                self.tokens.expect_ncname("of")?;
                let sequence_type = self.parse_sequence_type()?;
                Ok(Expr::new(ExprKind::InstanceOf(Box::new(left), sequence_type), self.span_from(start)))
            }
            "treat" => {
                self.tokens.expect_ncname("as")?;
                let sequence_type = self.parse_sequence_type()?;
                Ok(Expr::new(ExprKind::TreatAs(Box::new(left), sequence_type), self.span_from(start)))
            }
            "cast" => {
                self.tokens.expect_ncname("as")?;
                let single_type = self.parse_single_type()?;
                Ok(Expr::new(ExprKind::CastAs(Box::new(left), single_type), self.span_from(start)))
            }
            "castable" => {
                self.tokens.expect_ncname("as")?;
                let single_type = self.parse_single_type()?;
                Ok(Expr::new(ExprKind::CastableAs(Box::new(left), single_type), self.span_from(start)))
            }
            _ => Err(Error::XPST0003.with_span(start)),
        }
    }

    fn value_compare(&mut self, left: Expr, op: ValueCompareOp, bp: u8, start: SourceSpan) -> ParseResult<Expr> {
        let right = self.parse_expr(bp)?;
        Ok(Expr::new(ExprKind::ValueCompare(op, Box::new(left), Box::new(right)), self.span_from(start)))
    }
}

fn flatten_sequence(expr: Expr) -> Vec<Expr> {
    match expr.kind {
        ExprKind::Sequence(items) => items,
        other => vec![Expr::new(other, expr.span)],
    }
}

fn descendant_or_self_step(span: SourceSpan) -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::Kind(crate::ast::KindTest::Node),
        predicates: Vec::new(),
        span,
    }
}
