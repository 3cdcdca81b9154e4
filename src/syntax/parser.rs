//! Recursive descent parser: OXPL tokens to an [`ast::Node`](crate::ast::Node) tree.
//!
//! The parser is hand-rolled (no external parser combinator dependency) for
//! full control over error messages and the small fixed grammar. Every node
//! is built through [`crate::ast::build`], so builder shape errors surface as
//! [`SyntaxError::InvalidConstruct`] at the offending token.

use crate::ast::build;
use crate::ast::error::AstResult;
use crate::ast::{Affix, Node};

use super::error::{SyntaxError, SyntaxResult};
use super::lexer::{Token, TokenKind};

/// Binary precedence levels, loosest first. Assignment and the ternary
/// operator sit above these and are handled separately.
const BINARY_LEVELS: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["|"],
    &["^"],
    &["&"],
    &["==", "!="],
    &["<", ">", "<=", ">="],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Maximum nesting of statements and expressions.
pub const MAX_NESTING: usize = 64;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// `tokens` must end with [`TokenKind::Eof`], as produced by
    /// [`tokenize`](super::lexer::tokenize).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ── Token cursor ────────────────────────────────────────────────────

    fn current(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn check_op(&self, op: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Op(o) if *o == op)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current();
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.to_string(),
            line: token.line,
            column: token.column,
            span: token.span.into(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> SyntaxResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self) -> SyntaxResult<(String, Token)> {
        match self.peek_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                Ok((name, self.advance()))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Attach the position of `at` to a builder failure.
    fn built<T>(at: &Token, result: AstResult<T>) -> SyntaxResult<T> {
        result.map_err(|source| SyntaxError::InvalidConstruct {
            source,
            line: at.line,
            column: at.column,
            span: at.span.into(),
        })
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> SyntaxResult<T>) -> SyntaxResult<T> {
        if self.depth >= MAX_NESTING {
            let token = self.current();
            return Err(SyntaxError::NestingTooDeep {
                limit: MAX_NESTING,
                line: token.line,
                column: token.column,
                span: token.span.into(),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Items ───────────────────────────────────────────────────────────

    /// Parse a whole program. Returns `None` when the source holds no items.
    pub fn parse_program(&mut self) -> SyntaxResult<Option<Node>> {
        let mut unit = build::new_translation_unit(Vec::new());
        while !self.check(&TokenKind::Eof) {
            let at = self.current().clone();
            let item = self.item()?;
            Self::built(&at, build::add_seq(&mut unit, item))?;
        }
        match unit.items() {
            Some([]) => Ok(None),
            _ => Ok(Some(unit)),
        }
    }

    fn item(&mut self) -> SyntaxResult<Node> {
        match self.peek_kind() {
            TokenKind::Fn => self.function(),
            TokenKind::Class => self.class(),
            TokenKind::Var => self.var_decl(),
            TokenKind::Ident(_) => self.fact(),
            _ => Err(self.unexpected("`fn`, `class`, `var` or a fact")),
        }
    }

    fn function(&mut self) -> SyntaxResult<Node> {
        let at = self.expect(&TokenKind::Fn, "`fn`")?;
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::LParen, "`(`")?;
        self.expect(&TokenKind::RParen, "`)`")?;
        let signature = build::new_signature(build::new_str(name));
        let body = self.body()?;
        Self::built(&at, build::new_function(signature, body))
    }

    fn class(&mut self) -> SyntaxResult<Node> {
        let at = self.expect(&TokenKind::Class, "`class`")?;
        let (name, _) = self.expect_ident()?;
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut spec = build::new_class_spec(Vec::new());
        while !self.eat(&TokenKind::RBrace) {
            let member_at = self.current().clone();
            let member = match self.peek_kind() {
                TokenKind::Fn => self.function()?,
                TokenKind::Var => self.var_decl()?,
                TokenKind::Ident(_) => self.fact()?,
                _ => return Err(self.unexpected("class member or `}`")),
            };
            Self::built(&member_at, build::add_seq(&mut spec, member))?;
        }
        Self::built(&at, build::new_class(build::new_str(name), spec))
    }

    fn var_decl(&mut self) -> SyntaxResult<Node> {
        let at = self.expect(&TokenKind::Var, "`var`")?;
        let (name, _) = self.expect_ident()?;
        let ty = if self.eat(&TokenKind::Colon) {
            Some(self.scope()?)
        } else {
            None
        };
        let value = if self.check_op("=") {
            self.advance();
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semi, "`;`")?;
        let signature = Self::built(&at, build::new_var_signature(build::new_str(name), ty))?;
        Self::built(&at, build::new_var_decl(signature, value))
    }

    /// `rel(a, b);` or `subject relation object?;`
    fn fact(&mut self) -> SyntaxResult<Node> {
        let at = self.current().clone();
        let head = self.scope()?;

        if self.eat(&TokenKind::LParen) {
            let mut args = Vec::new();
            if !self.check(&TokenKind::RParen) {
                loop {
                    args.push(self.address()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RParen, "`)` or `,`")?;
            self.expect(&TokenKind::Semi, "`;`")?;
            return Self::built(&at, build::new_fact(head, args));
        }

        let subject = self.address_from(&at, head)?;
        let relation = match self.peek_kind() {
            TokenKind::Ident(_) => Some(self.scope()?),
            _ => None,
        };
        let object = match self.peek_kind() {
            TokenKind::Ident(_) => Some(self.address()?),
            _ => None,
        };
        if relation.is_none() && !self.check(&TokenKind::Semi) {
            return Err(self.unexpected("relation"));
        }
        self.expect(&TokenKind::Semi, "object or `;`")?;
        Self::built(&at, build::new_triple_fact(subject, relation, object))
    }

    // ── Names ───────────────────────────────────────────────────────────

    fn scope(&mut self) -> SyntaxResult<Node> {
        let (first, at) = self.expect_ident()?;
        let mut scope = Self::built(&at, build::new_scope(build::new_str(first)))?;
        while self.eat(&TokenKind::PathSep) {
            let (segment, at) = self.expect_ident()?;
            Self::built(&at, build::scope_add(&mut scope, build::new_str(segment)))?;
        }
        Ok(scope)
    }

    fn address(&mut self) -> SyntaxResult<Node> {
        let at = self.current().clone();
        let scope = self.scope()?;
        self.address_from(&at, scope)
    }

    fn address_from(&mut self, at: &Token, scope: Node) -> SyntaxResult<Node> {
        let param = if self.eat(&TokenKind::Dot) {
            let (param, _) = self.expect_ident()?;
            Some(build::new_str(param))
        } else {
            None
        };
        Self::built(at, build::new_address(scope, param))
    }

    // ── Statements ──────────────────────────────────────────────────────

    /// `{ ... }` converted to a sequence, or `None` when empty.
    fn body(&mut self) -> SyntaxResult<Option<Node>> {
        let at = self.current().clone();
        let mut block = self.block()?;
        if block.items().is_some_and(<[Node]>::is_empty) {
            return Ok(None);
        }
        Self::built(&at, build::convert_compound_to_sequence(&mut block))?;
        Ok(Some(block))
    }

    fn block(&mut self) -> SyntaxResult<Node> {
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut block = build::new_compound(Vec::new());
        while !self.eat(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            let at = self.current().clone();
            let statement = self.statement()?;
            Self::built(&at, build::add_seq(&mut block, statement))?;
        }
        Ok(block)
    }

    fn statement(&mut self) -> SyntaxResult<Node> {
        self.nested(Self::statement_kind)
    }

    fn statement_kind(&mut self) -> SyntaxResult<Node> {
        let at = self.current().clone();
        match self.peek_kind() {
            TokenKind::Var => self.var_decl(),
            TokenKind::LBrace => self.block(),
            TokenKind::If => {
                self.advance();
                let condition = self.paren_expr()?;
                let then_branch = self.statement()?;
                let else_branch = if self.eat(&TokenKind::Else) {
                    Some(self.statement()?)
                } else {
                    None
                };
                Ok(build::new_conditional(condition, then_branch, else_branch))
            }
            TokenKind::While => {
                self.advance();
                let condition = self.paren_expr()?;
                let body = self.body()?;
                Self::built(&at, build::new_while(condition, body))
            }
            TokenKind::For => {
                self.advance();
                self.expect(&TokenKind::LParen, "`(`")?;
                let (binding, _) = self.expect_ident()?;
                self.expect(&TokenKind::In, "`in`")?;
                let iterable = self.expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                let body = self.body()?;
                Self::built(&at, build::new_for(build::new_str(binding), iterable, body))
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(build::new_return(value))
            }
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(build::new_break())
            }
            TokenKind::Continue => {
                self.advance();
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(build::new_continue())
            }
            _ => {
                let expr = self.expr()?;
                self.expect(&TokenKind::Semi, "`;`")?;
                Ok(expr)
            }
        }
    }

    fn paren_expr(&mut self) -> SyntaxResult<Node> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let expr = self.expr()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(expr)
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn expr(&mut self) -> SyntaxResult<Node> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> SyntaxResult<Node> {
        let target = self.ternary()?;
        if self.check_op("=") {
            let at = self.advance();
            let value = self.nested(Self::assignment)?;
            return Self::built(&at, build::new_binop('=', target, value));
        }
        Ok(target)
    }

    fn ternary(&mut self) -> SyntaxResult<Node> {
        let condition = self.binary(0)?;
        if self.eat(&TokenKind::Question) {
            let then_value = self.expr()?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let else_value = self.nested(Self::ternary)?;
            return Ok(build::new_ternary(condition, then_value, else_value));
        }
        Ok(condition)
    }

    fn binary(&mut self, level: usize) -> SyntaxResult<Node> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.unary();
        };
        let mut lhs = self.binary(level + 1)?;
        while let TokenKind::Op(op) = *self.peek_kind() {
            if !ops.contains(&op) {
                break;
            }
            let at = self.advance();
            let rhs = self.binary(level + 1)?;
            lhs = Self::built(&at, build::new_binop_str(op, lhs, rhs))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> SyntaxResult<Node> {
        if let TokenKind::Op(op @ ("-" | "+" | "++" | "--")) = *self.peek_kind() {
            let at = self.advance();
            let operand = self.nested(Self::unary)?;
            return Self::built(&at, build::new_unop(Affix::Prefix, op, operand));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> SyntaxResult<Node> {
        let mut expr = self.primary()?;
        loop {
            match *self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.expr()?);
                            if !self.eat(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenKind::RParen, "`)` or `,`")?;
                    expr = build::new_call(expr, args);
                }
                TokenKind::Op(op @ ("++" | "--")) => {
                    let at = self.advance();
                    expr = Self::built(&at, build::new_unop(Affix::Postfix, op, expr))?;
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> SyntaxResult<Node> {
        match self.peek_kind() {
            TokenKind::Int(v) => {
                let v = *v;
                self.advance();
                Ok(build::new_int(v))
            }
            TokenKind::Float(v) => {
                let v = *v;
                self.advance();
                Ok(build::new_float(v))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Ok(build::new_str(s))
            }
            TokenKind::Ident(_) => {
                let at = self.current().clone();
                let scope = self.scope()?;
                // A call's callee stays a bare scope; anything else is an address.
                if self.check(&TokenKind::LParen) {
                    Ok(scope)
                } else {
                    self.address_from(&at, scope)
                }
            }
            TokenKind::LParen => self.paren_expr(),
            _ => Err(self.unexpected("expression")),
        }
    }
}
