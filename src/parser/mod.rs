//! Token deque to expression tree (C6): a recursive-descent parser
//! implementing the precedence ladder described in the grammar summary,
//! synthesizing each node through [`crate::synth`] as it goes rather than
//! building a raw tree and optimizing it in a second pass.
//!
//! Pipeline: lex -> token pipeline -> parse. Diagnostics from every stage
//! accumulate into one [`CompileReport`] instead of aborting at the first
//! problem, so a single `parse` call surfaces everything wrong with the
//! source at once.

mod builtins;

use crate::error::{CompileError, CompileReport, ErrorKind, Span};
use crate::expr::{Bound, ExprNode, RangePack, TrinaryOp, VarargOp};
use crate::lexer::{Token, TokenKind};
use crate::resolver::{SymbolKind, UnknownSymbolResolver};
use crate::symtab::SymbolTable;
use crate::synth::special_fns::{SpecialFn3, SpecialFn4};
use crate::synth::{CompileOptions, RawBinOp};
use calcexpr_numeric::Numeric;
use std::collections::BTreeSet;

/// The result of a single `parse` call: the compiled tree, every
/// diagnostic raised along the way, and (when
/// [`CompileOptions::cache_symbols`] was enabled) the sorted set of symbol
/// names the source referenced.
pub struct ParseOutcome<N: Numeric> {
    /// The compiled expression tree. `ExprNode::Null` wherever a
    /// structural error made the corresponding subtree uncompilable.
    pub root: ExprNode<N>,
    /// Every diagnostic raised while lexing, running the token pipeline,
    /// or parsing.
    pub report: CompileReport,
    /// Sorted, deduplicated symbol names referenced during the parse, or
    /// `None` if symbol caching was not requested.
    pub symbols: Option<Vec<String>>,
}

/// Lex, run the token pipeline, and parse `source` against `table`.
///
/// Never panics: a structural problem anywhere in the source degrades the
/// affected subtree to `ExprNode::Null` and records a diagnostic in the
/// returned report rather than aborting the call.
#[must_use]
pub fn parse<N: Numeric>(
    source: &str,
    table: &SymbolTable<N>,
    opts: CompileOptions,
    resolver: Option<&dyn UnknownSymbolResolver<N>>,
) -> ParseOutcome<N> {
    let mut report = CompileReport::new();
    let tokens = crate::lexer::lex(source);
    let tokens = crate::pipeline::run(tokens, &mut report);

    let symbols = opts.cache_symbols_enabled().then(BTreeSet::new);
    let mut parser = Parser { tokens, pos: 0, table: table.clone(), opts, resolver, report, symbols };
    let root = parser.parse_program();
    ParseOutcome { root, report: parser.report, symbols: parser.symbols.map(|s| s.into_iter().collect()) }
}

struct Parser<'r, N: Numeric> {
    tokens: Vec<Token>,
    pos: usize,
    table: SymbolTable<N>,
    opts: CompileOptions,
    resolver: Option<&'r dyn UnknownSymbolResolver<N>>,
    report: CompileReport,
    symbols: Option<BTreeSet<String>>,
}

fn multi_node<N: Numeric>(mut items: Vec<ExprNode<N>>) -> ExprNode<N> {
    match items.len() {
        0 => ExprNode::Null,
        1 => items.pop().unwrap_or(ExprNode::Null),
        _ => crate::synth::build_vararg(VarargOp::Multi, items),
    }
}

fn to_array3<N: Numeric>(mut args: Vec<ExprNode<N>>) -> [ExprNode<N>; 3] {
    let c = args.pop().unwrap_or(ExprNode::Null);
    let b = args.pop().unwrap_or(ExprNode::Null);
    let a = args.pop().unwrap_or(ExprNode::Null);
    [a, b, c]
}

fn to_array4<N: Numeric>(mut args: Vec<ExprNode<N>>) -> [ExprNode<N>; 4] {
    let d = args.pop().unwrap_or(ExprNode::Null);
    let c = args.pop().unwrap_or(ExprNode::Null);
    let b = args.pop().unwrap_or(ExprNode::Null);
    let a = args.pop().unwrap_or(ExprNode::Null);
    [a, b, c, d]
}

impl<'r, N: Numeric> Parser<'r, N> {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().kind()
    }

    fn check_kind(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat_kind(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn describe_current(&self) -> String {
        if self.check_kind(TokenKind::Eof) { "end of input".to_owned() } else { format!("'{}'", self.current().lexeme()) }
    }

    fn expect_kind(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.check_kind(kind) {
            self.advance();
            true
        } else {
            let span = self.current().span();
            let found = self.describe_current();
            self.push_error(ErrorKind::Syntax, span, format!("expected {what}, found {found}"));
            false
        }
    }

    fn peek_symbol_matches(&self, word: &str) -> bool {
        let token = self.current();
        token.kind() == TokenKind::Symbol && token.lexeme().eq_ignore_ascii_case(word)
    }

    fn eat_symbol(&mut self, word: &str) -> bool {
        if self.peek_symbol_matches(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn push_error(&mut self, kind: ErrorKind, span: Span, message: impl Into<String>) {
        self.report.push(CompileError::new(kind, span, message));
    }

    fn build_logical_binary(&mut self, raw: RawBinOp, lhs: ExprNode<N>, rhs: ExprNode<N>, span: Span) -> ExprNode<N> {
        match crate::synth::build_binary(raw, lhs, rhs, &self.opts) {
            Ok(node) => node,
            Err(err) => {
                self.push_error(ErrorKind::Helper, span, err.to_string());
                ExprNode::Null
            }
        }
    }

    /// Top-level entry: one or more `;`-separated statements.
    fn parse_program(&mut self) -> ExprNode<N> {
        if self.check_kind(TokenKind::Eof) {
            return ExprNode::Constant(N::zero());
        }
        let mut stmts = vec![self.parse_assign()];
        while self.eat_kind(TokenKind::Semicolon) {
            if self.check_kind(TokenKind::Eof) {
                break;
            }
            stmts.push(self.parse_assign());
        }
        if !self.check_kind(TokenKind::Eof) {
            let span = self.current().span();
            let found = self.describe_current();
            self.push_error(ErrorKind::Syntax, span, format!("unexpected trailing input at {found}"));
        }
        multi_node(stmts)
    }

    // L00: `:=`, right-associative.
    fn parse_assign(&mut self) -> ExprNode<N> {
        let lhs = self.parse_and();
        if self.check_kind(TokenKind::Assign) {
            let span = self.current().span();
            self.advance();
            let rhs = self.parse_assign();
            return match crate::synth::build_assignment(lhs, rhs) {
                Ok(node) => node,
                Err(err) => {
                    self.push_error(ErrorKind::SymbolTable, span, err.to_string());
                    ExprNode::Null
                }
            };
        }
        lhs
    }

    // `and`/`nand`/`&`, looser than `or` per the grammar summary.
    fn parse_and(&mut self) -> ExprNode<N> {
        let mut lhs = self.parse_or();
        loop {
            let span = self.current().span();
            if self.eat_symbol("and") {
                let rhs = self.parse_or();
                lhs = self.build_logical_binary(RawBinOp::And, lhs, rhs, span);
            } else if self.eat_symbol("nand") {
                let rhs = self.parse_or();
                lhs = self.build_logical_binary(RawBinOp::Nand, lhs, rhs, span);
            } else if self.eat_symbol("&") {
                let rhs = self.parse_or();
                lhs = crate::synth::build_short_and(lhs, rhs);
            } else {
                break;
            }
        }
        lhs
    }

    fn parse_or(&mut self) -> ExprNode<N> {
        let mut lhs = self.parse_comparison();
        loop {
            let span = self.current().span();
            if self.eat_symbol("or") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::Or, lhs, rhs, span);
            } else if self.eat_symbol("nor") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::Nor, lhs, rhs, span);
            } else if self.eat_symbol("xor") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::Xor, lhs, rhs, span);
            } else if self.eat_symbol("xnor") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::Xnor, lhs, rhs, span);
            } else if self.eat_symbol("in") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::In, lhs, rhs, span);
            } else if self.eat_symbol("like") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::Like, lhs, rhs, span);
            } else if self.eat_symbol("ilike") {
                let rhs = self.parse_comparison();
                lhs = self.build_logical_binary(RawBinOp::ILike, lhs, rhs, span);
            } else if self.eat_symbol("|") {
                let rhs = self.parse_comparison();
                lhs = crate::synth::build_short_or(lhs, rhs);
            } else {
                break;
            }
        }
        lhs
    }

    fn parse_comparison(&mut self) -> ExprNode<N> {
        let mut lhs = self.parse_additive();
        loop {
            let raw = match self.peek_kind() {
                TokenKind::Lt => RawBinOp::Lt,
                TokenKind::Lte => RawBinOp::Lte,
                TokenKind::Gt => RawBinOp::Gt,
                TokenKind::Gte => RawBinOp::Gte,
                TokenKind::Eq => RawBinOp::Eq,
                TokenKind::Ne => RawBinOp::Ne,
                _ => break,
            };
            let span = self.current().span();
            self.advance();
            let rhs = self.parse_additive();
            lhs = self.build_logical_binary(raw, lhs, rhs, span);
        }
        lhs
    }

    fn parse_additive(&mut self) -> ExprNode<N> {
        let mut lhs = self.parse_multiplicative();
        loop {
            let raw = match self.peek_kind() {
                TokenKind::Add => RawBinOp::Add,
                TokenKind::Sub => RawBinOp::Sub,
                TokenKind::Shl => RawBinOp::Shl,
                TokenKind::Shr => RawBinOp::Shr,
                _ => break,
            };
            let span = self.current().span();
            self.advance();
            let rhs = self.parse_multiplicative();
            lhs = self.build_logical_binary(raw, lhs, rhs, span);
        }
        lhs
    }

    fn parse_multiplicative(&mut self) -> ExprNode<N> {
        let mut lhs = self.parse_unary();
        loop {
            let raw = match self.peek_kind() {
                TokenKind::Mul => RawBinOp::Mul,
                TokenKind::Div => RawBinOp::Div,
                TokenKind::Mod => RawBinOp::Mod,
                _ => break,
            };
            let span = self.current().span();
            self.advance();
            let rhs = self.parse_unary();
            lhs = self.build_logical_binary(raw, lhs, rhs, span);
        }
        lhs
    }

    // Prefix `+`/`-`/`not`, then `^` (right-associative, binds tighter
    // than unary so `-x^2` parses as `-(x^2)`).
    fn parse_unary(&mut self) -> ExprNode<N> {
        if self.eat_kind(TokenKind::Add) {
            let operand = self.parse_unary();
            return crate::synth::build_unary(crate::expr::UnaryOp::Pos, operand);
        }
        if self.eat_kind(TokenKind::Sub) {
            let operand = self.parse_unary();
            return crate::synth::build_unary(crate::expr::UnaryOp::Neg, operand);
        }
        if self.eat_symbol("not") {
            let operand = self.parse_unary();
            return crate::synth::build_unary(crate::expr::UnaryOp::NotL, operand);
        }
        self.parse_pow()
    }

    fn parse_pow(&mut self) -> ExprNode<N> {
        let base = self.parse_primary();
        if self.check_kind(TokenKind::Pow) {
            let span = self.current().span();
            self.advance();
            let exponent = self.parse_unary();
            return self.build_logical_binary(RawBinOp::Pow, base, exponent, span);
        }
        base
    }

    fn parse_primary(&mut self) -> ExprNode<N> {
        match self.peek_kind() {
            TokenKind::Number => self.parse_number_literal(),
            TokenKind::ErrNumber => {
                self.advance();
                ExprNode::Null
            }
            TokenKind::String => self.parse_string_literal(),
            TokenKind::ErrString => {
                let token = self.advance();
                self.push_error(ErrorKind::Lexer, token.span(), "unterminated string literal");
                ExprNode::Null
            }
            TokenKind::LBracket => self.parse_paren_group(),
            TokenKind::LSqr => self.parse_bracket_group(),
            TokenKind::LCrl => self.parse_brace_multi(),
            TokenKind::Symbol => self.parse_symbol_primary(),
            TokenKind::ErrSfunc => {
                let token = self.advance();
                self.push_error(
                    ErrorKind::Lexer,
                    token.span(),
                    format!("malformed special-function name '{}'", token.lexeme()),
                );
                ExprNode::Null
            }
            TokenKind::Error => {
                let token = self.advance();
                self.push_error(ErrorKind::Lexer, token.span(), format!("unrecognized input '{}'", token.lexeme()));
                ExprNode::Null
            }
            _ => {
                let span = self.current().span();
                let found = self.describe_current();
                self.push_error(ErrorKind::Syntax, span, format!("unexpected {found}"));
                if !self.check_kind(TokenKind::Eof) {
                    self.advance();
                }
                ExprNode::Null
            }
        }
    }

    fn parse_paren_group(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LBracket, "'('");
        let inner = self.parse_assign();
        self.expect_kind(TokenKind::RBracket, "')'");
        inner
    }

    fn parse_bracket_group(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LSqr, "'['");
        let inner = self.parse_assign();
        self.expect_kind(TokenKind::RSqr, "']'");
        inner
    }

    fn parse_brace_multi(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LCrl, "'{'");
        let mut items = Vec::new();
        if !self.check_kind(TokenKind::RCrl) {
            items.push(self.parse_assign());
            while self.eat_kind(TokenKind::Semicolon) {
                if self.check_kind(TokenKind::RCrl) {
                    break;
                }
                items.push(self.parse_assign());
            }
        }
        self.expect_kind(TokenKind::RCrl, "'}'");
        multi_node(items)
    }

    fn parse_comma_list_in_parens(&mut self) -> Vec<ExprNode<N>> {
        self.expect_kind(TokenKind::LBracket, "'('");
        let mut items = Vec::new();
        if !self.check_kind(TokenKind::RBracket) {
            items.push(self.parse_assign());
            while self.eat_kind(TokenKind::Comma) {
                items.push(self.parse_assign());
            }
        }
        self.expect_kind(TokenKind::RBracket, "')'");
        items
    }

    fn parse_args(&mut self) -> Vec<ExprNode<N>> {
        self.parse_comma_list_in_parens()
    }

    fn parse_if(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LBracket, "'(' after 'if'");
        let cond = self.parse_assign();
        self.expect_kind(TokenKind::Comma, "',' after 'if' condition");
        let then_branch = self.parse_assign();
        self.expect_kind(TokenKind::Comma, "',' after 'if' then-branch");
        let else_branch = self.parse_assign();
        self.expect_kind(TokenKind::RBracket, "')' closing 'if'");
        crate::synth::build_conditional(cond, then_branch, else_branch)
    }

    fn parse_loop_body(&mut self) -> ExprNode<N> {
        match self.peek_kind() {
            TokenKind::LCrl => self.parse_brace_multi(),
            TokenKind::LBracket => multi_node(self.parse_comma_list_in_parens()),
            _ => {
                let span = self.current().span();
                self.push_error(ErrorKind::Syntax, span, "expected '{' or '(' starting a loop body");
                ExprNode::Null
            }
        }
    }

    fn parse_while(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LBracket, "'(' after 'while'");
        let cond = self.parse_assign();
        self.expect_kind(TokenKind::RBracket, "')' closing 'while' condition");
        let body = self.parse_loop_body();
        crate::synth::build_while(cond, body)
    }

    fn parse_repeat(&mut self) -> ExprNode<N> {
        let mut items = vec![self.parse_assign()];
        while self.eat_kind(TokenKind::Semicolon) {
            if self.peek_symbol_matches("until") {
                break;
            }
            items.push(self.parse_assign());
        }
        if !self.eat_symbol("until") {
            let span = self.current().span();
            self.push_error(ErrorKind::Syntax, span, "expected 'until' closing 'repeat' body");
        }
        self.expect_kind(TokenKind::LBracket, "'(' after 'until'");
        let cond = self.parse_assign();
        self.expect_kind(TokenKind::RBracket, "')' closing 'until'");
        crate::synth::build_repeat_until(multi_node(items), cond)
    }

    fn parse_switch(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LCrl, "'{' after 'switch'");
        let mut arms = Vec::new();
        let mut default = None;
        loop {
            if self.eat_symbol("case") {
                let cond = self.parse_assign();
                self.expect_kind(TokenKind::Colon, "':' after 'case' condition");
                let cons = self.parse_assign();
                self.expect_kind(TokenKind::Semicolon, "';' terminating a 'case' arm");
                arms.push((cond, cons));
            } else if self.eat_symbol("default") {
                self.expect_kind(TokenKind::Colon, "':' after 'default'");
                let value = self.parse_assign();
                self.expect_kind(TokenKind::Semicolon, "';' terminating the 'default' arm");
                default = Some(value);
                break;
            } else {
                let span = self.current().span();
                self.push_error(ErrorKind::Syntax, span, "expected 'case' or 'default' in 'switch' body");
                break;
            }
        }
        self.expect_kind(TokenKind::RCrl, "'}' closing 'switch'");
        match default {
            Some(default) => crate::synth::build_switch(arms, default),
            None => {
                let span = self.current().span();
                self.push_error(ErrorKind::Syntax, span, "'switch' requires a 'default' arm");
                ExprNode::Null
            }
        }
    }

    fn parse_multi_switch(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LCrl, "'{' after '[*]'");
        let mut arms = Vec::new();
        while self.eat_symbol("case") {
            let cond = self.parse_assign();
            self.expect_kind(TokenKind::Colon, "':' after 'case' condition");
            let cons = self.parse_assign();
            self.expect_kind(TokenKind::Semicolon, "';' terminating a 'case' arm");
            arms.push((cond, cons));
        }
        self.expect_kind(TokenKind::RCrl, "'}' closing '[*]'");
        crate::synth::build_multi_switch(arms)
    }

    fn parse_tilde(&mut self) -> ExprNode<N> {
        match self.peek_kind() {
            TokenKind::LCrl => self.parse_brace_multi(),
            TokenKind::LBracket => multi_node(self.parse_comma_list_in_parens()),
            _ => {
                let span = self.current().span();
                self.push_error(ErrorKind::Syntax, span, "expected '{' or '(' after '~'");
                ExprNode::Null
            }
        }
    }

    fn parse_number_literal(&mut self) -> ExprNode<N> {
        let token = self.advance();
        match token.lexeme().parse::<f64>() {
            Ok(v) => ExprNode::Constant(N::from_f64(v)),
            Err(_) => {
                self.push_error(
                    ErrorKind::Numeric,
                    token.span(),
                    format!("malformed numeric literal '{}'", token.lexeme()),
                );
                ExprNode::Null
            }
        }
    }

    fn parse_string_literal(&mut self) -> ExprNode<N> {
        let token = self.advance();
        let text = token.lexeme().to_owned();
        if self.check_kind(TokenKind::LSqr) {
            let range = self.parse_range_pack(token.span());
            return crate::synth::build_const_string_range(text, range);
        }
        ExprNode::StringConst(text)
    }

    fn parse_range_pack(&mut self, anchor: Span) -> RangePack<N> {
        self.expect_kind(TokenKind::LSqr, "'['");
        let lo = if self.check_kind(TokenKind::Colon) { Bound::Absent } else { self.parse_bound_side() };
        self.expect_kind(TokenKind::Colon, "':' in a range");
        let hi = if self.check_kind(TokenKind::RSqr) { Bound::Absent } else { self.parse_bound_side() };
        self.expect_kind(TokenKind::RSqr, "']' closing a range");
        if let (Bound::Literal(lo_v), Bound::Literal(hi_v)) = (&lo, &hi) {
            if lo_v > hi_v {
                self.push_error(ErrorKind::Syntax, anchor, "range lower bound must not exceed the upper bound");
            }
        }
        RangePack::new(lo, hi)
    }

    fn parse_bound_side(&mut self) -> Bound<N> {
        let span = self.current().span();
        let expr = self.parse_assign();
        if let Some(c) = expr.as_constant() {
            let f = c.to_f64();
            if f.is_finite() && f >= 0.0 {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "already checked non-negative and finite"
                )]
                return Bound::Literal(f as usize);
            }
            self.push_error(ErrorKind::Syntax, span, "a range bound must be a non-negative constant");
            return Bound::Literal(0);
        }
        Bound::Expr(Box::new(expr))
    }

    fn parse_index_expr(&mut self) -> ExprNode<N> {
        self.expect_kind(TokenKind::LSqr, "'['");
        let idx = self.parse_assign();
        self.expect_kind(TokenKind::RSqr, "']' closing an index");
        idx
    }

    fn parse_special_function(&mut self, lexeme: &str, span: Span) -> ExprNode<N> {
        let Some(Ok(index)) = lexeme.get(2..).map(str::parse::<u32>) else {
            self.push_error(ErrorKind::Lexer, span, format!("malformed special-function name '{lexeme}'"));
            return ExprNode::Null;
        };
        let args = self.parse_args();
        match args.len() {
            3 => {
                if args.iter().any(|a| matches!(a, ExprNode::Null)) {
                    return ExprNode::Null;
                }
                match SpecialFn3::by_index(index) {
                    Some(kind) => ExprNode::Shape(crate::expr::shape::ShapeNode::SpecialFn3(kind, Box::new(to_array3(args)))),
                    None => {
                        self.push_error(
                            ErrorKind::Syntax,
                            span,
                            format!("no 3-argument special function registered at index {index}"),
                        );
                        ExprNode::Null
                    }
                }
            }
            4 => {
                if args.iter().any(|a| matches!(a, ExprNode::Null)) {
                    return ExprNode::Null;
                }
                match SpecialFn4::by_index(index) {
                    Some(kind) => ExprNode::Shape(crate::expr::shape::ShapeNode::SpecialFn4(kind, Box::new(to_array4(args)))),
                    None => {
                        self.push_error(
                            ErrorKind::Syntax,
                            span,
                            format!("no 4-argument special function registered at index {index}"),
                        );
                        ExprNode::Null
                    }
                }
            }
            n => {
                self.push_error(ErrorKind::Syntax, span, format!("'{lexeme}' requires 3 or 4 arguments, got {n}"));
                ExprNode::Null
            }
        }
    }

    fn build_named_aggregate(&mut self, name: &str, args: Vec<ExprNode<N>>, span: Span) -> ExprNode<N> {
        let mapping = match name {
            "min" => Some((TrinaryOp::Min, crate::expr::AggOp::Min, VarargOp::Min)),
            "max" => Some((TrinaryOp::Max, crate::expr::AggOp::Max, VarargOp::Max)),
            "avg" => Some((TrinaryOp::Avg, crate::expr::AggOp::Avg, VarargOp::Avg)),
            "sum" => Some((TrinaryOp::Sum, crate::expr::AggOp::Sum, VarargOp::Sum)),
            "mul" => Some((TrinaryOp::Mul, crate::expr::AggOp::Mul, VarargOp::Mul)),
            _ => None,
        };
        let Some((trinary_op, agg_op, vararg_op)) = mapping else {
            self.push_error(ErrorKind::Syntax, span, format!("unknown aggregate '{name}'"));
            return ExprNode::Null;
        };
        if args.is_empty() {
            self.push_error(ErrorKind::Syntax, span, format!("'{name}' requires at least 1 argument"));
            return ExprNode::Null;
        }
        match args.len() {
            3 => {
                let [a, b, c] = to_array3(args);
                crate::synth::build_trinary(trinary_op, a, b, c)
            }
            4..=6 => crate::synth::build_aggregate(agg_op, args),
            _ => crate::synth::build_vararg(vararg_op, args),
        }
    }

    fn parse_symbol_primary(&mut self) -> ExprNode<N> {
        let token = self.current().clone();
        let span = token.span();
        let lexeme = token.lexeme().to_owned();

        if lexeme.starts_with('$') {
            self.advance();
            return self.parse_special_function(&lexeme, span);
        }

        let lower = lexeme.to_ascii_lowercase();
        match lower.as_str() {
            "if" => {
                self.advance();
                return self.parse_if();
            }
            "while" => {
                self.advance();
                return self.parse_while();
            }
            "repeat" => {
                self.advance();
                return self.parse_repeat();
            }
            "switch" => {
                self.advance();
                return self.parse_switch();
            }
            "null" => {
                self.advance();
                return ExprNode::Null;
            }
            "[*]" => {
                self.advance();
                return self.parse_multi_switch();
            }
            "~" => {
                self.advance();
                return self.parse_tilde();
            }
            _ => {}
        }

        if let Some(op) = builtins::unary(&lower) {
            self.advance();
            let mut args = self.parse_args();
            if args.len() != 1 {
                self.push_error(
                    ErrorKind::Syntax,
                    span,
                    format!("'{lexeme}' takes exactly 1 argument, got {}", args.len()),
                );
                return ExprNode::Null;
            }
            let arg = args.pop().unwrap_or(ExprNode::Null);
            return crate::synth::build_unary(op, arg);
        }

        if let Some(raw) = builtins::binary(&lower) {
            self.advance();
            let mut args = self.parse_args();
            if args.len() != 2 {
                self.push_error(
                    ErrorKind::Syntax,
                    span,
                    format!("'{lexeme}' takes exactly 2 arguments, got {}", args.len()),
                );
                return ExprNode::Null;
            }
            let b = args.pop().unwrap_or(ExprNode::Null);
            let a = args.pop().unwrap_or(ExprNode::Null);
            return self.build_logical_binary(raw, a, b, span);
        }

        if let Some(op) = builtins::trinary(&lower) {
            self.advance();
            let args = self.parse_args();
            if args.len() != 3 {
                self.push_error(
                    ErrorKind::Syntax,
                    span,
                    format!("'{lexeme}' takes exactly 3 arguments, got {}", args.len()),
                );
                return ExprNode::Null;
            }
            let [a, b, c] = to_array3(args);
            return crate::synth::build_trinary(op, a, b, c);
        }

        if matches!(lower.as_str(), "min" | "max" | "avg" | "sum" | "mul") {
            self.advance();
            let args = self.parse_args();
            return self.build_named_aggregate(&lower, args, span);
        }

        if matches!(lower.as_str(), "mand" | "mor" | "multi") {
            self.advance();
            let args = self.parse_args();
            let op = if lower == "mand" {
                VarargOp::Mand
            } else if lower == "mor" {
                VarargOp::Mor
            } else {
                VarargOp::Multi
            };
            return crate::synth::build_vararg(op, args);
        }

        self.advance();
        self.resolve_symbol(&lexeme, span)
    }

    fn resolve_symbol(&mut self, name: &str, span: Span) -> ExprNode<N> {
        if let Some(symbols) = &mut self.symbols {
            symbols.insert(name.to_ascii_lowercase());
        }

        if let Some(cell) = self.table.get_variable(name) {
            let is_const = self.table.is_constant(name);
            return ExprNode::Variable { cell, is_const };
        }
        if let Some(cell) = self.table.get_stringvar(name) {
            if self.check_kind(TokenKind::LSqr) {
                let range = self.parse_range_pack(span);
                return crate::synth::build_string_range(cell, range);
            }
            return ExprNode::StringVar(cell);
        }
        if let Some((arity, func)) = self.table.get_function(name) {
            let args = self.parse_args();
            if args.len() != arity {
                self.push_error(
                    ErrorKind::SymbolTable,
                    span,
                    format!("'{name}' expects {arity} argument(s), got {}", args.len()),
                );
                return ExprNode::Null;
            }
            return crate::synth::build_call(func, args);
        }
        if let Some(func) = self.table.get_vararg_function(name) {
            let args = self.parse_args();
            return crate::synth::build_vararg_call(func, args);
        }
        if let Some(cell) = self.table.get_vector(name) {
            if !self.check_kind(TokenKind::LSqr) {
                self.push_error(
                    ErrorKind::Syntax,
                    span,
                    format!("vector '{name}' requires an index, e.g. '{name}[0]'"),
                );
                return ExprNode::Null;
            }
            let index = self.parse_index_expr();
            return crate::synth::build_vector_index(cell, index);
        }

        if let Some(resolver) = self.resolver {
            if let Some(resolution) = resolver.resolve(name) {
                return match crate::resolver::auto_register(&self.table, name, &resolution) {
                    Ok(cell) => {
                        if let Some(msg) = &resolution.error_message {
                            self.push_error(ErrorKind::Unknown, span, msg.clone());
                        }
                        let is_const = matches!(resolution.kind, SymbolKind::Constant);
                        ExprNode::Variable { cell, is_const }
                    }
                    Err(err) => {
                        self.push_error(ErrorKind::SymbolTable, span, err.to_string());
                        ExprNode::Null
                    }
                };
            }
        }

        self.push_error(ErrorKind::SymbolTable, span, format!("undefined symbol '{name}'"));
        ExprNode::Null
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::cast_precision_loss,
    clippy::items_after_statements,
    clippy::let_underscore_must_use,
    clippy::no_effect_underscore_binding
)]
mod tests {
    use super::*;

    fn compile(source: &str, table: &SymbolTable<f64>) -> ParseOutcome<f64> {
        parse(source, table, CompileOptions::new(), None)
    }

    #[test]
    fn constant_folds_additive_chain() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("1 + 2 * 3", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 7.0);
    }

    #[test]
    fn unusual_precedence_and_is_looser_than_or() {
        // per the grammar summary, `and` binds looser than `or`, so this
        // parses as `1 and (0 or 1)`, not `(1 and 0) or 1`.
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("1 and 0 or 1", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 1.0);
    }

    #[test]
    fn unary_minus_binds_looser_than_pow() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("-2^2", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), -4.0);
    }

    #[test]
    fn implicit_multiplication_and_variable_lookup() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 3.0).expect("fresh name");
        let outcome = compile("2x", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 6.0);
    }

    #[test]
    fn assignment_writes_through_shared_cell() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let cell = table.create_variable("x", 0.0).expect("fresh name");
        let outcome = compile("x := 5 + 1", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 6.0);
        assert_eq!(cell.get(), 6.0);
    }

    #[test]
    fn conditional_and_comparison() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("if(3 > 2, 10, 20)", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 10.0);
    }

    #[test]
    fn while_loop_accumulates() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("i", 0.0).expect("fresh name");
        table.create_variable("acc", 0.0).expect("fresh name");
        let outcome = compile("while(i < 5){ acc := acc + i; i := i + 1 }", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 10.0);
    }

    #[test]
    fn switch_with_default() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("switch { case 0: 1; default: 2; }", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 2.0);
    }

    #[test]
    fn switch_without_default_is_an_error() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("switch { case 1: 1; }", &table);
        assert!(!outcome.report.is_ok());
    }

    #[test]
    fn string_slice_by_literal_bounds() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("'hello world'[6:10]", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.str_value().as_deref(), Some("world"));
    }

    #[test]
    fn vector_index_reads_element() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.add_vector("v", std::rc::Rc::new(std::cell::RefCell::new(vec![1.0, 2.0, 3.0]))).expect("fresh name");
        let outcome = compile("v[1]", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 2.0);
    }

    #[test]
    fn undefined_symbol_is_reported() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("q + 1", &table);
        assert!(!outcome.report.is_ok());
        assert!(outcome.root.value().is_nan());
    }

    #[test]
    fn unknown_symbol_resolver_auto_registers() {
        struct Zero;
        impl UnknownSymbolResolver<f64> for Zero {
            fn resolve(&self, _name: &str) -> Option<crate::resolver::Resolution<f64>> {
                Some(crate::resolver::Resolution::variable(0.0))
            }
        }
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = parse("q + 1", &table, CompileOptions::new(), Some(&Zero));
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 1.0);
    }

    #[test]
    fn ipow_strength_reduction_applies_through_the_parser() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 2.0).expect("fresh name");
        let outcome = compile("x^7", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 128.0);
    }

    #[test]
    fn special_function_dispatches_by_index() {
        let table: SymbolTable<f64> = SymbolTable::new();
        let outcome = compile("$f00(1, 2, 3)", &table);
        assert!(outcome.report.is_ok());
        assert_eq!(outcome.root.value(), 1.0);
    }

    #[test]
    fn cache_symbols_records_referenced_names() {
        let table: SymbolTable<f64> = SymbolTable::new();
        table.create_variable("x", 1.0).expect("fresh name");
        table.create_variable("y", 2.0).expect("fresh name");
        let opts = CompileOptions::new().cache_symbols(true);
        let outcome = parse("x + y", &table, opts, None);
        assert_eq!(outcome.symbols, Some(vec!["x".to_owned(), "y".to_owned()]));
    }
}
