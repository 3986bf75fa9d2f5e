//! Token deque post-processing (C4): implicit multiplication, operator
//! joining, keyword replacement, and structural validation, applied in a
//! fixed order over the lexer's output before the parser ever sees it.
//!
//! The inserter and joiner passes are fused into one streaming left-to-
//! right rewrite driven by small token-pattern windows (stride 2 for
//! implicit multiplication, stride 3 for the `[*]` multi-switch marker)
//! rather than kept as separate deque walks — the two rewrites never
//! conflict with each other's matches, so one pass suffices.

mod sequence;

use crate::error::{CompileError, CompileReport, ErrorKind, Span};
use crate::lexer::{Token, TokenKind};

const IMPLICIT_MUL_IGNORE: &[&str] = &[
    "and", "or", "xor", "nand", "nor", "xnor", "not", "in", "like", "ilike", "mod", "shl", "shr",
    "&", "|", "~", "if", "then", "else", "while", "repeat", "until", "switch", "case", "default",
    "null",
];

fn starts_value(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Number | TokenKind::Symbol | TokenKind::RBracket | TokenKind::RSqr | TokenKind::RCrl)
}

fn opens_value(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Number | TokenKind::Symbol | TokenKind::LBracket | TokenKind::LSqr)
}

fn is_ignored_word(token: &Token) -> bool {
    if token.kind() != TokenKind::Symbol {
        return false;
    }
    token.lexeme().starts_with('$')
        || IMPLICIT_MUL_IGNORE.iter().any(|kw| kw.eq_ignore_ascii_case(token.lexeme()))
}

/// Runs the inserter/joiner fusion, the keyword replacer, and every
/// scanner in sequence, recording structural diagnostics into `report`.
/// Returns the rewritten token deque.
pub fn run(tokens: Vec<Token>, report: &mut CompileReport) -> Vec<Token> {
    let tokens = insert_and_join(tokens);
    let tokens = replace_keyword_literals(tokens);
    check_brackets(&tokens, report);
    check_numbers(&tokens, report);
    sequence::check(&tokens, report);
    tokens
}

fn insert_and_join(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind() == TokenKind::LSqr
            && tokens.get(i + 1).map(Token::kind) == Some(TokenKind::Mul)
            && tokens.get(i + 2).map(Token::kind) == Some(TokenKind::RSqr)
        {
            let span = Span::new(tokens[i].span().start(), tokens[i + 2].span().end());
            out.push(Token::new_for_pipeline(TokenKind::Symbol, "[*]", span));
            i += 3;
            continue;
        }

        if let Some(prev) = out.last() {
            let both_numbers = prev.kind() == TokenKind::Number && tokens[i].kind() == TokenKind::Number;
            let needs_mult = starts_value(prev.kind())
                && opens_value(tokens[i].kind())
                && !both_numbers
                && !is_ignored_word(prev)
                && !is_ignored_word(&tokens[i]);
            if needs_mult {
                let at = tokens[i].span().start();
                out.push(Token::new_for_pipeline(TokenKind::Mul, "*", Span::at(at)));
            }
        }
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

fn replace_keyword_literals(mut tokens: Vec<Token>) -> Vec<Token> {
    for token in &mut tokens {
        if token.kind() != TokenKind::Symbol {
            continue;
        }
        if token.lexeme().eq_ignore_ascii_case("true") {
            *token = Token::new_for_pipeline(TokenKind::Number, "1", token.span());
        } else if token.lexeme().eq_ignore_ascii_case("false") {
            *token = Token::new_for_pipeline(TokenKind::Number, "0", token.span());
        }
    }
    tokens
}

fn check_brackets(tokens: &[Token], report: &mut CompileReport) {
    let mut stack: Vec<(TokenKind, Span)> = Vec::new();
    for token in tokens {
        match token.kind() {
            TokenKind::LBracket => stack.push((TokenKind::RBracket, token.span())),
            TokenKind::LSqr => stack.push((TokenKind::RSqr, token.span())),
            TokenKind::LCrl => stack.push((TokenKind::RCrl, token.span())),
            TokenKind::RBracket | TokenKind::RSqr | TokenKind::RCrl => match stack.pop() {
                Some((expected, _)) if expected == token.kind() => {}
                _ => {
                    report.push(CompileError::new(
                        ErrorKind::Token,
                        token.span(),
                        format!("unmatched closing bracket '{}'", token.lexeme()),
                    ));
                    return;
                }
            },
            _ => {}
        }
    }
    for (_, span) in stack {
        report.push(CompileError::new(ErrorKind::Token, span, "unclosed bracket"));
    }
}

fn check_numbers(tokens: &[Token], report: &mut CompileReport) {
    for token in tokens {
        if token.kind() == TokenKind::ErrNumber {
            report.push(CompileError::new(
                ErrorKind::Numeric,
                token.span(),
                format!("malformed numeric literal '{}'", token.lexeme()),
            ));
        }
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
    use crate::lexer::lex;

    fn run_kinds(source: &str) -> Vec<TokenKind> {
        let mut report = CompileReport::new();
        run(lex(source), &mut report).into_iter().map(|t| t.kind()).collect()
    }

    #[test]
    fn implicit_multiplication_between_number_and_symbol() {
        assert_eq!(
            run_kinds("2x"),
            vec![TokenKind::Number, TokenKind::Mul, TokenKind::Symbol, TokenKind::Eof]
        );
    }

    #[test]
    fn implicit_multiplication_skipped_for_ignored_keyword() {
        assert_eq!(run_kinds("x and y"), vec![
            TokenKind::Symbol,
            TokenKind::Symbol,
            TokenKind::Symbol,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn multi_switch_marker_joined() {
        let tokens = run_kinds("[*]");
        assert_eq!(tokens, vec![TokenKind::Symbol, TokenKind::Eof]);
    }

    #[test]
    fn true_false_become_numbers() {
        let mut report = CompileReport::new();
        let tokens = run(lex("true"), &mut report);
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].lexeme(), "1");
    }

    #[test]
    fn unmatched_bracket_reported() {
        let mut report = CompileReport::new();
        run(lex("(1 + 2"), &mut report);
        assert_eq!(report.error_count(), 1);
    }
}
