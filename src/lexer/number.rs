//! Numeric literal scanning: `[0-9.]`, one optional decimal point, an
//! optional signed exponent with at least one digit.

use super::{Token, TokenKind};
use crate::error::Span;

pub(super) fn scan(bytes: &[u8], pos: &mut usize, tokens: &mut Vec<Token>) {
    let start = *pos;
    let mut dot_count = 0usize;
    let mut malformed = false;

    while *pos < bytes.len() && (bytes[*pos].is_ascii_digit() || bytes[*pos] == b'.') {
        if bytes[*pos] == b'.' {
            dot_count += 1;
            if dot_count > 1 {
                malformed = true;
            }
        }
        *pos += 1;
    }

    if *pos < bytes.len() && (bytes[*pos] == b'e' || bytes[*pos] == b'E') {
        let exp_start = *pos;
        let mut cursor = *pos + 1;
        if cursor < bytes.len() && (bytes[cursor] == b'+' || bytes[cursor] == b'-') {
            cursor += 1;
        }
        let digits_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }
        if cursor > digits_start {
            *pos = cursor;
        } else {
            // `e`/`E` with no following digit is not part of the literal.
            let _ = exp_start;
        }
    }

    let lexeme = String::from_utf8_lossy(&bytes[start..*pos]).into_owned();
    let kind = if malformed { TokenKind::ErrNumber } else { TokenKind::Number };
    tokens.push(Token::new(kind, lexeme, Span::new(start, *pos)));
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
    use super::super::{lex, TokenKind};

    #[test]
    fn integer_and_fraction() {
        let tokens = lex("42 3.14");
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].lexeme(), "42");
        assert_eq!(tokens[1].kind(), TokenKind::Number);
        assert_eq!(tokens[1].lexeme(), "3.14");
    }

    #[test]
    fn exponent_with_sign() {
        let tokens = lex("2.5e-3");
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].lexeme(), "2.5e-3");
    }

    #[test]
    fn multiple_decimal_points_is_error() {
        let tokens = lex("1.2.3");
        assert_eq!(tokens[0].kind(), TokenKind::ErrNumber);
    }

    #[test]
    fn exponent_marker_without_digits_is_not_consumed() {
        let tokens = lex("1e");
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].lexeme(), "1");
        assert_eq!(tokens[1].kind(), TokenKind::Symbol);
        assert_eq!(tokens[1].lexeme(), "e");
    }
}
