//! String literal scanning: single-quote delimited, with a backslash escape
//! for `\n \r \t \\` and an escaped single-quote.

use super::{Token, TokenKind};
use crate::error::Span;

pub(super) fn scan(bytes: &[u8], pos: &mut usize, tokens: &mut Vec<Token>) {
    let start = *pos;
    *pos += 1; // consume opening quote
    let mut content = String::new();
    let mut terminated = false;

    while *pos < bytes.len() {
        match bytes[*pos] {
            b'\'' => {
                *pos += 1;
                terminated = true;
                break;
            }
            b'\\' if *pos + 1 < bytes.len() => {
                let escaped = bytes[*pos + 1];
                let decoded = match escaped {
                    b'n' => Some('\n'),
                    b'r' => Some('\r'),
                    b't' => Some('\t'),
                    b'\\' => Some('\\'),
                    b'\'' => Some('\''),
                    _ => None,
                };
                match decoded {
                    Some(ch) => {
                        content.push(ch);
                        *pos += 2;
                    }
                    None => {
                        content.push('\\');
                        *pos += 1;
                    }
                }
            }
            byte => {
                // Source is treated as a byte string; non-ASCII bytes pass
                // through untouched rather than being UTF-8 validated here.
                content.push(byte as char);
                *pos += 1;
            }
        }
    }

    let kind = if terminated { TokenKind::String } else { TokenKind::ErrString };
    let lexeme = if terminated { content } else { String::from_utf8_lossy(&bytes[start..*pos]).into_owned() };
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
    fn plain_string() {
        let tokens = lex("'hello'");
        assert_eq!(tokens[0].kind(), TokenKind::String);
        assert_eq!(tokens[0].lexeme(), "hello");
    }

    #[test]
    fn escape_sequences_decoded() {
        let tokens = lex(r"'a\tb\nc'");
        assert_eq!(tokens[0].lexeme(), "a\tb\nc");
    }

    #[test]
    fn escaped_quote_is_literal() {
        let tokens = lex(r"'it\'s'");
        assert_eq!(tokens[0].kind(), TokenKind::String);
        assert_eq!(tokens[0].lexeme(), "it's");
    }

    #[test]
    fn unterminated_string_is_error() {
        let tokens = lex("'abc");
        assert_eq!(tokens[0].kind(), TokenKind::ErrString);
    }
}
