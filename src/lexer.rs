//! Selector lexer: text to a flat token stream with positions.
use logos::Logos as _;
use tracing::trace;

use crate::token::{Position, RawToken, Token, TokenKind};

/// Why the lexer rejected a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexErrorKind {
    /// A character outside the selector alphabet.
    InvalidCharacter,
    /// An opening quote with no matching close.
    UnterminatedString,
}

impl LexErrorKind {
    /// Short phrase used in messages.
    pub const fn describe(self) -> &'static str {
        return match self {
            LexErrorKind::InvalidCharacter => "invalid character",
            LexErrorKind::UnterminatedString => "unterminated string starting at",
        };
    }
}

/// A character the lexer could not turn into a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} `{character}` at line {}, column {}", kind.describe(), position.line, position.column)]
pub struct LexError {
    /// The offending character.
    pub character: char,
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Where the offending character sits.
    pub position: Position,
}

/// Tokenize a selector. The stream always ends with exactly one
/// `EndOfInput` token; empty and all-whitespace input yield only that token.
///
/// # Errors
///
/// Returns `LexError` for the first character that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let tokens = tokenize_lossy(input);

    if let Some(bad) = tokens.iter().find(|t| return t.kind == TokenKind::Error) {
        let character = bad.text.chars().next().unwrap_or('\u{fffd}');
        let kind = if character == '"' || character == '\'' {
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::InvalidCharacter
        };
        return Err(LexError {
            character,
            kind,
            position: bad.position,
        });
    }

    return Ok(tokens);
}

/// Tokenize without failing: unrecognized characters become `Error` tokens
/// and scanning resumes after them. Useful for rendering a token dump of
/// input that does not lex cleanly.
pub fn tokenize_lossy(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let position = Position::locate(input, span.start);
        let token = match result {
            Ok(raw) => Token {
                kind: TokenKind::from(raw),
                position,
                text: lexer.slice().to_string(),
            },
            Err(()) => Token {
                kind: TokenKind::Error,
                position,
                text: input
                    .get(span.start..)
                    .and_then(|rest| return rest.chars().next())
                    .map(String::from)
                    .unwrap_or_default(),
            },
        };
        trace!(kind = ?token.kind, text = %token.text, offset = span.start, "token");
        tokens.push(token);
    }

    tokens.push(Token {
        kind: TokenKind::EndOfInput,
        position: Position::locate(input, input.len()),
        text: String::new(),
    });

    return tokens;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        return tokenize(input).unwrap().into_iter().map(|t| t.kind).collect();
    }

    #[test]
    fn empty_input_is_just_end() {
        assert_eq!(kinds(""), vec![TokenKind::EndOfInput]);
        assert_eq!(kinds("  \t "), vec![TokenKind::EndOfInput]);
    }

    #[test]
    fn namespace_separator_beats_colon() {
        assert_eq!(
            kinds("doc::heading:h2"),
            vec![
                TokenKind::Identifier,
                TokenKind::NamespaceSeparator,
                TokenKind::Heading,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn keywords_only_on_whole_match() {
        assert_eq!(kinds("headings"), vec![TokenKind::Identifier, TokenKind::EndOfInput]);
        assert_eq!(kinds("rooted"), vec![TokenKind::Identifier, TokenKind::EndOfInput]);
        assert_eq!(kinds("root"), vec![TokenKind::Root, TokenKind::EndOfInput]);
    }

    #[test]
    fn digits_are_numbers_mixed_are_identifiers() {
        assert_eq!(kinds("42"), vec![TokenKind::Number, TokenKind::EndOfInput]);
        assert_eq!(kinds("4a"), vec![TokenKind::Identifier, TokenKind::EndOfInput]);
    }

    #[test]
    fn full_selector_stream() {
        let tokens = tokenize("section[2]?full=true&q='a b'").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["section", "[", "2", "]", "?", "full", "=", "true", "&", "q", "=", "'a b'", ""]
        );
        assert_eq!(tokens[11].kind, TokenKind::QuotedString);
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(
            kinds(" root / section "),
            vec![TokenKind::Root, TokenKind::Slash, TokenKind::Section, TokenKind::EndOfInput]
        );
    }

    #[test]
    fn positions_point_at_token_start() {
        let tokens = tokenize("root/block:code").unwrap();
        assert_eq!(tokens[2].position.offset, 5);
        assert_eq!(tokens[2].position.column, 6);
        assert_eq!(tokens.last().unwrap().position.offset, 15);
    }

    #[test]
    fn invalid_character_reports_position() {
        let err = tokenize("heading:h2$").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidCharacter);
        assert_eq!(err.character, '$');
        assert_eq!(err.position.column, 11);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("root?q=\"open").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.character, '"');
        assert_eq!(err.position.offset, 7);
    }

    #[test]
    fn lossy_keeps_going() {
        let tokens = tokenize_lossy("root$/page");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Root,
                TokenKind::Error,
                TokenKind::Slash,
                TokenKind::Page,
                TokenKind::EndOfInput,
            ]
        );
    }
}
