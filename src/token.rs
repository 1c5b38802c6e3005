//! Selector tokens and their source positions.
use logos::Logos;

/// Location of a token or AST node within the selector text.
/// Carried for diagnostics only; never compared for meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Position {
    /// One-based column, counted in characters.
    pub column: usize,
    /// One-based line number.
    pub line: usize,
    /// Zero-based byte offset into the input.
    pub offset: usize,
}

impl Position {
    /// Compute the line and column of a byte offset within `input`.
    /// Offsets past the end clamp to the end of the input.
    pub fn locate(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let before = input.get(..offset).unwrap_or(input);
        let line_start = before.rfind('\n').map_or(0, |i| return i.saturating_add(1));
        let line = before.matches('\n').count().saturating_add(1);
        let column = before
            .get(line_start..)
            .map_or(0, |s| return s.chars().count())
            .saturating_add(1);

        return Self {
            column,
            line,
            offset,
        };
    }

    /// Position of the first character.
    pub const fn start() -> Self {
        return Self {
            column: 1,
            line: 1,
            offset: 0,
        };
    }
}

/// Classification of a selector token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `&` between query parameters.
    Ampersand,
    /// Reserved word `block`.
    Block,
    /// `]`
    CloseBracket,
    /// `:` between a segment type and its subtype.
    Colon,
    /// Terminates every token stream exactly once.
    EndOfInput,
    /// `=` between a parameter key and value.
    Equals,
    /// A character the lexer could not classify.
    Error,
    /// Reserved word `heading`.
    Heading,
    /// `[a-zA-Z0-9_-]+` that is not a reserved word or a plain number.
    Identifier,
    /// `::` after a namespace.
    NamespaceSeparator,
    /// `[0-9]+`
    Number,
    /// `[`
    OpenBracket,
    /// Reserved word `page`.
    Page,
    /// `?` before the query parameters.
    QuestionMark,
    /// Single- or double-quoted text, quotes included.
    QuotedString,
    /// Reserved word `root`.
    Root,
    /// Reserved word `section`.
    Section,
    /// `/` between path segments.
    Slash,
}

impl TokenKind {
    /// Reserved words name segment types.
    pub const fn is_keyword(self) -> bool {
        return matches!(
            self,
            TokenKind::Block | TokenKind::Heading | TokenKind::Page | TokenKind::Root | TokenKind::Section
        );
    }

    /// Identifiers and reserved words share a shape, which matters where a
    /// bare name is expected (namespaces, parameter keys and values).
    pub const fn is_word(self) -> bool {
        return matches!(self, TokenKind::Identifier) || self.is_keyword();
    }

    /// Anything spelled `[a-zA-Z0-9_-]+`: words plus bare numbers. Namespaces
    /// and parameter keys take any of these, so `2024::root` is valid.
    pub const fn is_name(self) -> bool {
        return matches!(self, TokenKind::Number) || self.is_word();
    }
}

/// One lexed token. The stream for one input is produced in full and then
/// only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// Where it starts.
    pub position: Position,
    /// The exact source slice, quotes included for strings.
    pub text: String,
}

impl Token {
    /// Human-facing rendering used in error messages.
    pub fn describe(&self) -> String {
        return match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => format!("`{}`", self.text),
        };
    }
}

/// Raw scanner. Longest match wins, so `::` beats `:` and `headings` stays
/// an identifier; at equal length literal keywords beat the identifier
/// pattern and digits-only runs are numbers.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    /// `&`
    #[token("&")]
    Ampersand,
    /// `block`
    #[token("block")]
    Block,
    /// `]`
    #[token("]")]
    CloseBracket,
    /// `:`
    #[token(":")]
    Colon,
    /// `=`
    #[token("=")]
    Equals,
    /// `heading`
    #[token("heading")]
    Heading,
    /// Bare name.
    #[regex("[a-zA-Z0-9_-]+")]
    Identifier,
    /// `::`
    #[token("::")]
    NamespaceSeparator,
    /// Unsigned integer.
    #[regex("[0-9]+", priority = 3)]
    Number,
    /// `[`
    #[token("[")]
    OpenBracket,
    /// `page`
    #[token("page")]
    Page,
    /// `?`
    #[token("?")]
    QuestionMark,
    /// Quoted text without escapes.
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    QuotedString,
    /// `root`
    #[token("root")]
    Root,
    /// `section`
    #[token("section")]
    Section,
    /// `/`
    #[token("/")]
    Slash,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        return match raw {
            RawToken::Ampersand => TokenKind::Ampersand,
            RawToken::Block => TokenKind::Block,
            RawToken::CloseBracket => TokenKind::CloseBracket,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Equals => TokenKind::Equals,
            RawToken::Heading => TokenKind::Heading,
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::NamespaceSeparator => TokenKind::NamespaceSeparator,
            RawToken::Number => TokenKind::Number,
            RawToken::OpenBracket => TokenKind::OpenBracket,
            RawToken::Page => TokenKind::Page,
            RawToken::QuestionMark => TokenKind::QuestionMark,
            RawToken::QuotedString => TokenKind::QuotedString,
            RawToken::Root => TokenKind::Root,
            RawToken::Section => TokenKind::Section,
            RawToken::Slash => TokenKind::Slash,
        };
    }
}
