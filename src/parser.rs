//! Recursive-descent parser for selector text.
//!
//! ```text
//! selector = [word "::"] segment ("/" segment)* ["?" param ("&" param)*]
//! segment  = ("root" | "heading:" level | "section" | "block:" kind | "page") ["[" integer "]"]
//! param    = word "=" [word | number | string]
//! ```
//!
//! One method per production. Any failure aborts the parse; callers never
//! see a partial tree.
use std::fmt::Write as _;

use tracing::debug;

use crate::ast::{BlockKind, HeadingLevel, PathSegment, QueryParam, SegmentKind, SelectorAst};
use crate::lexer::{self, LexError};
use crate::token::{Position, Token, TokenKind};

/// The nine ways a selector can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseErrorKind {
    /// Empty or whitespace-only input.
    EmptySelector,
    /// `block:` followed by something other than a known block kind.
    InvalidBlockType,
    /// `heading:` followed by something other than `h1`..`h6`.
    InvalidHeadingLevel,
    /// Index brackets holding something other than a non-negative integer.
    InvalidIndex,
    /// Misplaced or dangling `::`.
    InvalidNamespace,
    /// Anything else the grammar does not allow.
    InvalidSyntax,
    /// Query after `?` that is not `key=value` pairs joined by `&`.
    MalformedQuery,
    /// A path ending in `/`.
    TrailingSlash,
    /// `[` without a matching `]`.
    UnclosedBracket,
}

impl ParseErrorKind {
    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        return match self {
            ParseErrorKind::EmptySelector => "EMPTY_SELECTOR",
            ParseErrorKind::InvalidBlockType => "INVALID_BLOCK_TYPE",
            ParseErrorKind::InvalidHeadingLevel => "INVALID_HEADING_LEVEL",
            ParseErrorKind::InvalidIndex => "INVALID_INDEX",
            ParseErrorKind::InvalidNamespace => "INVALID_NAMESPACE",
            ParseErrorKind::InvalidSyntax => "INVALID_SYNTAX",
            ParseErrorKind::MalformedQuery => "MALFORMED_QUERY",
            ParseErrorKind::TrailingSlash => "TRAILING_SLASH",
            ParseErrorKind::UnclosedBracket => "UNCLOSED_BRACKET",
        };
    }
}

/// A rejected selector, with enough context to point at the problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (line {}, column {})", position.line, position.column)]
pub struct ParseError {
    /// The complete original selector text.
    pub input: String,
    /// Which rule was broken.
    pub kind: ParseErrorKind,
    /// What went wrong and, where possible, what is accepted instead.
    pub message: String,
    /// The offending token.
    pub position: Position,
}

impl ParseError {
    /// The offending input line with a `^` under the error column.
    pub fn caret(&self) -> String {
        let line = self
            .input
            .lines()
            .nth(self.position.line.saturating_sub(1))
            .unwrap_or_default();
        let mut out = String::with_capacity(line.len().saturating_mul(2));
        let _ = writeln!(out, "{line}");
        let pad = " ".repeat(self.position.column.saturating_sub(1));
        let _ = write!(out, "{pad}^");
        return out;
    }

    /// Build an error with the full input attached.
    fn new(kind: ParseErrorKind, message: impl Into<String>, position: Position, input: &str) -> Self {
        return Self {
            input: input.to_string(),
            kind,
            message: message.into(),
            position,
        };
    }

    /// A lexer failure surfaces as a syntax error at the same spot.
    fn from_lex(error: &LexError, input: &str) -> Self {
        return Self::new(ParseErrorKind::InvalidSyntax, error.to_string(), error.position, input);
    }
}

/// Parse a selector into a validated AST.
///
/// # Errors
///
/// Returns `ParseError` for empty input, characters outside the selector
/// alphabet, and every grammar violation, each with its own kind.
pub fn parse(input: &str) -> Result<SelectorAst, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::EmptySelector,
            "selector is empty; start with a segment such as `root` or `heading:h1`",
            Position::start(),
            input,
        ));
    }

    let tokens = lexer::tokenize(input).map_err(|e| return ParseError::from_lex(&e, input))?;
    let mut parser = Parser::new(input, tokens);
    let ast = parser.selector()?;
    debug!(selector = %ast, segments = ast.segments.len(), "parsed selector");
    return Ok(ast);
}

/// Token cursor over one input.
struct Parser<'a> {
    /// Next token to consume.
    cursor: usize,
    /// Returned when peeking past the stream; mirrors its last token.
    end: Token,
    /// Original text, attached to every error.
    input: &'a str,
    /// Complete stream, ending in `EndOfInput`.
    tokens: Vec<Token>,
}

impl<'a> Parser<'a> {
    /// Start at the first token.
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        let end = Token {
            kind: TokenKind::EndOfInput,
            position: Position::locate(input, input.len()),
            text: String::new(),
        };
        return Self {
            cursor: 0,
            end,
            input,
            tokens,
        };
    }

    /// Consume the next token.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::EndOfInput {
            self.cursor = self.cursor.saturating_add(1);
        }
        return token;
    }

    /// Build an error at `position`.
    fn error(&self, kind: ParseErrorKind, message: impl Into<String>, position: Position) -> ParseError {
        return ParseError::new(kind, message, position, self.input);
    }

    /// `segment ["[" integer "]"]`
    fn indexed_segment(&mut self) -> Result<PathSegment, ParseError> {
        let position = self.peek().position;
        let kind = self.segment_kind()?;
        let index = if self.peek().kind == TokenKind::OpenBracket {
            Some(self.index()?)
        } else {
            None
        };
        return Ok(PathSegment {
            index,
            kind,
            position,
        });
    }

    /// `"[" integer "]"`
    fn index(&mut self) -> Result<usize, ParseError> {
        let open = self.advance();
        let token = self.peek().clone();

        let index = match token.kind {
            TokenKind::Number => {
                self.advance();
                token.text.parse::<usize>().map_err(|_| {
                    return self.error(
                        ParseErrorKind::InvalidIndex,
                        format!("index {} is too large", token.text),
                        token.position,
                    );
                })?
            },
            TokenKind::CloseBracket => {
                return Err(self.error(
                    ParseErrorKind::InvalidSyntax,
                    "empty index brackets; write a non-negative integer such as `[0]` or drop the brackets",
                    token.position,
                ));
            },
            TokenKind::EndOfInput | TokenKind::Slash | TokenKind::QuestionMark => {
                return Err(self.error(
                    ParseErrorKind::UnclosedBracket,
                    format!("`[` at column {} is never closed", open.position.column),
                    token.position,
                ));
            },
            _ => {
                return Err(self.error(
                    ParseErrorKind::InvalidIndex,
                    format!("index must be a non-negative integer, found {}", token.describe()),
                    token.position,
                ));
            },
        };

        let close = self.peek().clone();
        if close.kind != TokenKind::CloseBracket {
            return Err(self.error(
                ParseErrorKind::UnclosedBracket,
                format!(
                    "expected `]` to close `[` at column {}, found {}",
                    open.position.column,
                    close.describe()
                ),
                close.position,
            ));
        }
        self.advance();
        return Ok(index);
    }

    /// `[name "::"]`
    fn namespace(&mut self) -> Result<Option<String>, ParseError> {
        let first = self.peek().clone();

        if first.kind == TokenKind::NamespaceSeparator {
            return Err(self.error(
                ParseErrorKind::InvalidNamespace,
                "`::` must follow a namespace name, e.g. `doc::root`",
                first.position,
            ));
        }

        let is_namespace = first.kind.is_name() && self.peek_second().kind == TokenKind::NamespaceSeparator;
        if !is_namespace {
            return Ok(None);
        }

        self.advance();
        let separator = self.advance();
        if self.peek().kind == TokenKind::EndOfInput {
            return Err(self.error(
                ParseErrorKind::InvalidNamespace,
                format!("namespace `{}` must be followed by a selector path", first.text),
                separator.position,
            ));
        }
        let next = self.peek();
        if next.kind.is_name() && self.peek_second().kind == TokenKind::NamespaceSeparator {
            return Err(self.error(
                ParseErrorKind::InvalidNamespace,
                "a selector may carry only one namespace",
                next.position,
            ));
        }
        return Ok(Some(first.text));
    }

    /// `param ("&" param)*` after the `?`.
    fn params(&mut self) -> Result<Vec<QueryParam>, ParseError> {
        let mut params = vec![self.param()?];
        while self.peek().kind == TokenKind::Ampersand {
            self.advance();
            params.push(self.param()?);
        }
        return Ok(params);
    }

    /// `name "=" [word | number | string]`
    fn param(&mut self) -> Result<QueryParam, ParseError> {
        let key = self.peek().clone();
        if !key.kind.is_name() {
            return Err(self.error(
                ParseErrorKind::MalformedQuery,
                format!("expected a parameter name, found {}", key.describe()),
                key.position,
            ));
        }
        self.advance();

        let equals = self.peek().clone();
        if equals.kind != TokenKind::Equals {
            return Err(self.error(
                ParseErrorKind::MalformedQuery,
                format!("expected `=` after parameter `{}`, found {}", key.text, equals.describe()),
                equals.position,
            ));
        }
        self.advance();

        let value = self.peek().clone();
        let text = match value.kind {
            TokenKind::Ampersand | TokenKind::EndOfInput => String::new(),
            TokenKind::Number => {
                self.advance();
                value.text
            },
            TokenKind::QuotedString => {
                self.advance();
                unquote(&value.text).to_string()
            },
            kind if kind.is_word() => {
                self.advance();
                value.text
            },
            _ => {
                return Err(self.error(
                    ParseErrorKind::MalformedQuery,
                    format!("invalid value for parameter `{}`: {}", key.text, value.describe()),
                    value.position,
                ));
            },
        };

        return Ok(QueryParam {
            key: key.text,
            value: text,
        });
    }

    /// `segment ("/" segment)*`
    fn path(&mut self) -> Result<Vec<PathSegment>, ParseError> {
        let mut segments = vec![self.indexed_segment()?];

        while self.peek().kind == TokenKind::Slash {
            let slash = self.advance();
            match self.peek().kind {
                TokenKind::EndOfInput | TokenKind::QuestionMark => {
                    return Err(self.error(
                        ParseErrorKind::TrailingSlash,
                        "selector path ends with `/`; remove it or add a segment",
                        slash.position,
                    ));
                },
                _ => segments.push(self.indexed_segment()?),
            }
        }

        return Ok(segments);
    }

    /// Look at the next token without consuming it.
    fn peek(&self) -> &Token {
        return self.tokens.get(self.cursor).unwrap_or(&self.end);
    }

    /// Look one token further than `peek`.
    fn peek_second(&self) -> &Token {
        return self.tokens.get(self.cursor.saturating_add(1)).unwrap_or(&self.end);
    }

    /// `["?" params]`
    fn query(&mut self) -> Result<Option<Vec<QueryParam>>, ParseError> {
        if self.peek().kind != TokenKind::QuestionMark {
            return Ok(None);
        }
        let mark = self.advance();
        if self.peek().kind == TokenKind::EndOfInput {
            return Err(self.error(
                ParseErrorKind::MalformedQuery,
                "`?` must be followed by at least one `key=value` parameter",
                mark.position,
            ));
        }
        return Ok(Some(self.params()?));
    }

    /// Segment type and, for headings and blocks, `":" subtype`.
    fn segment_kind(&mut self) -> Result<SegmentKind, ParseError> {
        let token = self.peek().clone();

        return match token.kind {
            TokenKind::Root => {
                self.advance();
                Ok(SegmentKind::Root)
            },
            TokenKind::Section => {
                self.advance();
                Ok(SegmentKind::Section)
            },
            TokenKind::Page => {
                self.advance();
                Ok(SegmentKind::Page)
            },
            TokenKind::Heading => {
                self.advance();
                self.subtype_colon("heading", "heading:h2")?;
                let level = self.subtype_name();
                HeadingLevel::from_name(&level.text)
                    .filter(|_| return level.kind == TokenKind::Identifier)
                    .map(|l| {
                        self.advance();
                        return SegmentKind::Heading(l);
                    })
                    .ok_or_else(|| {
                        return self.error(
                            ParseErrorKind::InvalidHeadingLevel,
                            format!(
                                "invalid heading level {}; expected one of {}",
                                level.describe(),
                                HeadingLevel::ALL.map(HeadingLevel::name).join(", ")
                            ),
                            level.position,
                        );
                    })
            },
            TokenKind::Block => {
                self.advance();
                self.subtype_colon("block", "block:code")?;
                let kind = self.subtype_name();
                BlockKind::from_name(&kind.text)
                    .filter(|_| return kind.kind == TokenKind::Identifier)
                    .map(|k| {
                        self.advance();
                        return SegmentKind::Block(k);
                    })
                    .ok_or_else(|| {
                        return self.error(
                            ParseErrorKind::InvalidBlockType,
                            format!(
                                "invalid block type {}; expected one of {}",
                                kind.describe(),
                                BlockKind::ALL.map(BlockKind::name).join(", ")
                            ),
                            kind.position,
                        );
                    })
            },
            TokenKind::Slash => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                "empty path segment; every `/` must be followed by a segment",
                token.position,
            )),
            TokenKind::NamespaceSeparator => Err(self.error(
                ParseErrorKind::InvalidNamespace,
                "`::` may only appear once, directly after the leading namespace",
                token.position,
            )),
            TokenKind::Identifier => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                format!(
                    "unknown segment type `{}`; expected one of root, heading, section, block, page",
                    token.text
                ),
                token.position,
            )),
            TokenKind::EndOfInput => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                "expected a path segment, found end of input",
                token.position,
            )),
            _ => Err(self.error(
                ParseErrorKind::InvalidSyntax,
                format!("expected a path segment, found {}", token.describe()),
                token.position,
            )),
        };
    }

    /// `[word "::"] path [query]`, then nothing.
    fn selector(&mut self) -> Result<SelectorAst, ParseError> {
        let position = self.peek().position;
        let namespace = self.namespace()?;
        let segments = self.path()?;
        let query_params = self.query()?;

        let trailing = self.peek();
        if trailing.kind != TokenKind::EndOfInput {
            return Err(self.error(
                ParseErrorKind::InvalidSyntax,
                format!("unexpected {} after selector", trailing.describe()),
                trailing.position,
            ));
        }

        return Ok(SelectorAst {
            namespace,
            position,
            query_params,
            segments,
        });
    }

    /// The `:` between a segment type and its subtype.
    fn subtype_colon(&mut self, keyword: &str, example: &str) -> Result<(), ParseError> {
        let colon = self.peek().clone();
        if colon.kind != TokenKind::Colon {
            return Err(self.error(
                ParseErrorKind::InvalidSyntax,
                format!("expected `:` after `{keyword}`, found {}; e.g. `{example}`", colon.describe()),
                colon.position,
            ));
        }
        self.advance();
        return Ok(());
    }

    /// The token after a subtype colon, not yet consumed.
    fn subtype_name(&self) -> Token {
        return self.peek().clone();
    }
}

/// Strip the matching quote characters from a quoted-string token.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| return t.strip_suffix(quote)) {
            return inner;
        }
    }
    return text;
}
