//! Validated selector syntax tree and its canonical text form.
use std::fmt;

use crate::token::Position;

/// Heading depth addressed by `heading:hN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    /// `h1`
    H1,
    /// `h2`
    H2,
    /// `h3`
    H3,
    /// `h4`
    H4,
    /// `h5`
    H5,
    /// `h6`
    H6,
}

impl HeadingLevel {
    /// Every level in depth order.
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Numeric depth, 1 through 6.
    pub const fn depth(self) -> u8 {
        return match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
            HeadingLevel::H4 => 4,
            HeadingLevel::H5 => 5,
            HeadingLevel::H6 => 6,
        };
    }

    /// Level for a markdown heading depth, `None` outside 1..=6.
    pub fn from_depth(depth: u8) -> Option<Self> {
        return Self::ALL.into_iter().find(|l| return l.depth() == depth);
    }

    /// Parse the selector spelling (`h1`..`h6`, lowercase only).
    pub fn from_name(name: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|l| return l.name() == name);
    }

    /// Selector spelling.
    pub const fn name(self) -> &'static str {
        return match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        };
    }
}

/// Block kinds addressed by `block:KIND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Quoted content (`> ...`).
    Blockquote,
    /// Fenced or indented code.
    Code,
    /// Ordered or unordered list.
    List,
    /// Plain paragraph.
    Paragraph,
    /// Pipe table.
    Table,
}

impl BlockKind {
    /// The fixed set, in the order error messages list it.
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Paragraph,
        BlockKind::List,
        BlockKind::Code,
        BlockKind::Table,
        BlockKind::Blockquote,
    ];

    /// Parse the selector spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|k| return k.name() == name);
    }

    /// Selector spelling, also the node type name in the document tree.
    pub const fn name(self) -> &'static str {
        return match self {
            BlockKind::Blockquote => "blockquote",
            BlockKind::Code => "code",
            BlockKind::List => "list",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Table => "table",
        };
    }
}

/// The five segment types of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// `block:KIND`
    Block,
    /// `heading:hN`
    Heading,
    /// `page`
    Page,
    /// `root`
    Root,
    /// `section`
    Section,
}

impl NodeType {
    /// Reserved word spelling.
    pub const fn name(self) -> &'static str {
        return match self {
            NodeType::Block => "block",
            NodeType::Heading => "heading",
            NodeType::Page => "page",
            NodeType::Root => "root",
            NodeType::Section => "section",
        };
    }
}

/// Subtype carried by `heading` and `block` segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtype {
    /// Block kind after `block:`.
    Block(BlockKind),
    /// Heading level after `heading:`.
    Heading(HeadingLevel),
}

/// What a segment addresses. A subtype exists exactly for headings and
/// blocks, so the pairing is carried in the variant rather than checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// `block:KIND`
    Block(BlockKind),
    /// `heading:hN`
    Heading(HeadingLevel),
    /// `page`
    Page,
    /// `root`
    Root,
    /// `section`
    Section,
}

impl SegmentKind {
    /// The segment type without its subtype.
    pub const fn node_type(self) -> NodeType {
        return match self {
            SegmentKind::Block(_) => NodeType::Block,
            SegmentKind::Heading(_) => NodeType::Heading,
            SegmentKind::Page => NodeType::Page,
            SegmentKind::Root => NodeType::Root,
            SegmentKind::Section => NodeType::Section,
        };
    }

    /// The subtype, present for `heading` and `block` only.
    pub const fn subtype(self) -> Option<Subtype> {
        return match self {
            SegmentKind::Block(kind) => Some(Subtype::Block(kind)),
            SegmentKind::Heading(level) => Some(Subtype::Heading(level)),
            SegmentKind::Page | SegmentKind::Root | SegmentKind::Section => None,
        };
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            SegmentKind::Block(kind) => write!(f, "block:{}", kind.name()),
            SegmentKind::Heading(level) => write!(f, "heading:{}", level.name()),
            other => f.write_str(other.node_type().name()),
        };
    }
}

/// One `type[:subtype][index]` component of a selector path.
#[derive(Debug, Clone, Copy)]
pub struct PathSegment {
    /// Ordinal among same-kind siblings. `None` means the first match.
    pub index: Option<usize>,
    /// What the segment addresses.
    pub kind: SegmentKind,
    /// Where the segment starts in the selector text.
    pub position: Position,
}

impl PathSegment {
    /// Canonical form: index written out, except on `root`, which has a
    /// single instance and stays bare at index 0.
    pub fn explicit(self) -> Self {
        let index = self.effective_index();
        if self.kind == SegmentKind::Root && index == 0 {
            return Self {
                index: None,
                ..self
            };
        }
        return self.with_index(index);
    }

    /// The same segment with an explicit index.
    pub const fn with_index(self, index: usize) -> Self {
        return Self {
            index: Some(index),
            ..self
        };
    }

    /// The index the resolver will use: the written one, or 0.
    pub fn effective_index(&self) -> usize {
        return self.index.unwrap_or(0);
    }
}

/// Positions are diagnostics only, so equality ignores them.
impl PartialEq for PathSegment {
    fn eq(&self, other: &Self) -> bool {
        return self.kind == other.kind && self.index == other.index;
    }
}

impl Eq for PathSegment {}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        return Ok(());
    }
}

/// One `key=value` pair after `?`. The key is never empty; the value may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Parameter name.
    pub key: String,
    /// Parameter value with quotes removed.
    pub value: String,
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.key)?;
        if self.value.is_empty() {
            return Ok(());
        }
        if is_bare_word(&self.value) {
            return f.write_str(&self.value);
        }
        // No escapes exist, so pick the quote the value doesn't contain.
        let quote = if self.value.contains('"') { '\'' } else { '"' };
        return write!(f, "{quote}{}{quote}", self.value);
    }
}

/// Root of a parsed selector. `segments` is never empty.
#[derive(Debug, Clone)]
pub struct SelectorAst {
    /// Document scope from a `name::` prefix.
    pub namespace: Option<String>,
    /// Start of the selector text.
    pub position: Position,
    /// Parameters after `?`, in written order. `None` when no `?` appears.
    pub query_params: Option<Vec<QueryParam>>,
    /// Path components, first to last.
    pub segments: Vec<PathSegment>,
}

impl SelectorAst {
    /// The path with every index written out, e.g. `heading:h2[0]/block:code[0]`.
    /// Known-selector pools use this form, so suggestions compare like with like.
    pub fn explicit_path(&self) -> String {
        return join_segments(self.segments.iter().map(|s| return s.explicit()));
    }

    /// The path as written, without namespace or query.
    pub fn path(&self) -> String {
        return join_segments(self.segments.iter().copied());
    }

    /// Value of the first parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        return self
            .query_params
            .as_deref()?
            .iter()
            .find(|p| return p.key == key)
            .map(|p| return p.value.as_str());
    }
}

/// Structural equality; positions are ignored like on segments.
impl PartialEq for SelectorAst {
    fn eq(&self, other: &Self) -> bool {
        return self.namespace == other.namespace
            && self.segments == other.segments
            && self.query_params == other.query_params;
    }
}

impl Eq for SelectorAst {}

impl fmt::Display for SelectorAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}::")?;
        }
        f.write_str(&self.path())?;
        if let Some(params) = &self.query_params {
            let joined = params.iter().map(ToString::to_string).collect::<Vec<_>>().join("&");
            write!(f, "?{joined}")?;
        }
        return Ok(());
    }
}

/// Join segments with `/`.
pub fn join_segments(segments: impl IntoIterator<Item = PathSegment>) -> String {
    return segments
        .into_iter()
        .map(|s| return s.to_string())
        .collect::<Vec<_>>()
        .join("/");
}

/// Whether `s` lexes back as a single identifier or number.
fn is_bare_word(s: &str) -> bool {
    return !s.is_empty()
        && s.chars().all(|c| return c.is_ascii_alphanumeric() || c == '_' || c == '-');
}
