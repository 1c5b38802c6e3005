//! The document tree the resolver walks.
//!
//! A closed set of node kinds, each carrying only what it needs. A heading
//! owns its title (a leading `Text` child) followed by the content of its
//! section: blocks and deeper headings, in document order.
use std::collections::HashMap;

use crate::ast::{BlockKind, HeadingLevel, PathSegment, SegmentKind, join_segments};
use crate::token::Position;

/// One node of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Paragraph, list, code, table, or blockquote.
    Block {
        /// Nested content; code blocks hold one `Text` with the verbatim body.
        children: Vec<Node>,
        /// Which block this is.
        kind: BlockKind,
    },
    /// A heading and the section it opens.
    Heading {
        /// Title text first, then the section content.
        children: Vec<Node>,
        /// Heading depth.
        level: HeadingLevel,
    },
    /// The document itself.
    Root {
        /// Top-level content.
        children: Vec<Node>,
    },
    /// Leaf text.
    Text {
        /// The text as written.
        value: String,
    },
}

impl Node {
    /// A block node.
    pub fn block(kind: BlockKind, children: Vec<Node>) -> Self {
        return Node::Block { children, kind };
    }

    /// Block kind, if this is a block.
    pub const fn block_kind(&self) -> Option<BlockKind> {
        return match self {
            Node::Block { kind, .. } => Some(*kind),
            Node::Heading { .. } | Node::Root { .. } | Node::Text { .. } => None,
        };
    }

    /// Ordered children; empty for text.
    pub fn children(&self) -> &[Node] {
        return match self {
            Node::Block { children, .. } | Node::Heading { children, .. } | Node::Root { children } => children,
            Node::Text { .. } => &[],
        };
    }

    /// A code block holding `code` verbatim.
    pub fn code(code: impl Into<String>) -> Self {
        return Node::block(BlockKind::Code, vec![Node::text(code)]);
    }

    /// Whether the node has any descendants.
    pub fn has_children(&self) -> bool {
        return !self.children().is_empty();
    }

    /// A heading titled `title` whose section holds `content`.
    pub fn heading(level: HeadingLevel, title: impl Into<String>, content: Vec<Node>) -> Self {
        let mut children = Vec::with_capacity(content.len().saturating_add(1));
        children.push(Node::text(title));
        children.extend(content);
        return Node::Heading { children, level };
    }

    /// Heading level, if this is a heading.
    pub const fn heading_level(&self) -> Option<HeadingLevel> {
        return match self {
            Node::Heading { level, .. } => Some(*level),
            Node::Block { .. } | Node::Root { .. } | Node::Text { .. } => None,
        };
    }

    /// Whether a non-root segment addresses this node. `section` takes any
    /// heading, since a heading already groups its trailing content. `page`
    /// has no physical node and never matches.
    pub fn matches(&self, kind: SegmentKind) -> bool {
        return match (kind, self) {
            (SegmentKind::Heading(want), Node::Heading { level, .. }) => want == *level,
            (SegmentKind::Block(want), Node::Block { kind: have, .. }) => want == *have,
            (SegmentKind::Section, Node::Heading { .. }) => true,
            _ => false,
        };
    }

    /// A paragraph holding `text`.
    pub fn paragraph(text: impl Into<String>) -> Self {
        return Node::block(BlockKind::Paragraph, vec![Node::text(text)]);
    }

    /// The document root.
    pub fn root(children: Vec<Node>) -> Self {
        return Node::Root { children };
    }

    /// A text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        return Node::Text { value: value.into() };
    }

    /// Type tag: `root`, `heading`, a block kind name, or `text`.
    pub const fn type_name(&self) -> &'static str {
        return match self {
            Node::Block { kind, .. } => kind.name(),
            Node::Heading { .. } => "heading",
            Node::Root { .. } => "root",
            Node::Text { .. } => "text",
        };
    }

    /// Approximate word count: whitespace-separated words across every text
    /// leaf under this node, code bodies included.
    pub fn word_count(&self) -> usize {
        let mut total: usize = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Node::Text { value } = node {
                total = total.saturating_add(value.split_whitespace().count());
            }
            stack.extend(node.children());
        }
        return total;
    }
}

/// Every addressable selector in `tree`, in document order, with explicit
/// indices: `root` first, then one entry per heading and block.
/// Walks with an explicit stack, so document nesting depth never touches
/// the call stack.
pub fn known_selectors(tree: &Node) -> Vec<String> {
    let mut out = vec!["root".to_string()];
    let mut stack: Vec<(&Node, Vec<PathSegment>)> = Vec::new();
    push_children(tree, &[], &mut stack);

    while let Some((node, path)) = stack.pop() {
        out.push(join_segments(path.iter().copied()));
        push_children(node, &path, &mut stack);
    }

    return out;
}

/// Push the addressable children of `parent` in reverse, so popping yields
/// document order.
fn push_children<'a>(parent: &'a Node, prefix: &[PathSegment], stack: &mut Vec<(&'a Node, Vec<PathSegment>)>) {
    let mut ordinals: HashMap<SegmentKind, usize> = HashMap::new();
    let mut entries = Vec::new();

    for child in parent.children() {
        let kind = match child {
            Node::Block { kind, .. } => SegmentKind::Block(*kind),
            Node::Heading { level, .. } => SegmentKind::Heading(*level),
            Node::Root { .. } | Node::Text { .. } => continue,
        };
        let ordinal = ordinals.entry(kind).or_insert(0);
        let segment = PathSegment {
            index: Some(*ordinal),
            kind,
            position: Position::start(),
        };
        *ordinal = ordinal.saturating_add(1);

        let mut path = prefix.to_vec();
        path.push(segment);
        entries.push((child, path));
    }

    stack.extend(entries.into_iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        return Node::root(vec![
            Node::paragraph("intro text here"),
            Node::heading(HeadingLevel::H2, "Install", vec![
                Node::paragraph("run the installer"),
                Node::code("cargo install mdpath"),
            ]),
            Node::heading(HeadingLevel::H2, "Usage", vec![
                Node::heading(HeadingLevel::H3, "Flags", vec![Node::block(BlockKind::List, vec![
                    Node::paragraph("one"),
                ])]),
            ]),
        ]);
    }

    #[test]
    fn known_selectors_in_document_order() {
        assert_eq!(known_selectors(&sample()), vec![
            "root",
            "block:paragraph[0]",
            "heading:h2[0]",
            "heading:h2[0]/block:paragraph[0]",
            "heading:h2[0]/block:code[0]",
            "heading:h2[1]",
            "heading:h2[1]/heading:h3[0]",
            "heading:h2[1]/heading:h3[0]/block:list[0]",
            "heading:h2[1]/heading:h3[0]/block:list[0]/block:paragraph[0]",
        ]);
    }

    #[test]
    fn word_count_includes_titles_and_code() {
        let tree = sample();
        let install = &tree.children()[1];
        assert_eq!(install.word_count(), 1 + 3 + 3);
        assert_eq!(tree.word_count(), 3 + 7 + 1 + 1 + 1);
    }

    #[test]
    fn text_has_no_children() {
        assert!(!Node::text("x").has_children());
        assert!(Node::heading(HeadingLevel::H1, "t", vec![]).has_children());
    }

    #[test]
    fn matching_rules() {
        let h2 = Node::heading(HeadingLevel::H2, "t", vec![]);
        assert!(h2.matches(SegmentKind::Heading(HeadingLevel::H2)));
        assert!(!h2.matches(SegmentKind::Heading(HeadingLevel::H3)));
        assert!(h2.matches(SegmentKind::Section));
        assert!(!h2.matches(SegmentKind::Page));
        assert!(Node::code("x").matches(SegmentKind::Block(BlockKind::Code)));
        assert!(!Node::code("x").matches(SegmentKind::Block(BlockKind::Table)));
        assert!(!Node::text("x").matches(SegmentKind::Section));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Node::code("x = 1")).unwrap();
        assert_eq!(json["type"], "block");
        assert_eq!(json["kind"], "code");
        assert_eq!(json["children"][0]["value"], "x = 1");
    }

    #[test]
    fn deep_nesting_walks_without_recursion() {
        let mut node = Node::paragraph("leaf");
        for _ in 0..50_000 {
            node = Node::block(BlockKind::Blockquote, vec![node]);
        }
        assert_eq!(node.word_count(), 1);
        // Drop recurses once per level.
        std::mem::forget(node);
    }

    #[test]
    fn nested_selectors_stay_ordered() {
        let mut node = Node::paragraph("leaf");
        for _ in 0..200 {
            node = Node::block(BlockKind::Blockquote, vec![node]);
        }
        let found = known_selectors(&Node::root(vec![node]));
        assert_eq!(found.len(), 202);
        assert_eq!(found[1], "block:blockquote[0]");
        assert!(found[201].ends_with("/block:paragraph[0]"));
    }
}
