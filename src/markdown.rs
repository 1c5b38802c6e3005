//! Markdown source to document tree, via the tree-sitter markdown grammar.
//!
//! tree-sitter-md already groups each heading with its content into a
//! `section` node, nested by level. Sections with a heading become
//! `Node::Heading`; the heading-less section holding content before the
//! first heading is spliced into its parent.
use std::path::Path;

use tree_sitter::{Language, Node as TsNode, Parser, Tree};

use crate::ast::{BlockKind, HeadingLevel};
use crate::error::Error;
use crate::tree::Node;

/// Maximum markdown file size (16 MiB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// The tree-sitter markdown block grammar.
pub fn language() -> Language {
    return tree_sitter_md::LANGUAGE.into();
}

/// Parse markdown into a document tree.
///
/// # Errors
///
/// Returns `Error::FileTooLarge` if the source exceeds the size limit,
/// or `Error::MarkdownParseFailed` if tree-sitter cannot parse it.
pub fn parse_markdown(file_path: &Path, source: &str) -> Result<Node, Error> {
    let source_len: u64 = source.len().try_into().unwrap_or(u64::MAX);
    if source_len > MAX_FILE_SIZE {
        return Err(Error::FileTooLarge {
            file: file_path.to_path_buf(),
            size_bytes: source_len,
            max_bytes: MAX_FILE_SIZE,
        });
    }

    let tree = parse_source(file_path, source)?;
    return Ok(Node::root(convert_children(tree.root_node(), source)));
}

/// Parse source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::MarkdownParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser.set_language(&language()).map_err(|e| {
        return Error::MarkdownParseFailed {
            file: file_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::MarkdownParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// Convert every named child of `node`, in order.
fn convert_children(node: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        convert_into(child, source, &mut out);
    }
    return out;
}

/// Append the tree node(s) for one CST node. Markers, delimiters, and
/// thematic breaks produce nothing.
fn convert_into(node: TsNode<'_>, source: &str, out: &mut Vec<Node>) {
    match node.kind() {
        "section" => convert_section(node, source, out),
        "atx_heading" | "setext_heading" => {
            if let Some((level, title)) = heading_level_and_title(node, source) {
                out.push(Node::heading(level, title, Vec::new()));
            }
        },
        "paragraph" => out.push(Node::paragraph(paragraph_text(node, source))),
        "fenced_code_block" => out.push(Node::code(fenced_code_content(node, source))),
        "indented_code_block" => out.push(Node::code(node_text(node, source))),
        "list" => out.push(Node::block(BlockKind::List, list_item_blocks(node, source))),
        "block_quote" => out.push(Node::block(BlockKind::Blockquote, convert_children(node, source))),
        "pipe_table" => out.push(Node::block(BlockKind::Table, table_rows(node, source))),
        "html_block" => out.push(Node::text(node_text(node, source).trim_end())),
        _ => {},
    }
}

/// A section with a heading becomes that heading holding the rest of the
/// section; a section without one is flattened into `out`.
fn convert_section(section: TsNode<'_>, source: &str, out: &mut Vec<Node>) {
    let mut cursor = section.walk();
    let children: Vec<TsNode<'_>> = section.named_children(&mut cursor).collect();

    let heading = children
        .first()
        .and_then(|first| return heading_level_and_title(*first, source));

    let Some((level, title)) = heading else {
        for child in children {
            convert_into(child, source, out);
        }
        return;
    };

    let mut content = Vec::new();
    for child in children.into_iter().skip(1) {
        convert_into(child, source, &mut content);
    }
    out.push(Node::heading(level, title, content));
}

/// Level and title of an ATX or setext heading; `None` for anything else.
fn heading_level_and_title(node: TsNode<'_>, source: &str) -> Option<(HeadingLevel, String)> {
    let mut cursor = node.walk();
    let children: Vec<TsNode<'_>> = node.children(&mut cursor).collect();

    let depth = match node.kind() {
        "atx_heading" => children.iter().find_map(|c| return atx_marker_depth(c.kind()))?,
        "setext_heading" => {
            if children.iter().any(|c| return c.kind() == "setext_h1_underline") {
                1
            } else {
                2
            }
        },
        _ => return None,
    };
    let level = HeadingLevel::from_depth(depth)?;

    let title = children
        .iter()
        .find(|c| return c.kind() == "inline" || c.kind() == "heading_content" || c.kind() == "paragraph")
        .map_or_else(
            || return node_text(node, source).trim_start_matches('#').trim().to_string(),
            |c| return node_text(*c, source).trim().to_string(),
        );

    return Some((level, title));
}

/// `atx_h3_marker` -> 3.
fn atx_marker_depth(kind: &str) -> Option<u8> {
    let digit = kind.strip_prefix("atx_h")?.strip_suffix("_marker")?;
    return digit.parse().ok();
}

/// Paragraph text, preferring the `inline` child so block continuation
/// markers are left out.
fn paragraph_text(node: TsNode<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    let inline = node
        .named_children(&mut cursor)
        .find(|c| return c.kind() == "inline");
    let text = match inline {
        Some(child) => node_text(child, source),
        None => node_text(node, source),
    };
    return text.trim().to_string();
}

/// Body of a fenced code block without fences or info string.
fn fenced_code_content(node: TsNode<'_>, source: &str) -> String {
    let mut cursor = node.walk();
    let content = node
        .named_children(&mut cursor)
        .find(|c| return c.kind() == "code_fence_content");
    return content
        .map(|c| return node_text(c, source).trim_end_matches('\n').to_string())
        .unwrap_or_default();
}

/// Blocks of every list item, flattened in order.
fn list_item_blocks(list: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut cursor = list.walk();
    for item in list.named_children(&mut cursor) {
        if item.kind() == "list_item" {
            blocks.extend(convert_children(item, source));
        }
    }
    return blocks;
}

/// One text leaf per table row, cells joined with ` | `. The delimiter row
/// is dropped.
fn table_rows(table: TsNode<'_>, source: &str) -> Vec<Node> {
    let mut rows = Vec::new();
    let mut cursor = table.walk();
    for row in table.named_children(&mut cursor) {
        if row.kind() != "pipe_table_header" && row.kind() != "pipe_table_row" {
            continue;
        }
        let mut cell_cursor = row.walk();
        let cells: Vec<String> = row
            .named_children(&mut cell_cursor)
            .filter(|c| return c.kind() == "pipe_table_cell")
            .map(|c| return node_text(c, source).trim().to_string())
            .collect();
        rows.push(Node::text(cells.join(" | ")));
    }
    return rows;
}

/// Source text covered by a node; empty if the range is not valid UTF-8.
fn node_text<'s>(node: TsNode<'_>, source: &'s str) -> &'s str {
    return node.utf8_text(source.as_bytes()).unwrap_or_default();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::known_selectors;

    fn parse(source: &str) -> Node {
        return parse_markdown(Path::new("test.md"), source).unwrap();
    }

    #[test]
    fn atx_marker_depths() {
        assert_eq!(atx_marker_depth("atx_h1_marker"), Some(1));
        assert_eq!(atx_marker_depth("atx_h6_marker"), Some(6));
        assert_eq!(atx_marker_depth("setext_h1_underline"), None);
    }

    #[test]
    fn headings_nest_by_level() {
        let tree = parse("# Title\n\nIntro.\n\n## Install\n\nRun it.\n\n## Usage\n\nUse it.\n");
        let title = &tree.children()[0];
        assert_eq!(title.heading_level(), Some(HeadingLevel::H1));
        assert_eq!(title.children()[0], Node::text("Title"));
        let h2s: Vec<&Node> = title
            .children()
            .iter()
            .filter(|c| c.heading_level() == Some(HeadingLevel::H2))
            .collect();
        assert_eq!(h2s.len(), 2);
        assert_eq!(h2s[1].children()[0], Node::text("Usage"));
    }

    #[test]
    fn content_before_first_heading_stays_at_root() {
        let tree = parse("Preamble.\n\n## Later\n");
        assert_eq!(tree.children()[0], Node::paragraph("Preamble."));
        assert_eq!(tree.children()[1].heading_level(), Some(HeadingLevel::H2));
    }

    #[test]
    fn fenced_code_body() {
        let tree = parse("## Build\n\n```sh\ncargo build\n```\n");
        let heading = &tree.children()[0];
        assert!(heading.children().contains(&Node::code("cargo build")));
    }

    #[test]
    fn list_and_quote_blocks() {
        let tree = parse("- one\n- two\n\n> quoted\n");
        let selectors = known_selectors(&tree);
        assert!(selectors.contains(&"block:list[0]".to_string()));
        assert!(selectors.contains(&"block:list[0]/block:paragraph[1]".to_string()));
        assert!(selectors.contains(&"block:blockquote[0]".to_string()));
    }

    #[test]
    fn rejects_oversized_source() {
        let big = "a".repeat(usize::try_from(MAX_FILE_SIZE).unwrap() + 1);
        let err = parse_markdown(Path::new("big.md"), &big).unwrap_err();
        assert!(matches!(err, Error::FileTooLarge { .. }));
    }
}
