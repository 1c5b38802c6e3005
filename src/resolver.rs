//! Single-document resolution: match selector segments against a tree.
//!
//! Each segment selects among the current node's children by kind and
//! ordinal. Failures are values, not panics: every error carries the prefix
//! that did resolve and ranked suggestions.
use tracing::{debug, trace};

use crate::ast::{PathSegment, SegmentKind, SelectorAst, join_segments};
use crate::suggest::{SuggestOptions, Suggestion, suggest};
use crate::token::Position;
use crate::tree::Node;

/// Segments processed before a walk is abandoned.
pub const DEFAULT_DEPTH_LIMIT: usize = 20;

/// Tuning for resolution. Missing TOML keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Maximum number of segments walked.
    pub depth_limit: usize,
    /// Ranking of suggestions attached to failures.
    pub suggestions: SuggestOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        return Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            suggestions: SuggestOptions::default(),
        };
    }
}

/// A matched node and what a caller needs to present it.
#[derive(Debug, Clone)]
pub struct ResolutionResult<'a> {
    /// Whether the node has descendants.
    pub has_children: bool,
    /// Canonical selector with every index written out, namespaced when the
    /// document has a namespace.
    pub matched_selector: String,
    /// Namespace of the document the node lives in.
    pub namespace: String,
    /// The matched node.
    pub node: &'a Node,
    /// One node per selector segment, first to last.
    pub path: Vec<&'a Node>,
    /// Approximate words under the node.
    pub word_count: usize,
}

/// Why nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundCause {
    /// The selector has more segments than the depth limit allows.
    DepthExceeded {
        /// The limit in force.
        limit: usize,
    },
    /// No documents were supplied.
    NoDocuments,
    /// No child of the current node has the segment's kind.
    NoMatch,
    /// The segment type has no counterpart in the tree (`page`).
    Unsupported,
}

/// The four ways resolution fails.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionErrorKind {
    /// Matches exist but fewer than the requested index.
    IndexOutOfRange {
        /// How many siblings matched.
        available: usize,
        /// The index that was asked for.
        requested: usize,
    },
    /// The path is structurally impossible, e.g. `root` mid-path.
    InvalidPath,
    /// No document carries the requested namespace.
    NamespaceNotFound {
        /// The namespace that was asked for.
        namespace: String,
    },
    /// Nothing matched.
    SelectorNotFound {
        /// Why.
        cause: NotFoundCause,
    },
}

impl ResolutionErrorKind {
    /// Stable machine-readable code.
    pub const fn code(&self) -> &'static str {
        return match self {
            ResolutionErrorKind::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            ResolutionErrorKind::InvalidPath => "INVALID_PATH",
            ResolutionErrorKind::NamespaceNotFound { .. } => "NAMESPACE_NOT_FOUND",
            ResolutionErrorKind::SelectorNotFound { .. } => "SELECTOR_NOT_FOUND",
        };
    }
}

/// The segment a walk stopped at.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedSegment {
    /// Zero-based position in the path.
    pub index: usize,
    /// Where the segment was written.
    pub position: Position,
    /// The segment as written.
    pub segment: String,
}

/// A selector that parsed but did not resolve.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
#[error("{message}")]
pub struct ResolutionError {
    /// What failed.
    #[serde(flatten)]
    pub kind: ResolutionErrorKind,
    /// Self-contained explanation.
    pub message: String,
    /// Every prefix of the path that did resolve, shortest first.
    pub partial_results: Vec<String>,
    /// The failing segment, when the failure is tied to one.
    pub segment: Option<FailedSegment>,
    /// The selector as parsed.
    pub selector: String,
    /// Ranked corrections.
    pub suggestions: Vec<Suggestion>,
}

/// Resolve `ast` against one document.
///
/// A namespace on the selector must equal `namespace`. Segments are matched
/// left to right; a missing index selects the first match.
///
/// # Errors
///
/// Returns `ResolutionError` with kind `NamespaceNotFound` for a foreign
/// namespace, `InvalidPath` for `root` anywhere but first, `IndexOutOfRange`
/// when the index exceeds the matching siblings, and `SelectorNotFound`
/// when nothing matches, the segment type is unsupported, or the path is
/// longer than `options.depth_limit`.
pub fn resolve_single<'a>(
    tree: &'a Node,
    namespace: &str,
    ast: &SelectorAst,
    known_selectors: &[String],
    options: &ResolveOptions,
) -> Result<ResolutionResult<'a>, ResolutionError> {
    let selector = ast.to_string();
    debug!(%selector, namespace, "resolving in document");

    if let Some(wanted) = ast.namespace.as_deref() {
        if wanted != namespace {
            return Err(foreign_namespace(wanted, namespace, &selector, known_selectors, &options.suggestions));
        }
    }

    let mut walk = Walk {
        ast,
        current: tree,
        known_selectors,
        namespace,
        options,
        path: Vec::with_capacity(ast.segments.len()),
        resolved: Vec::with_capacity(ast.segments.len()),
        selector,
    };

    if ast.segments.is_empty() {
        return Err(walk.fail(ResolutionErrorKind::InvalidPath, "selector has no segments".to_string(), None, None));
    }

    for (at, segment) in ast.segments.iter().enumerate() {
        walk.step(tree, at, segment)?;
    }

    return Ok(walk.finish());
}

/// Prefix `path` with `namespace::` unless the namespace is empty.
pub fn qualify(namespace: &str, path: &str) -> String {
    if namespace.is_empty() {
        return path.to_string();
    }
    return format!("{namespace}::{path}");
}

/// Error for a selector scoped to some other document.
fn foreign_namespace(
    wanted: &str,
    namespace: &str,
    selector: &str,
    known_selectors: &[String],
    options: &SuggestOptions,
) -> ResolutionError {
    let mut candidates: Vec<&str> = known_selectors
        .iter()
        .filter_map(|s| return s.split_once("::").map(|(ns, _)| return ns))
        .collect();
    candidates.push(namespace);

    debug!(wanted, namespace, "namespace mismatch");
    return ResolutionError {
        kind: ResolutionErrorKind::NamespaceNotFound {
            namespace: wanted.to_string(),
        },
        message: format!("namespace `{wanted}` not found; this document is `{namespace}`"),
        partial_results: Vec::new(),
        segment: None,
        selector: selector.to_string(),
        suggestions: suggest(wanted, &candidates, options),
    };
}

/// State of one walk.
struct Walk<'a, 'q> {
    /// The selector being resolved.
    ast: &'q SelectorAst,
    /// Node the next segment searches under.
    current: &'a Node,
    /// Suggestion pool for this document.
    known_selectors: &'q [String],
    /// Namespace of this document.
    namespace: &'q str,
    /// Limits and suggestion tuning.
    options: &'q ResolveOptions,
    /// Matched nodes so far.
    path: Vec<&'a Node>,
    /// Matched segments so far, with explicit indices.
    resolved: Vec<PathSegment>,
    /// Canonical selector text for error reports.
    selector: String,
}

impl<'a> Walk<'a, '_> {
    /// Build a failure at segment `at` (or none), attaching partial results
    /// and suggestions ranked against the explicit-index path.
    fn fail(
        &self,
        kind: ResolutionErrorKind,
        message: String,
        at: Option<usize>,
        adjustment: Option<Suggestion>,
    ) -> ResolutionError {
        let query = self.ast.explicit_path();
        let mut suggestions: Vec<Suggestion> = adjustment.into_iter().collect();
        for candidate in suggest(&query, self.known_selectors, &self.options.suggestions) {
            if !suggestions.iter().any(|s| return s.selector == candidate.selector) {
                suggestions.push(candidate);
            }
        }
        suggestions.truncate(self.options.suggestions.max_results);
        // A scoped selector stays scoped when retried with a suggestion.
        if self.ast.namespace.is_some() {
            for s in &mut suggestions {
                s.selector = qualify(self.namespace, &s.selector);
            }
        }

        let partial_results = (1..=self.resolved.len())
            .filter_map(|n| return self.resolved.get(..n))
            .map(|prefix| return qualify(self.namespace, &join_segments(prefix.iter().copied())))
            .collect();

        let segment = at.and_then(|i| {
            return self.ast.segments.get(i).map(|s| {
                return FailedSegment {
                    index: i,
                    position: s.position,
                    segment: s.to_string(),
                };
            });
        });

        debug!(code = kind.code(), %message, "resolution failed");
        return ResolutionError {
            kind,
            message,
            partial_results,
            segment,
            selector: self.selector.clone(),
            suggestions,
        };
    }

    /// The successful result once every segment matched.
    fn finish(self) -> ResolutionResult<'a> {
        let node = self.current;
        return ResolutionResult {
            has_children: node.has_children(),
            matched_selector: qualify(self.namespace, &join_segments(self.resolved.iter().copied())),
            namespace: self.namespace.to_string(),
            node,
            path: self.path,
            word_count: node.word_count(),
        };
    }

    /// Where the walk currently stands, for messages.
    fn location(&self) -> String {
        if self.resolved.is_empty() {
            return "the document root".to_string();
        }
        return format!("`{}`", join_segments(self.resolved.iter().copied()));
    }

    /// Match one segment and advance.
    fn step(&mut self, tree: &'a Node, at: usize, segment: &PathSegment) -> Result<(), ResolutionError> {
        if at >= self.options.depth_limit {
            let limit = self.options.depth_limit;
            return Err(self.fail(
                ResolutionErrorKind::SelectorNotFound {
                    cause: NotFoundCause::DepthExceeded { limit },
                },
                format!("selector exceeds the depth limit of {limit} segments"),
                Some(at),
                None,
            ));
        }

        trace!(at, segment = %segment, "matching segment");
        let requested = segment.effective_index();

        let candidates: Vec<&'a Node> = match segment.kind {
            SegmentKind::Root => {
                if at != 0 {
                    return Err(self.fail(
                        ResolutionErrorKind::InvalidPath,
                        "`root` can only be the first segment of a path".to_string(),
                        Some(at),
                        None,
                    ));
                }
                if !matches!(tree, Node::Root { .. }) {
                    return Err(self.fail(
                        ResolutionErrorKind::InvalidPath,
                        format!("`root` requires a document root, found a {} node", tree.type_name()),
                        Some(at),
                        None,
                    ));
                }
                vec![tree]
            },
            SegmentKind::Page => {
                return Err(self.fail(
                    ResolutionErrorKind::SelectorNotFound {
                        cause: NotFoundCause::Unsupported,
                    },
                    "`page` segments are not addressable: pages have no counterpart in the document tree"
                        .to_string(),
                    Some(at),
                    None,
                ));
            },
            kind => self.current.children().iter().filter(|c| return c.matches(kind)).collect(),
        };

        // An explicit index into nothing is still an index error.
        if candidates.is_empty() && segment.index.is_none() {
            return Err(self.fail(
                ResolutionErrorKind::SelectorNotFound {
                    cause: NotFoundCause::NoMatch,
                },
                format!("no `{}` found under {}", segment.kind, self.location()),
                Some(at),
                None,
            ));
        }

        let Some(next) = candidates.get(requested).copied() else {
            let available = candidates.len();
            let adjustment = (available > 0).then(|| {
                let selector = self.adjusted_selector(at, available.saturating_sub(1));
                return Suggestion::index_adjustment(&self.ast.explicit_path(), selector);
            });
            let valid = if available == 0 {
                "none exist".to_string()
            } else {
                format!("valid indices are 0..={}", available.saturating_sub(1))
            };
            return Err(self.fail(
                ResolutionErrorKind::IndexOutOfRange { available, requested },
                format!(
                    "index {requested} is out of range for `{}` under {}: {available} found, {valid}",
                    segment.kind,
                    self.location(),
                ),
                Some(at),
                adjustment,
            ));
        };

        self.current = next;
        self.path.push(next);
        self.resolved.push(segment.explicit());
        return Ok(());
    }

    /// The selector with segment `at` moved to `index`, everything else explicit.
    fn adjusted_selector(&self, at: usize, index: usize) -> String {
        let segments = self.ast.segments.iter().enumerate().map(|(i, s)| {
            if i == at {
                return s.with_index(index).explicit();
            }
            return s.explicit();
        });
        return join_segments(segments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockKind, HeadingLevel};
    use crate::parser::parse;
    use crate::suggest::SuggestionReason;
    use crate::tree::known_selectors;

    fn doc() -> Node {
        return Node::root(vec![
            Node::heading(HeadingLevel::H2, "First", vec![Node::paragraph("alpha beta")]),
            Node::heading(HeadingLevel::H2, "Second", vec![
                Node::paragraph("gamma"),
                Node::code("fn main() {}"),
            ]),
        ]);
    }

    fn run<'a>(tree: &'a Node, selector: &str) -> Result<ResolutionResult<'a>, ResolutionError> {
        let ast = parse(selector).unwrap();
        let known = known_selectors(tree);
        return resolve_single(tree, "doc", &ast, &known, &ResolveOptions::default());
    }

    #[test]
    fn resolves_nested_code_block() {
        let tree = doc();
        let result = run(&tree, "doc::heading:h2[1]/block:code[0]").unwrap();
        assert_eq!(result.node.block_kind(), Some(BlockKind::Code));
        assert_eq!(result.matched_selector, "doc::heading:h2[1]/block:code[0]");
        assert_eq!(result.namespace, "doc");
        assert_eq!(result.path.len(), 2);
        assert_eq!(result.word_count, 3);
        assert!(result.has_children);
    }

    #[test]
    fn missing_index_means_first() {
        let tree = doc();
        let result = run(&tree, "heading:h2/block:paragraph").unwrap();
        assert_eq!(result.matched_selector, "doc::heading:h2[0]/block:paragraph[0]");
        assert_eq!(result.node, &Node::paragraph("alpha beta"));
    }

    #[test]
    fn root_resolves_to_tree() {
        let tree = doc();
        let result = run(&tree, "root").unwrap();
        assert!(std::ptr::eq(result.node, &tree));
        assert_eq!(result.matched_selector, "doc::root");
        let result = run(&tree, "root/heading:h2[1]").unwrap();
        assert_eq!(result.path.len(), 2);
        assert_eq!(result.matched_selector, "doc::root/heading:h2[1]");
    }

    #[test]
    fn index_out_of_range_reports_counts() {
        let tree = doc();
        let err = run(&tree, "doc::heading:h2[1]/block:code[2]").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::IndexOutOfRange { available: 1, requested: 2 });
        assert!(err.message.contains('2'));
        assert!(err.message.contains("1 found"));
        assert_eq!(err.partial_results, vec!["doc::heading:h2[1]"]);
        assert_eq!(err.segment.as_ref().map(|s| s.index), Some(1));
        assert_eq!(err.suggestions[0].reason, SuggestionReason::IndexAdjustment);
        assert_eq!(err.suggestions[0].selector, "doc::heading:h2[1]/block:code[0]");
    }

    #[test]
    fn suggestions_follow_selector_scope() {
        let tree = doc();
        let scoped = run(&tree, "doc::heading:h3").unwrap_err();
        assert!(!scoped.suggestions.is_empty());
        assert!(scoped.suggestions.iter().all(|s| s.selector.starts_with("doc::")));
        assert!(scoped.suggestions.iter().any(|s| s.selector == "doc::heading:h2[0]"));

        let unscoped = run(&tree, "heading:h3").unwrap_err();
        assert!(unscoped.suggestions.iter().all(|s| !s.selector.contains("::")));
    }

    #[test]
    fn no_match_is_selector_not_found() {
        let tree = doc();
        let err = run(&tree, "heading:h3").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::SelectorNotFound { cause: NotFoundCause::NoMatch });
        assert!(err.partial_results.is_empty());
        assert!(err.suggestions.iter().any(|s| s.selector == "heading:h2[0]"));
    }

    #[test]
    fn foreign_namespace_suggests_own() {
        let tree = doc();
        let err = run(&tree, "docs::root").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::NamespaceNotFound { namespace: "docs".to_string() });
        assert_eq!(err.suggestions[0].selector, "doc");
    }

    #[test]
    fn root_mid_path_is_invalid() {
        let tree = doc();
        let err = run(&tree, "heading:h2/root").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::InvalidPath);
        assert_eq!(err.partial_results, vec!["doc::heading:h2[0]"]);
    }

    #[test]
    fn root_index_beyond_zero() {
        let tree = doc();
        let err = run(&tree, "root[1]").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::IndexOutOfRange { available: 1, requested: 1 });
    }

    #[test]
    fn section_matches_any_heading() {
        let tree = Node::root(vec![
            Node::heading(HeadingLevel::H1, "a", vec![]),
            Node::paragraph("p"),
            Node::heading(HeadingLevel::H3, "b", vec![]),
        ]);
        let result = run(&tree, "section[1]").unwrap();
        assert_eq!(result.node.heading_level(), Some(HeadingLevel::H3));
        assert_eq!(result.matched_selector, "doc::section[1]");
    }

    #[test]
    fn page_is_unsupported() {
        let tree = doc();
        let err = run(&tree, "page[0]").unwrap_err();
        assert_eq!(err.kind, ResolutionErrorKind::SelectorNotFound { cause: NotFoundCause::Unsupported });
    }

    #[test]
    fn depth_limit_stops_long_paths() {
        let mut node = Node::paragraph("deep");
        for _ in 0..25 {
            node = Node::block(BlockKind::Blockquote, vec![node]);
        }
        let tree = Node::root(vec![node]);
        let selector = vec!["block:blockquote"; 25].join("/");
        let err = run(&tree, &selector).unwrap_err();
        assert_eq!(
            err.kind,
            ResolutionErrorKind::SelectorNotFound { cause: NotFoundCause::DepthExceeded { limit: 20 } }
        );
        assert_eq!(err.partial_results.len(), 20);
        assert_eq!(err.segment.map(|s| s.index), Some(20));

        let within = vec!["block:blockquote"; 20].join("/");
        assert!(run(&tree, &within).is_ok());
    }

    #[test]
    fn custom_depth_limit() {
        let tree = doc();
        let ast = parse("heading:h2/block:paragraph").unwrap();
        let options = ResolveOptions { depth_limit: 1, ..ResolveOptions::default() };
        let err = resolve_single(&tree, "doc", &ast, &[], &options).unwrap_err();
        assert_eq!(err.kind.code(), "SELECTOR_NOT_FOUND");
    }

    #[test]
    fn ordinal_indexing_ignores_text() {
        let tree = Node::root(vec![
            Node::heading(HeadingLevel::H2, "Same", vec![Node::paragraph("one")]),
            Node::heading(HeadingLevel::H2, "Same", vec![Node::paragraph("two")]),
            Node::heading(HeadingLevel::H2, "Same", vec![Node::paragraph("three")]),
        ]);
        for (k, expected) in ["one", "two", "three"].into_iter().enumerate() {
            let result = run(&tree, &format!("heading:h2[{k}]/block:paragraph")).unwrap();
            assert_eq!(result.node, &Node::paragraph(expected));
        }
    }

    #[test]
    fn empty_namespace_leaves_selector_bare() {
        let tree = doc();
        let ast = parse("heading:h2").unwrap();
        let result = resolve_single(&tree, "", &ast, &[], &ResolveOptions::default()).unwrap();
        assert_eq!(result.matched_selector, "heading:h2[0]");
    }

    #[test]
    fn error_serializes_with_code() {
        let tree = doc();
        let err = run(&tree, "heading:h2[7]").unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INDEX_OUT_OF_RANGE");
        assert_eq!(json["requested"], 7);
        assert_eq!(json["available"], 2);
    }
}
