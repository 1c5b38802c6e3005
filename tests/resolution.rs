use mdpath::ast::{BlockKind, HeadingLevel};
use mdpath::levenshtein::levenshtein;
use mdpath::parser::{ParseErrorKind, parse};
use mdpath::resolver::{NotFoundCause, ResolutionErrorKind, ResolveOptions, resolve_single};
use mdpath::suggest::{SuggestOptions, SuggestionReason, suggest};
use mdpath::tree::{Node, known_selectors};
use mdpath::{Document, resolve_multi};
use rstest::rstest;

fn two_sections() -> Node {
    return Node::root(vec![
        Node::heading(HeadingLevel::H2, "Overview", vec![Node::paragraph("What this is.")]),
        Node::heading(HeadingLevel::H2, "Build", vec![Node::code("cargo build --release")]),
    ]);
}

#[test]
fn second_section_code_block() {
    let docs = vec![Document::new("doc", two_sections())];
    let ast = parse("doc::heading:h2[1]/block:code[0]").unwrap();
    let results = resolve_multi(&docs, &ast, &ResolveOptions::default()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].node.block_kind(), Some(BlockKind::Code));
    assert_eq!(results[0].node.children(), &[Node::text("cargo build --release")]);

    let ast = parse("doc::heading:h2[1]/block:code[2]").unwrap();
    let err = resolve_multi(&docs, &ast, &ResolveOptions::default()).unwrap_err();
    assert_eq!(err.kind, ResolutionErrorKind::IndexOutOfRange { available: 1, requested: 2 });
    assert!(err.message.contains("index 2"));
    assert!(err.message.contains("1 found"));
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(7)]
#[case(32)]
fn sibling_count_boundary(#[case] n: usize) {
    let tree = Node::root((0..n).map(|i| Node::paragraph(format!("p{i}"))).collect());
    let known = known_selectors(&tree);
    let options = ResolveOptions::default();

    let at_n = parse(&format!("block:paragraph[{n}]")).unwrap();
    let err = resolve_single(&tree, "doc", &at_n, &known, &options).unwrap_err();
    assert_eq!(err.kind, ResolutionErrorKind::IndexOutOfRange { available: n, requested: n });

    if let Some(last) = n.checked_sub(1) {
        let at_last = parse(&format!("block:paragraph[{last}]")).unwrap();
        let result = resolve_single(&tree, "doc", &at_last, &known, &options).unwrap();
        assert_eq!(result.node, &Node::paragraph(format!("p{last}")));
    }
}

#[test]
fn identical_titles_resolve_by_position() {
    let tree = Node::root(
        (0..4)
            .map(|i| Node::heading(HeadingLevel::H2, "Notes", vec![Node::paragraph(format!("body {i}"))]))
            .collect(),
    );
    let known = known_selectors(&tree);
    for k in 0..4 {
        let ast = parse(&format!("heading:h2[{k}]/block:paragraph")).unwrap();
        let result = resolve_single(&tree, "doc", &ast, &known, &ResolveOptions::default()).unwrap();
        assert_eq!(result.node, &Node::paragraph(format!("body {k}")));
    }
}

#[test]
fn thirty_segments_against_shallow_document() {
    let tree = two_sections();
    let selector = vec!["heading:h2"; 30].join("/");
    let ast = parse(&selector).unwrap();
    let err = resolve_single(&tree, "doc", &ast, &known_selectors(&tree), &ResolveOptions::default()).unwrap_err();
    assert!(matches!(err.kind, ResolutionErrorKind::SelectorNotFound { .. }));
}

#[test]
fn thirty_segments_against_deep_document_hits_depth_limit() {
    let mut node = Node::paragraph("bottom");
    for _ in 0..30 {
        node = Node::block(BlockKind::Blockquote, vec![node]);
    }
    let tree = Node::root(vec![node]);
    let ast = parse(&vec!["block:blockquote"; 30].join("/")).unwrap();
    let err = resolve_single(&tree, "doc", &ast, &[], &ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err.kind,
        ResolutionErrorKind::SelectorNotFound { cause: NotFoundCause::DepthExceeded { limit: 20 } }
    );
}

#[rstest]
#[case("heading:h0[0]", ParseErrorKind::InvalidHeadingLevel)]
#[case("heading:h7[0]", ParseErrorKind::InvalidHeadingLevel)]
#[case("block:bogus[0]", ParseErrorKind::InvalidBlockType)]
#[case("", ParseErrorKind::EmptySelector)]
fn subtype_and_empty_errors(#[case] input: &str, #[case] expected: ParseErrorKind) {
    assert_eq!(parse(input).unwrap_err().kind, expected);
}

#[test]
fn exact_match_ranks_first_once() {
    let candidates = ["heading:h2[0]", "heading:h2[1]", "heading:h3[0]", "heading:h2[0]"];
    let ranked = suggest("heading:h2[0]", &candidates, &SuggestOptions::default());
    assert_eq!(ranked[0].reason, SuggestionReason::ExactMatch);
    assert_eq!(ranked[0].distance, 0);
    assert!((ranked[0].ratio - 1.0).abs() < f64::EPSILON);
    assert_eq!(ranked.iter().filter(|s| s.selector == "heading:h2[0]").count(), 1);
}

#[rstest]
#[case("kitten", "sitting", 3)]
#[case("", "abc", 3)]
#[case("abc", "abc", 0)]
fn edit_distances(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
    assert_eq!(levenshtein(a, b), expected);
}
