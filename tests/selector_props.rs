use mdpath::lexer::{tokenize, tokenize_lossy};
use mdpath::parser::parse;
use mdpath::token::TokenKind;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    let kind = prop_oneof![
        (1u8..=6).prop_map(|d| format!("heading:h{d}")),
        prop::sample::select(vec!["paragraph", "list", "code", "table", "blockquote"])
            .prop_map(|k| format!("block:{k}")),
        Just("section".to_string()),
        Just("page".to_string()),
    ];
    return (kind, prop::option::of(0usize..500)).prop_map(|(kind, index)| match index {
        Some(i) => format!("{kind}[{i}]"),
        None => kind,
    });
}

fn selector() -> impl Strategy<Value = String> {
    let namespace = prop::option::of("[a-z][a-z0-9_-]{0,8}");
    let path = prop::collection::vec(segment(), 1..6).prop_map(|s| s.join("/"));
    let params = prop::option::of(prop::collection::vec(("[a-z]{1,6}", "[a-z0-9]{0,6}"), 1..4));
    return (namespace, any::<bool>(), path, params).prop_map(|(ns, rooted, path, params)| {
        let mut out = String::new();
        if let Some(ns) = ns {
            out.push_str(&ns);
            out.push_str("::");
        }
        if rooted {
            out.push_str("root/");
        }
        out.push_str(&path);
        if let Some(params) = params {
            let joined: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            out.push('?');
            out.push_str(&joined.join("&"));
        }
        out
    });
}

proptest! {
    #[test]
    fn canonical_form_reparses_identically(input in selector()) {
        let ast = parse(&input).unwrap();
        let printed = ast.to_string();
        let reparsed = parse(&printed).unwrap();
        prop_assert_eq!(&ast, &reparsed);
        prop_assert_eq!(reparsed.to_string(), printed);
    }

    #[test]
    fn token_stream_ends_exactly_once(input in "\\PC{0,40}") {
        if let Ok(tokens) = tokenize(&input) {
            let ends = tokens.iter().filter(|t| t.kind == TokenKind::EndOfInput).count();
            prop_assert_eq!(ends, 1);
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
        }
        let lossy = tokenize_lossy(&input);
        prop_assert_eq!(lossy.iter().filter(|t| t.kind == TokenKind::EndOfInput).count(), 1);
    }
}
