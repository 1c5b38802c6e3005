//! Resolution across a namespaced collection of documents.
//!
//! A namespaced selector goes to exactly one document. An unscoped one fans
//! out to every document in order and succeeds if any of them matches.
use tracing::debug;

use crate::ast::SelectorAst;
use crate::resolver::{
    NotFoundCause, ResolutionError, ResolutionErrorKind, ResolutionResult, ResolveOptions, resolve_single,
};
use crate::suggest::{Suggestion, SuggestionReason, suggest};
use crate::tree::{Node, known_selectors};

/// One document: its namespace, its tree, and the selectors it can answer.
#[derive(Debug, Clone)]
pub struct Document {
    /// Suggestion pool, normally `known_selectors(&tree)`.
    pub known_selectors: Vec<String>,
    /// Identifier used before `::`.
    pub namespace: String,
    /// Parsed content.
    pub tree: Node,
}

impl Document {
    /// Wrap a tree, deriving its suggestion pool from its content.
    pub fn new(namespace: impl Into<String>, tree: Node) -> Self {
        let known_selectors = known_selectors(&tree);
        return Self {
            known_selectors,
            namespace: namespace.into(),
            tree,
        };
    }
}

/// Resolve `ast` across `documents`. Results come back in document order.
///
/// # Errors
///
/// With a namespace: `NamespaceNotFound` when no document carries it (with
/// the closest namespaces as suggestions), otherwise whatever the single
/// document resolution returns. Without one: `SelectorNotFound` only when
/// every document fails, with suggestions from all documents' pools.
pub fn resolve_multi<'a>(
    documents: &'a [Document],
    ast: &SelectorAst,
    options: &ResolveOptions,
) -> Result<Vec<ResolutionResult<'a>>, ResolutionError> {
    return match ast.namespace.as_deref() {
        Some(namespace) => resolve_namespaced(documents, namespace, ast, options).map(|r| return vec![r]),
        None => resolve_fan_out(documents, ast, options),
    };
}

/// Delegate to the single document named `namespace`.
fn resolve_namespaced<'a>(
    documents: &'a [Document],
    namespace: &str,
    ast: &SelectorAst,
    options: &ResolveOptions,
) -> Result<ResolutionResult<'a>, ResolutionError> {
    let Some(document) = documents.iter().find(|d| return d.namespace == namespace) else {
        let available: Vec<&str> = documents.iter().map(|d| return d.namespace.as_str()).collect();
        debug!(namespace, documents = documents.len(), "namespace not found");
        return Err(ResolutionError {
            kind: ResolutionErrorKind::NamespaceNotFound {
                namespace: namespace.to_string(),
            },
            message: if available.is_empty() {
                format!("namespace `{namespace}` not found; no documents are loaded")
            } else {
                format!("namespace `{namespace}` not found; available: {}", available.join(", "))
            },
            partial_results: Vec::new(),
            segment: None,
            selector: ast.to_string(),
            suggestions: suggest(namespace, &available, &options.suggestions),
        });
    };

    return resolve_single(&document.tree, &document.namespace, ast, &document.known_selectors, options);
}

/// Try every document; fail only if all of them fail.
fn resolve_fan_out<'a>(
    documents: &'a [Document],
    ast: &SelectorAst,
    options: &ResolveOptions,
) -> Result<Vec<ResolutionResult<'a>>, ResolutionError> {
    let selector = ast.to_string();
    if documents.is_empty() {
        return Err(ResolutionError {
            kind: ResolutionErrorKind::SelectorNotFound {
                cause: NotFoundCause::NoDocuments,
            },
            message: format!("`{selector}` cannot match: no documents are loaded"),
            partial_results: Vec::new(),
            segment: None,
            selector,
            suggestions: Vec::new(),
        });
    }

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for document in documents {
        match resolve_single(&document.tree, &document.namespace, ast, &document.known_selectors, options) {
            Ok(result) => results.push(result),
            Err(e) => failures.push((document.namespace.as_str(), e)),
        }
    }

    debug!(%selector, matched = results.len(), failed = failures.len(), "fan-out finished");
    if !results.is_empty() {
        return Ok(results);
    }

    return Err(merge_failures(documents, ast, &selector, failures, options));
}

/// One `SelectorNotFound` summarizing every per-document failure.
fn merge_failures(
    documents: &[Document],
    ast: &SelectorAst,
    selector: &str,
    failures: Vec<(&str, ResolutionError)>,
    options: &ResolveOptions,
) -> ResolutionError {
    let cause = shared_cause(&failures).unwrap_or(NotFoundCause::NoMatch);
    let reasons: Vec<String> = failures
        .iter()
        .map(|(namespace, e)| return format!("{namespace}: {}", e.message))
        .collect();

    let mut suggestions: Vec<Suggestion> = Vec::new();
    let mut partial_results = Vec::new();
    for (_, failure) in failures {
        partial_results.extend(failure.partial_results);
        for s in failure.suggestions {
            let is_new = !suggestions.iter().any(|have| return have.selector == s.selector);
            if s.reason == SuggestionReason::IndexAdjustment && is_new {
                suggestions.push(s);
            }
        }
    }

    let pool: Vec<&str> = documents
        .iter()
        .flat_map(|d| return d.known_selectors.iter().map(String::as_str))
        .collect();
    for s in suggest(&ast.explicit_path(), &pool, &options.suggestions) {
        if !suggestions.iter().any(|have| return have.selector == s.selector) {
            suggestions.push(s);
        }
    }
    suggestions.truncate(options.suggestions.max_results);

    return ResolutionError {
        kind: ResolutionErrorKind::SelectorNotFound { cause },
        message: format!(
            "`{selector}` did not match in any of {} documents ({})",
            documents.len(),
            reasons.join("; ")
        ),
        partial_results,
        segment: None,
        selector: selector.to_string(),
        suggestions,
    };
}

/// The not-found cause every document agrees on, if there is one.
fn shared_cause(failures: &[(&str, ResolutionError)]) -> Option<NotFoundCause> {
    let mut causes = failures.iter().map(|(_, e)| {
        return match e.kind {
            ResolutionErrorKind::SelectorNotFound { cause } => Some(cause),
            _ => None,
        };
    });
    let first = causes.next()??;
    return causes.all(|c| return c == Some(first)).then_some(first);
}
