//! Ranked "did you mean" candidates for malformed or unmatched selectors.
//!
//! Stateless: every call ranks the pool it is given. Pools differ per
//! document set, so nothing is cached across calls.
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::levenshtein::{levenshtein, similarity_ratio};

/// Distances up to this count as typos rather than loose matches.
pub const TYPO_DISTANCE: usize = 2;

/// Why a candidate was suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    /// Equal to the query after case folding and trimming.
    ExactMatch,
    /// Edit distance above `TYPO_DISTANCE` but similar enough.
    FuzzyMatch,
    /// The same path with an index that exists.
    IndexAdjustment,
    /// Within `TYPO_DISTANCE` edits.
    TypoCorrection,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Suggestion {
    /// Edit distance from the normalized query.
    pub distance: usize,
    /// Similarity in `[0, 1]`.
    pub ratio: f64,
    /// How the candidate relates to the query.
    pub reason: SuggestionReason,
    /// The candidate as it appeared in the pool.
    pub selector: String,
}

impl Suggestion {
    /// Score `selector` against `query` and classify it as an index adjustment.
    pub fn index_adjustment(query: &str, selector: String) -> Self {
        let normalized_query = normalize(query);
        let normalized = normalize(&selector);
        let distance = levenshtein(&normalized_query, &normalized);
        return Self {
            distance,
            ratio: similarity_ratio(&normalized_query, &normalized, distance),
            reason: SuggestionReason::IndexAdjustment,
            selector,
        };
    }
}

/// Tuning for `suggest`. Missing TOML keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    /// Emit an exact match first when the pool contains one.
    pub include_exact: bool,
    /// Truncate to this many suggestions.
    pub max_results: usize,
    /// Drop fuzzy candidates below this ratio.
    pub min_ratio: f64,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        return Self {
            include_exact: true,
            max_results: 5,
            min_ratio: 0.4,
        };
    }
}

/// Rank `candidates` against `query`.
///
/// An exact match (after case folding and trimming) comes first with
/// distance 0 and ratio 1.0 when `include_exact` is set, and never appears
/// in the fuzzy pass either way. Remaining candidates are kept when their
/// ratio reaches `min_ratio`, ordered by ratio descending, distance
/// ascending, length ascending, then text, and cut to `max_results`.
/// Duplicate candidates collapse to their first occurrence.
pub fn suggest<S: AsRef<str>>(query: &str, candidates: &[S], options: &SuggestOptions) -> Vec<Suggestion> {
    let normalized_query = normalize(query);
    let mut seen: HashSet<String> = HashSet::new();
    let mut exact = Vec::new();
    let mut fuzzy = Vec::new();

    for candidate in candidates {
        let original = candidate.as_ref().trim();
        let normalized = normalize(original);
        if !seen.insert(normalized.clone()) {
            continue;
        }

        if normalized == normalized_query {
            if options.include_exact {
                exact.push(Suggestion {
                    distance: 0,
                    ratio: 1.0,
                    reason: SuggestionReason::ExactMatch,
                    selector: original.to_string(),
                });
            }
            continue;
        }

        let distance = levenshtein(&normalized_query, &normalized);
        let ratio = similarity_ratio(&normalized_query, &normalized, distance);
        if ratio < options.min_ratio {
            continue;
        }

        let reason = if distance <= TYPO_DISTANCE {
            SuggestionReason::TypoCorrection
        } else {
            SuggestionReason::FuzzyMatch
        };
        fuzzy.push(Suggestion {
            distance,
            ratio,
            reason,
            selector: original.to_string(),
        });
    }

    fuzzy.sort_by(rank);
    exact.append(&mut fuzzy);
    exact.truncate(options.max_results);
    return exact;
}

/// Total order used for ranking; ties never depend on pool order.
pub fn rank(a: &Suggestion, b: &Suggestion) -> Ordering {
    return b
        .ratio
        .total_cmp(&a.ratio)
        .then_with(|| return a.distance.cmp(&b.distance))
        .then_with(|| return a.selector.chars().count().cmp(&b.selector.chars().count()))
        .then_with(|| return a.selector.cmp(&b.selector));
}

/// Case-fold and trim.
fn normalize(s: &str) -> String {
    return s.trim().to_lowercase();
}
