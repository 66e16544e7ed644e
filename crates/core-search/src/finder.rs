//! Match finder.

use crate::pattern::{SearchOptions, build_pattern};
use serde::Serialize;
use tracing::trace;

/// One located occurrence. `index` and `length` are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub index: usize,
    pub text: String,
    pub length: usize,
}

impl SearchMatch {
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Ascending `index` order; navigation depends on it.
    pub matches: Vec<SearchMatch>,
    /// The user regex was malformed and a literal search ran instead.
    pub pattern_fallback: bool,
}

/// Find every match of `term` in `document`.
///
/// A blank term yields an empty result. Zero-length matches are reported;
/// the iterator steps past them so scanning always terminates.
pub fn find_matches(document: &str, term: &str, options: &SearchOptions) -> SearchResult {
    if term.trim().is_empty() {
        return SearchResult::default();
    }
    let Some(pattern) = build_pattern(term, options) else {
        return SearchResult::default();
    };
    let matches: Vec<SearchMatch> = pattern
        .regex
        .find_iter(document)
        .map(|m| SearchMatch {
            index: m.start(),
            text: m.as_str().to_string(),
            length: m.len(),
        })
        .collect();
    trace!(target: "search.find", count = matches.len(), fallback = pattern.fallback, "matches_found");
    SearchResult {
        matches,
        pattern_fallback: pattern.fallback,
    }
}
