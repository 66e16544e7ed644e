//! Stateful search session.
//!
//! The search UI owns one `SearchEngine`, feeds it the current document
//! whenever the document, the term or the options change, and reads back the
//! match list and cursor. Debouncing those recomputations is the UI's job.
//!
//! `current_match_index` invariant: always `< matches.len()` when there are
//! matches, `0` otherwise. Any recomputation that leaves the old index out of
//! range resets it to `0`.

use crate::finder::{SearchMatch, find_matches};
use crate::pattern::{SearchOptions, build_pattern};
use regex::NoExpand;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Next,
    Prev,
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceResult {
    pub new_document: String,
    pub replacement_count: usize,
    pub success: bool,
}

impl ReplaceResult {
    fn unchanged(document: &str) -> Self {
        Self {
            new_document: document.to_string(),
            replacement_count: 0,
            success: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    search_term: String,
    replace_term: String,
    options: SearchOptions,
    matches: Vec<SearchMatch>,
    current_match_index: usize,
    is_searching: bool,
    pattern_fallback: bool,
}

impl SearchEngine {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn replace_term(&self) -> &str {
        &self.replace_term
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn current_match_index(&self) -> usize {
        self.current_match_index
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.matches.get(self.current_match_index)
    }

    /// True while a non-blank term is active.
    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// The active term is a malformed regex being searched literally.
    pub fn pattern_fallback(&self) -> bool {
        self.pattern_fallback
    }

    pub fn set_search_term(&mut self, term: impl Into<String>, document: &str) {
        self.search_term = term.into();
        self.update(document);
    }

    pub fn set_replace_term(&mut self, term: impl Into<String>) {
        self.replace_term = term.into();
    }

    pub fn set_options(&mut self, options: SearchOptions, document: &str) {
        self.options = options;
        self.update(document);
    }

    /// Recompute matches against `document` and clamp the cursor.
    pub fn update(&mut self, document: &str) {
        let result = find_matches(document, &self.search_term, &self.options);
        self.matches = result.matches;
        self.pattern_fallback = result.pattern_fallback;
        self.is_searching = !self.search_term.trim().is_empty();
        if self.current_match_index >= self.matches.len() {
            self.current_match_index = 0;
        }
        debug!(
            target: "search.engine",
            count = self.matches.len(),
            current = self.current_match_index,
            fallback = self.pattern_fallback,
            "matches_updated"
        );
    }

    /// Drop the session (term, matches, cursor). Options and the replace term are kept.
    pub fn clear(&mut self) {
        self.search_term.clear();
        self.matches.clear();
        self.current_match_index = 0;
        self.is_searching = false;
        self.pattern_fallback = false;
    }

    /// Move the match cursor. `Next`/`Prev` wrap; no-op without matches.
    pub fn navigate(&mut self, direction: NavigateDirection) -> Option<&SearchMatch> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.current_match_index = match direction {
            NavigateDirection::Next => (self.current_match_index + 1) % len,
            NavigateDirection::Prev => (self.current_match_index + len - 1) % len,
            NavigateDirection::First => 0,
            NavigateDirection::Last => len - 1,
        };
        self.matches.get(self.current_match_index)
    }

    /// Display counter for the search bar: `"X of Y"`, `"No results"` or `""` when idle.
    pub fn match_counter(&self) -> String {
        if !self.is_searching {
            return String::new();
        }
        if self.matches.is_empty() {
            return "No results".to_string();
        }
        format!("{} of {}", self.current_match_index + 1, self.matches.len())
    }

    /// Replace the current match only. The replace term is inserted verbatim.
    pub fn replace_one(&mut self, document: &str) -> ReplaceResult {
        if self.search_term.is_empty() {
            return ReplaceResult::unchanged(document);
        }
        let Some(m) = self.current_match() else {
            return ReplaceResult::unchanged(document);
        };
        if document.get(m.index..m.end()) != Some(m.text.as_str()) {
            warn!(target: "search.engine", index = m.index, "replace_one_stale_match");
            return ReplaceResult::unchanged(document);
        }
        let mut out = String::with_capacity(document.len() + self.replace_term.len());
        out.push_str(&document[..m.index]);
        out.push_str(&self.replace_term);
        out.push_str(&document[m.end()..]);
        debug!(target: "search.engine", index = m.index, "replace_one");
        self.update(&out);
        ReplaceResult {
            new_document: out,
            replacement_count: 1,
            success: true,
        }
    }

    /// Replace every match in one pass.
    pub fn replace_all(&mut self, document: &str) -> ReplaceResult {
        let result = replace_all_in(document, &self.search_term, &self.replace_term, &self.options);
        if result.success {
            self.update(&result.new_document);
        }
        result
    }
}

/// Stateless replace-all behind [`SearchEngine::replace_all`].
///
/// `replacement_count` is the number of matches in `document` at replacement
/// time. In regex mode `$1` / `${name}` references are expanded; literal
/// searches (including the malformed-regex fallback) insert the replacement verbatim.
pub fn replace_all_in(
    document: &str,
    term: &str,
    replacement: &str,
    options: &SearchOptions,
) -> ReplaceResult {
    replace_n_in(document, term, replacement, options, 0)
}

/// Replace the first `limit` matches (`0` means all). Same expansion rules
/// as [`replace_all_in`].
pub fn replace_n_in(
    document: &str,
    term: &str,
    replacement: &str,
    options: &SearchOptions,
    limit: usize,
) -> ReplaceResult {
    if term.trim().is_empty() {
        return ReplaceResult::unchanged(document);
    }
    let Some(pattern) = build_pattern(term, options) else {
        return ReplaceResult::unchanged(document);
    };
    let found = pattern.regex.find_iter(document).count();
    let count = if limit == 0 { found } else { found.min(limit) };
    if count == 0 {
        return ReplaceResult::unchanged(document);
    }
    let new_document = if pattern.expands_captures(options) {
        pattern.regex.replacen(document, limit, replacement).into_owned()
    } else {
        pattern
            .regex
            .replacen(document, limit, NoExpand(replacement))
            .into_owned()
    };
    debug!(target: "search.engine", count, limit, "replace_n");
    ReplaceResult {
        new_document,
        replacement_count: count,
        success: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_for(doc: &str, term: &str) -> SearchEngine {
        let mut e = SearchEngine::new(SearchOptions::default());
        e.set_search_term(term, doc);
        e
    }

    #[test]
    fn foo_bar_foo_scenario() {
        let doc = "foo bar foo";
        let mut e = engine_for(doc, "foo");
        let idx: Vec<usize> = e.matches().iter().map(|m| m.index).collect();
        assert_eq!(idx, vec![0, 8]);
        assert!(e.matches().iter().all(|m| m.text == "foo" && m.length == 3));
        e.set_replace_term("baz");
        let r = e.replace_all(doc);
        assert!(r.success);
        assert_eq!(r.new_document, "baz bar baz");
        assert_eq!(r.replacement_count, 2);
        assert!(e.matches().is_empty());
        assert_eq!(e.match_counter(), "No results");
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let doc = "a a a";
        let mut e = engine_for(doc, "a");
        assert_eq!(e.match_counter(), "1 of 3");
        e.navigate(NavigateDirection::Prev);
        assert_eq!(e.current_match_index(), 2);
        e.navigate(NavigateDirection::Next);
        assert_eq!(e.current_match_index(), 0);
        e.navigate(NavigateDirection::Last);
        assert_eq!(e.match_counter(), "3 of 3");
        e.navigate(NavigateDirection::First);
        assert_eq!(e.current_match_index(), 0);
    }

    #[test]
    fn navigation_without_matches_is_noop() {
        let mut e = engine_for("abc", "zzz");
        assert!(e.navigate(NavigateDirection::Next).is_none());
        assert_eq!(e.current_match_index(), 0);
    }

    #[test]
    fn index_clamps_when_document_shrinks() {
        let mut e = engine_for("x x x x", "x");
        e.navigate(NavigateDirection::Last);
        assert_eq!(e.current_match_index(), 3);
        e.update("x x");
        assert_eq!(e.current_match_index(), 0);
        assert_eq!(e.matches().len(), 2);
    }

    #[test]
    fn replace_one_splices_current_match() {
        let doc = "one two one";
        let mut e = engine_for(doc, "one");
        e.navigate(NavigateDirection::Next);
        e.set_replace_term("1");
        let r = e.replace_one(doc);
        assert_eq!(r.new_document, "one two 1");
        assert_eq!(r.replacement_count, 1);
        assert!(r.success);
        assert_eq!(e.matches().len(), 1);
        assert_eq!(e.current_match_index(), 0);
    }

    #[test]
    fn replace_one_signals_failure_without_matches() {
        let mut e = engine_for("abc", "");
        let r = e.replace_one("abc");
        assert!(!r.success);
        assert_eq!(r.replacement_count, 0);
        assert_eq!(r.new_document, "abc");
    }

    #[test]
    fn replace_one_rejects_stale_state() {
        let mut e = engine_for("abc abc", "abc");
        e.navigate(NavigateDirection::Last);
        let r = e.replace_one("abc");
        assert!(!r.success);
    }

    #[test]
    fn replace_all_expands_captures_only_in_regex_mode() {
        let regex = SearchOptions {
            use_regex: true,
            ..SearchOptions::literal()
        };
        let r = replace_all_in("k=v a=b", r"(\w)=(\w)", "$2=$1", &regex);
        assert_eq!(r.new_document, "v=k b=a");
        let r = replace_all_in("cost 5", "5", "$1", &SearchOptions::literal());
        assert_eq!(r.new_document, "cost $1");
    }

    #[test]
    fn replace_n_limits_replacements() {
        let opts = SearchOptions::literal();
        let r = replace_n_in("a a a", "a", "b", &opts, 2);
        assert_eq!(r.new_document, "b b a");
        assert_eq!(r.replacement_count, 2);
        let none = replace_n_in("xyz", "a", "b", &opts, 1);
        assert!(!none.success);
        assert_eq!(none.new_document, "xyz");
    }

    #[test]
    fn replace_all_with_broken_regex_is_literal() {
        let regex = SearchOptions {
            use_regex: true,
            ..SearchOptions::literal()
        };
        let r = replace_all_in("a+(b", "+(", "$0", &regex);
        assert!(r.success);
        assert_eq!(r.new_document, "a$0b");
    }

    #[test]
    fn clear_resets_session() {
        let mut e = engine_for("aa", "a");
        e.navigate(NavigateDirection::Next);
        e.clear();
        assert!(!e.is_searching());
        assert_eq!(e.match_counter(), "");
        assert_eq!(e.current_match_index(), 0);
    }
}
