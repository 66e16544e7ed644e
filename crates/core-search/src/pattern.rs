//! Search pattern construction.
//!
//! Rules:
//! * literal terms (`use_regex = false`) are escaped before compilation;
//! * `whole_word` wraps the final pattern in `\b(?:…)\b`, whatever the regex
//!   flag says (the group keeps alternations inside the anchors);
//! * `(?i)` is prepended unless `case_sensitive`.
//!
//! A malformed user regex never reaches the caller as an error: the term is
//! recompiled as an escaped literal and the result is flagged as a fallback.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub whole_word: bool,
}

impl SearchOptions {
    pub const fn literal() -> Self {
        Self {
            case_sensitive: true,
            use_regex: false,
            whole_word: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid search pattern: {0}")]
    Invalid(#[from] regex::Error),
}

/// A compiled search pattern and whether it came from the literal fallback.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub fallback: bool,
}

impl CompiledPattern {
    /// True when replacements should expand `$n` capture references.
    pub fn expands_captures(&self, options: &SearchOptions) -> bool {
        options.use_regex && !self.fallback
    }
}

fn pattern_source(body: &str, options: &SearchOptions) -> String {
    let mut src = String::with_capacity(body.len() + 12);
    if !options.case_sensitive {
        src.push_str("(?i)");
    }
    if options.whole_word {
        src.push_str(r"\b(?:");
        src.push_str(body);
        src.push_str(r")\b");
    } else {
        src.push_str(body);
    }
    src
}

/// Compile `term` exactly as the options ask, surfacing compile errors.
pub fn compile(term: &str, options: &SearchOptions) -> Result<Regex, PatternError> {
    let body = if options.use_regex {
        term.to_string()
    } else {
        regex::escape(term)
    };
    Ok(Regex::new(&pattern_source(&body, options))?)
}

/// Compile `term`, falling back to an escaped literal when the user regex is malformed.
///
/// Returns `None` only when even the literal form cannot compile (e.g. it
/// exceeds the regex size limit); callers treat that as "no matches".
pub fn build_pattern(term: &str, options: &SearchOptions) -> Option<CompiledPattern> {
    match compile(term, options) {
        Ok(regex) => Some(CompiledPattern {
            regex,
            fallback: false,
        }),
        Err(err) => {
            warn!(target: "search.pattern", use_regex = options.use_regex, error = %err, "pattern_compile_failed");
            let literal = SearchOptions {
                use_regex: false,
                ..*options
            };
            match compile(term, &literal) {
                Ok(regex) => Some(CompiledPattern {
                    regex,
                    fallback: true,
                }),
                Err(err) => {
                    warn!(target: "search.pattern", error = %err, "literal_fallback_failed");
                    None
                }
            }
        }
    }
}
