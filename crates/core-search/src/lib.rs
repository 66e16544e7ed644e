//! core-search: in-document search & replace.
//!
//! Layers, leaves first:
//! * `pattern` - turns a term plus `SearchOptions` into a compiled regex,
//!   falling back to a literal search when a user regex is malformed.
//! * `finder`  - collects every match in ascending offset order.
//! * `engine`  - the stateful search session driven by the search UI:
//!   current match cursor, circular navigation, replace one / replace all.
//!
//! Offsets are byte offsets into the document. Nothing here mutates the
//! document it is given; replace operations hand back a new string.

pub mod engine;
pub mod finder;
pub mod pattern;

pub use engine::{
    NavigateDirection, ReplaceResult, SearchEngine, replace_all_in, replace_n_in,
};
pub use finder::{SearchMatch, SearchResult, find_matches};
pub use pattern::{CompiledPattern, PatternError, SearchOptions, build_pattern};
