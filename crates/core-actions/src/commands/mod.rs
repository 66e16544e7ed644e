//! Command bodies registered in [`crate::registry`].
//!
//! Every command is a plain function over `VimContext`. Commands never touch
//! the input directly: text changes go through `update_value` (caret
//! deferred until the host settles) and caret moves through `set_cursor`.

pub mod command_line;
pub mod edit;
pub mod mode;
pub mod motion;
pub mod visual;

use std::ops::Range;

/// `text` with `range` replaced by `insert`.
pub(crate) fn splice(text: &str, range: Range<usize>, insert: &str) -> String {
    let mut out = String::with_capacity(text.len() - range.len() + insert.len());
    out.push_str(&text[..range.start]);
    out.push_str(insert);
    out.push_str(&text[range.end..]);
    out
}

/// Leading spaces and tabs of `line`.
pub(crate) fn indentation(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}
