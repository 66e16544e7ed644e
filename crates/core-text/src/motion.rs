//! Cursor motions over a flat document.
//!
//! Every function takes the document and a byte offset and returns the new
//! offset; none of them mutate anything. Normal-mode semantics apply: the
//! cursor rests on a cluster, so on a non-empty line it never sits at the
//! line end.

use crate::{
    LineSpan, clamp_offset, column, grapheme, line_count, line_span, line_span_at,
    offset_for_column,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Word,
    Punct,
}

fn class_of(g: &str) -> CharClass {
    if grapheme::is_blank(g) {
        CharClass::Blank
    } else if grapheme::is_word(g) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

fn class_at(text: &str, pos: usize) -> Option<CharClass> {
    grapheme::at(text, pos).map(class_of)
}

/// Start of the last cluster on the line, or the line start for an empty line.
fn last_cluster(text: &str, span: LineSpan) -> usize {
    if span.is_empty() {
        span.start
    } else {
        grapheme::prev_boundary(text, span.end).max(span.start)
    }
}

/// Clamp `pos` so it rests on a cluster of its line (Vim block cursor rule).
pub fn normalize_normal(text: &str, pos: usize) -> usize {
    let pos = clamp_offset(text, pos);
    let span = line_span(text, pos);
    pos.min(last_cluster(text, span))
}

/// One cluster left, stopping at the line start.
pub fn left(text: &str, pos: usize) -> usize {
    let span = line_span(text, pos);
    if pos <= span.start {
        return span.start;
    }
    grapheme::prev_boundary(text, pos).max(span.start)
}

/// One cluster right, stopping on the last cluster of the line.
pub fn right(text: &str, pos: usize) -> usize {
    let span = line_span(text, pos);
    let last = last_cluster(text, span);
    if pos >= last {
        return last;
    }
    grapheme::next_boundary(text, pos).min(last)
}

pub fn line_start(text: &str, pos: usize) -> usize {
    line_span(text, pos).start
}

/// First non-blank cluster of the line (`^`).
pub fn first_non_blank(text: &str, pos: usize) -> usize {
    let span = line_span(text, pos);
    first_non_blank_in(text, span)
}

fn first_non_blank_in(text: &str, span: LineSpan) -> usize {
    grapheme::iter_indices(&text[span.start..span.end])
        .find(|(_, g)| !grapheme::is_blank(g))
        .map_or_else(|| last_cluster(text, span), |(i, _)| span.start + i)
}

/// Last cluster of the line (`$`).
pub fn line_end(text: &str, pos: usize) -> usize {
    last_cluster(text, line_span(text, pos))
}

/// Vertical move by `delta` lines keeping the grapheme column when possible.
fn vertical(text: &str, pos: usize, delta: isize) -> usize {
    let span = line_span(text, pos);
    let target = span.index.saturating_add_signed(delta);
    let target = target.min(line_count(text) - 1);
    if target == span.index {
        return pos;
    }
    let col = column(text, pos);
    let Some(dest) = line_span_at(text, target) else {
        return pos;
    };
    offset_for_column(text, dest, col).min(last_cluster(text, dest))
}

pub fn down(text: &str, pos: usize) -> usize {
    vertical(text, pos, 1)
}

pub fn up(text: &str, pos: usize) -> usize {
    vertical(text, pos, -1)
}

/// Exclusive end of the same-class run starting at `pos` (`text.len()` at most).
pub fn word_run_end(text: &str, pos: usize) -> usize {
    let mut p = clamp_offset(text, pos);
    let Some(cls) = class_at(text, p) else {
        return p;
    };
    while class_at(text, p) == Some(cls) {
        p = grapheme::next_boundary(text, p);
    }
    p
}

/// Start of the next word, or `text.len()` when there is none. Operators
/// (`dw`, `yw`) use this exclusive form.
pub fn next_word_start(text: &str, pos: usize) -> usize {
    let mut p = clamp_offset(text, pos);
    if class_at(text, p).is_some_and(|cls| cls != CharClass::Blank) {
        p = word_run_end(text, p);
    }
    while class_at(text, p) == Some(CharClass::Blank) {
        p = grapheme::next_boundary(text, p);
    }
    p
}

/// Start of the next word (`w`). Lands on the last cluster at end of document.
pub fn word_forward(text: &str, pos: usize) -> usize {
    let p = next_word_start(text, pos);
    if p >= text.len() {
        return normalize_normal(text, text.len());
    }
    p
}

/// Start of the current or previous word (`b`).
pub fn word_backward(text: &str, pos: usize) -> usize {
    let mut p = clamp_offset(text, pos);
    if p == 0 {
        return 0;
    }
    p = grapheme::prev_boundary(text, p);
    while p > 0 && class_at(text, p) == Some(CharClass::Blank) {
        p = grapheme::prev_boundary(text, p);
    }
    let Some(cls) = class_at(text, p) else {
        return p;
    };
    while p > 0 {
        let prev = grapheme::prev_boundary(text, p);
        if class_at(text, prev) != Some(cls) {
            break;
        }
        p = prev;
    }
    p
}

/// Last cluster of the current or next word (`e`).
pub fn word_end(text: &str, pos: usize) -> usize {
    let mut p = grapheme::next_boundary(text, clamp_offset(text, pos));
    while class_at(text, p) == Some(CharClass::Blank) {
        p = grapheme::next_boundary(text, p);
    }
    let Some(cls) = class_at(text, p) else {
        return normalize_normal(text, text.len());
    };
    loop {
        let next = grapheme::next_boundary(text, p);
        if class_at(text, next) != Some(cls) {
            return p;
        }
        p = next;
    }
}

/// First non-blank of the zero-based line `index`, clamped to the last line.
pub fn goto_line(text: &str, index: usize) -> usize {
    let index = index.min(line_count(text) - 1);
    line_span_at(text, index).map_or(0, |span| first_non_blank_in(text, span))
}

/// `gg`
pub fn document_start(text: &str) -> usize {
    goto_line(text, 0)
}

/// `G`
pub fn document_end(text: &str) -> usize {
    goto_line(text, line_count(text) - 1)
}
