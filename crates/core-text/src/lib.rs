//! Line and grapheme helpers over a flat document string.
//!
//! The bound text input exposes its value as one string with absolute byte
//! offsets (the textarea model), so everything here works on `&str` plus a
//! byte offset rather than a line/column buffer. Offsets handed back are
//! always on grapheme boundaries when the input offset was.

pub mod motion;

/// Byte range of one line, excluding its trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// End including the newline terminator when one follows.
    pub fn end_with_newline(&self, text: &str) -> usize {
        if text[self.end..].starts_with('\n') {
            self.end + 1
        } else {
            self.end
        }
    }
}

/// Clamp an arbitrary offset into `text` and floor it to a char boundary.
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut o = offset.min(text.len());
    while !text.is_char_boundary(o) {
        o -= 1;
    }
    o
}

/// Span of the line containing `offset`.
pub fn line_span(text: &str, offset: usize) -> LineSpan {
    let offset = clamp_offset(text, offset);
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let index = text[..start].matches('\n').count();
    LineSpan { index, start, end }
}

/// Number of lines; an empty document has one (empty) line.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}

/// Span of the line with the given zero-based index.
pub fn line_span_at(text: &str, index: usize) -> Option<LineSpan> {
    let mut start = 0usize;
    for _ in 0..index {
        start += text[start..].find('\n')? + 1;
    }
    let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
    Some(LineSpan { index, start, end })
}

/// Grapheme column of `offset` within its line.
pub fn column(text: &str, offset: usize) -> usize {
    let span = line_span(text, offset);
    grapheme::count(&text[span.start..clamp_offset(text, offset)])
}

/// Offset of grapheme column `col` on `span`, clamped to the line end.
pub fn offset_for_column(text: &str, span: LineSpan, col: usize) -> usize {
    let line = &text[span.start..span.end];
    grapheme::iter_indices(line)
        .nth(col)
        .map_or(span.end, |(i, _)| span.start + i)
}

/// Grapheme helpers. Boundaries are computed with a `GraphemeCursor` so a step
/// costs only the clusters it touches, not a rescan from the line start.
pub mod grapheme {
    use unicode_segmentation::{GraphemeCursor, UnicodeSegmentation};

    pub fn iter(s: &str) -> impl Iterator<Item = &str> {
        s.graphemes(true)
    }

    pub fn iter_indices(s: &str) -> impl Iterator<Item = (usize, &str)> {
        s.grapheme_indices(true)
    }

    pub fn count(s: &str) -> usize {
        s.graphemes(true).count()
    }

    /// Previous grapheme boundary (0 when already at the start).
    pub fn prev_boundary(text: &str, byte: usize) -> usize {
        let byte = crate::clamp_offset(text, byte);
        if byte == 0 {
            return 0;
        }
        let mut cursor = GraphemeCursor::new(byte, text.len(), true);
        match cursor.prev_boundary(text, 0) {
            Ok(Some(b)) => b,
            Ok(None) => 0,
            Err(_) => text[..byte].char_indices().next_back().map_or(0, |(i, _)| i),
        }
    }

    /// Next grapheme boundary (`text.len()` when at or beyond the end).
    pub fn next_boundary(text: &str, byte: usize) -> usize {
        let byte = crate::clamp_offset(text, byte);
        if byte >= text.len() {
            return text.len();
        }
        let mut cursor = GraphemeCursor::new(byte, text.len(), true);
        match cursor.next_boundary(text, 0) {
            Ok(Some(b)) => b,
            Ok(None) => text.len(),
            Err(_) => text[byte..]
                .chars()
                .next()
                .map_or(text.len(), |c| byte + c.len_utf8()),
        }
    }

    /// Cluster starting at `byte`, if any.
    pub fn at(text: &str, byte: usize) -> Option<&str> {
        let end = next_boundary(text, byte);
        (end > byte).then(|| &text[byte..end])
    }

    /// Alphanumeric or underscore start.
    pub fn is_word(g: &str) -> bool {
        g.chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_alphanumeric())
    }

    pub fn is_blank(g: &str) -> bool {
        g.chars().all(char::is_whitespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_span_middle_line() {
        let text = "one\ntwo\nthree";
        let span = line_span(text, 5);
        assert_eq!(span, LineSpan { index: 1, start: 4, end: 7 });
        assert_eq!(&text[span.start..span.end], "two");
        assert_eq!(span.end_with_newline(text), 8);
    }

    #[test]
    fn line_span_on_newline_belongs_to_preceding_line() {
        let text = "ab\ncd";
        let span = line_span(text, 2);
        assert_eq!(span.index, 0);
        assert_eq!((span.start, span.end), (0, 2));
    }

    #[test]
    fn line_span_at_and_count() {
        let text = "a\n\nb\n";
        assert_eq!(line_count(text), 4);
        let empty = line_span_at(text, 1).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.start, 2);
        let last = line_span_at(text, 3).unwrap();
        assert_eq!((last.start, last.end), (5, 5));
        assert!(line_span_at(text, 4).is_none());
    }

    #[test]
    fn column_round_trip_with_wide_clusters() {
        let text = "x\naé😀b";
        let b = text.find('b').unwrap();
        assert_eq!(column(text, b), 3);
        let span = line_span(text, b);
        assert_eq!(offset_for_column(text, span, 3), b);
        assert_eq!(offset_for_column(text, span, 10), span.end);
    }

    #[test]
    fn grapheme_boundaries_skip_combining_marks() {
        let s = "e\u{301}x"; // e + combining acute, then x
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(&s[..nb], "e\u{301}");
        assert_eq!(grapheme::prev_boundary(s, nb), 0);
        assert_eq!(grapheme::next_boundary(s, s.len()), s.len());
        assert_eq!(grapheme::prev_boundary(s, 0), 0);
    }

    #[test]
    fn grapheme_family_emoji_is_single_cluster() {
        let s = "👨‍👩‍👧‍👦X";
        let nb = grapheme::next_boundary(s, 0);
        assert_eq!(&s[nb..], "X");
    }

    #[test]
    fn clamp_offset_floors_to_char_boundary() {
        let s = "a😀";
        assert_eq!(clamp_offset(s, 2), 1);
        assert_eq!(clamp_offset(s, 99), s.len());
    }
}
