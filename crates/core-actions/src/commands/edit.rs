//! Normal-mode text mutations: delete, change, yank, put, join.
//!
//! Deletes and yanks write the unnamed register. Line-wise text is stored
//! with a trailing newline so a put re-creates a whole line.

use super::splice;
use core_state::{HostRequest, Register, VimContext, VimMode};
use core_text::{grapheme, line_span, motion};
use std::ops::Range;

fn commit(ctx: &mut VimContext<'_>, op: &'static str, value: String, cursor: usize) {
    tracing::trace!(target: "vim.dispatch", op, len = value.len(), cursor, "edit");
    ctx.update_value(value, Some(cursor));
}

/// Cursor position normalized onto a cluster, plus an owned copy of the text.
fn snapshot(ctx: &VimContext<'_>) -> (String, usize) {
    let text = ctx.value().to_string();
    let pos = motion::normalize_normal(&text, ctx.cursor());
    (text, pos)
}

/// Line under `pos` with its newline; the last line takes the newline before it.
fn whole_line_range(text: &str, pos: usize) -> Range<usize> {
    let span = line_span(text, pos);
    let end = span.end_with_newline(text);
    if end > span.end {
        span.start..end
    } else if span.start > 0 {
        span.start - 1..span.end
    } else {
        span.start..span.end
    }
}

fn line_register(text: &str, pos: usize) -> Register {
    let span = line_span(text, pos);
    Register::linewise(format!("{}\n", &text[span.start..span.end]))
}

/// From `pos` to the next word start, never past the end of the line.
fn word_range(text: &str, pos: usize) -> Range<usize> {
    let span = line_span(text, pos);
    pos..motion::next_word_start(text, pos).min(span.end)
}

pub fn delete_char(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if span.is_empty() {
        return;
    }
    let end = grapheme::next_boundary(&text, pos).min(span.end);
    ctx.set_register(Register::charwise(&text[pos..end]));
    let value = splice(&text, pos..end, "");
    let cursor = motion::normalize_normal(&value, pos);
    commit(ctx, "delete_char", value, cursor);
}

pub fn delete_char_before(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if pos <= span.start {
        return;
    }
    let start = grapheme::prev_boundary(&text, pos).max(span.start);
    ctx.set_register(Register::charwise(&text[start..pos]));
    let value = splice(&text, start..pos, "");
    commit(ctx, "delete_char_before", value, start);
}

/// Later passes of a counted `dd` append to the register, and deleting the
/// last line ends the count.
pub fn delete_line(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    if text.is_empty() {
        ctx.stop_repeat();
        return;
    }
    let range = whole_line_range(&text, pos);
    let deleted = line_register(&text, pos);
    let register = if ctx.pass() > 0 && ctx.register().linewise {
        Register::linewise(format!("{}{}", ctx.register().text, deleted.text))
    } else {
        deleted
    };
    ctx.set_register(register);
    if range.end == text.len() {
        ctx.stop_repeat();
    }
    let start = range.start;
    let value = splice(&text, range, "");
    let cursor = motion::first_non_blank(&value, start);
    commit(ctx, "delete_line", value, cursor);
}

pub fn delete_to_line_end(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if pos >= span.end {
        return;
    }
    ctx.set_register(Register::charwise(&text[pos..span.end]));
    let value = splice(&text, pos..span.end, "");
    let cursor = motion::normalize_normal(&value, pos);
    commit(ctx, "delete_to_line_end", value, cursor);
}

pub fn delete_word(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let range = word_range(&text, pos);
    if range.is_empty() {
        return;
    }
    ctx.set_register(Register::charwise(&text[range.clone()]));
    let value = splice(&text, range, "");
    let cursor = motion::normalize_normal(&value, pos);
    commit(ctx, "delete_word", value, cursor);
}

pub fn change_line(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    ctx.set_register(line_register(&text, pos));
    let value = splice(&text, span.start..span.end, "");
    commit(ctx, "change_line", value, span.start);
    ctx.set_mode(VimMode::Insert);
}

/// `cw` behaves like `ce`: trailing blanks after the word survive.
pub fn change_word(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let range = match grapheme::at(&text, pos) {
        Some(g) if !grapheme::is_blank(g) => pos..motion::word_run_end(&text, pos),
        _ => word_range(&text, pos),
    };
    if !range.is_empty() {
        ctx.set_register(Register::charwise(&text[range.clone()]));
        let value = splice(&text, range, "");
        commit(ctx, "change_word", value, pos);
    }
    ctx.set_mode(VimMode::Insert);
}

pub fn change_to_line_end(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if pos < span.end {
        ctx.set_register(Register::charwise(&text[pos..span.end]));
        let value = splice(&text, pos..span.end, "");
        commit(ctx, "change_to_line_end", value, pos);
    }
    ctx.set_mode(VimMode::Insert);
}

pub fn yank_line(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    ctx.set_register(line_register(&text, pos));
}

pub fn yank_word(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let range = word_range(&text, pos);
    if !range.is_empty() {
        ctx.set_register(Register::charwise(&text[range]));
    }
}

pub fn paste_after(ctx: &mut VimContext<'_>) {
    let reg = ctx.register().clone();
    if reg.text.is_empty() {
        return;
    }
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if reg.linewise {
        let body = reg.text.strip_suffix('\n').unwrap_or(&reg.text);
        let end = span.end_with_newline(&text);
        let (at, insert, line_start) = if end > span.end {
            (end, format!("{body}\n"), end)
        } else {
            (span.end, format!("\n{body}"), span.end + 1)
        };
        let value = splice(&text, at..at, &insert);
        let cursor = motion::first_non_blank(&value, line_start);
        commit(ctx, "paste_after", value, cursor);
    } else {
        let at = if span.is_empty() {
            pos
        } else {
            grapheme::next_boundary(&text, pos).min(span.end)
        };
        put_charwise(ctx, &text, at, &reg.text, "paste_after");
    }
}

pub fn paste_before(ctx: &mut VimContext<'_>) {
    let reg = ctx.register().clone();
    if reg.text.is_empty() {
        return;
    }
    let (text, pos) = snapshot(ctx);
    if reg.linewise {
        let start = line_span(&text, pos).start;
        let body = reg.text.strip_suffix('\n').unwrap_or(&reg.text);
        let value = splice(&text, start..start, &format!("{body}\n"));
        let cursor = motion::first_non_blank(&value, start);
        commit(ctx, "paste_before", value, cursor);
    } else {
        put_charwise(ctx, &text, pos, &reg.text, "paste_before");
    }
}

/// Insert `insert` at `at`; the cursor lands on its last cluster.
fn put_charwise(ctx: &mut VimContext<'_>, text: &str, at: usize, insert: &str, op: &'static str) {
    let value = splice(text, at..at, insert);
    let cursor = grapheme::prev_boundary(&value, at + insert.len()).max(at);
    commit(ctx, op, value, cursor);
}

/// Join the next line onto this one, collapsing its indentation to one space.
pub fn join_lines(ctx: &mut VimContext<'_>) {
    let (text, pos) = snapshot(ctx);
    let span = line_span(&text, pos);
    if span.end >= text.len() {
        return;
    }
    let next = line_span(&text, span.end + 1);
    let next_line = &text[next.start..next.end];
    let rest = next_line.trim_start_matches([' ', '\t']);
    let remove_end = next.end - rest.len();
    let current = &text[span.start..span.end];
    let separator = if current.is_empty()
        || current.ends_with([' ', '\t'])
        || rest.is_empty()
        || rest.starts_with(')')
    {
        ""
    } else {
        " "
    };
    let value = splice(&text, span.end..remove_end, separator);
    let cursor = motion::normalize_normal(&value, span.end);
    commit(ctx, "join_lines", value, cursor);
}

pub fn undo(ctx: &mut VimContext<'_>) {
    ctx.request(HostRequest::Undo);
}

pub fn redo(ctx: &mut VimContext<'_>) {
    ctx.request(HostRequest::Redo);
}
