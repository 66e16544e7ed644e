//! Mode switches from Normal mode and the way back out of Insert mode.

use super::{indentation, splice};
use core_state::{VimContext, VimMode};
use core_text::{grapheme, line_span, motion};

fn enter_insert_at(ctx: &mut VimContext<'_>, pos: usize) {
    ctx.set_mode(VimMode::Insert);
    ctx.set_cursor(pos);
}

pub fn insert(ctx: &mut VimContext<'_>) {
    let pos = ctx.cursor();
    enter_insert_at(ctx, pos);
}

pub fn append(ctx: &mut VimContext<'_>) {
    let text = ctx.value();
    let pos = ctx.cursor();
    let span = line_span(text, pos);
    let at = if pos < span.end {
        grapheme::next_boundary(text, pos).min(span.end)
    } else {
        pos
    };
    enter_insert_at(ctx, at);
}

pub fn insert_line_start(ctx: &mut VimContext<'_>) {
    let pos = motion::first_non_blank(ctx.value(), ctx.cursor());
    enter_insert_at(ctx, pos);
}

pub fn append_line_end(ctx: &mut VimContext<'_>) {
    let pos = line_span(ctx.value(), ctx.cursor()).end;
    enter_insert_at(ctx, pos);
}

/// `o`: new line below carrying the current indentation.
pub fn open_below(ctx: &mut VimContext<'_>) {
    let text = ctx.value().to_string();
    let span = line_span(&text, ctx.cursor());
    let indent = indentation(&text[span.start..span.end]);
    let insert = format!("\n{indent}");
    let value = splice(&text, span.end..span.end, &insert);
    ctx.update_value(value, Some(span.end + insert.len()));
    ctx.set_mode(VimMode::Insert);
}

/// `O`: new line above carrying the current indentation.
pub fn open_above(ctx: &mut VimContext<'_>) {
    let text = ctx.value().to_string();
    let span = line_span(&text, ctx.cursor());
    let indent = indentation(&text[span.start..span.end]);
    let value = splice(&text, span.start..span.start, &format!("{indent}\n"));
    ctx.update_value(value, Some(span.start + indent.len()));
    ctx.set_mode(VimMode::Insert);
}

pub fn visual(ctx: &mut VimContext<'_>) {
    let pos = motion::normalize_normal(ctx.value(), ctx.cursor());
    ctx.set_cursor(pos);
    ctx.set_mode(VimMode::Visual);
}

pub fn command_line(ctx: &mut VimContext<'_>) {
    ctx.set_mode(VimMode::Command);
}

/// Normal-mode `Escape`: nothing to do beyond dropping pending keys.
pub fn cancel(_ctx: &mut VimContext<'_>) {}

/// Insert-mode `Escape`: back to Normal, caret retreats onto the previous cluster.
pub fn leave_insert(ctx: &mut VimContext<'_>) {
    let text = ctx.value();
    let pos = ctx.cursor();
    let start = line_span(text, pos).start;
    let target = if pos > start {
        grapheme::prev_boundary(text, pos).max(start)
    } else {
        pos
    };
    ctx.set_mode(VimMode::Normal);
    ctx.set_cursor(target);
}
