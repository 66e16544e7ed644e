//! Cursor motions. In Visual mode they move the free end of the selection.

use core_state::VimContext;
use core_text::motion;

fn apply(ctx: &mut VimContext<'_>, f: fn(&str, usize) -> usize) {
    let from = ctx.cursor();
    let to = f(ctx.value(), from);
    tracing::trace!(target: "vim.dispatch", from, to, "motion");
    ctx.set_cursor(to);
}

pub fn left(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::left);
}

pub fn right(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::right);
}

pub fn up(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::up);
}

pub fn down(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::down);
}

pub fn word_forward(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::word_forward);
}

pub fn word_backward(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::word_backward);
}

pub fn word_end(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::word_end);
}

pub fn line_start(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::line_start);
}

pub fn first_non_blank(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::first_non_blank);
}

pub fn line_end(ctx: &mut VimContext<'_>) {
    apply(ctx, motion::line_end);
}

pub fn document_start(ctx: &mut VimContext<'_>) {
    apply(ctx, |text, _| motion::document_start(text));
}

pub fn document_end(ctx: &mut VimContext<'_>) {
    apply(ctx, |text, _| motion::document_end(text));
}
