//! Operators over the character-wise Visual selection.

use super::splice;
use core_state::{Register, VimContext, VimMode};
use core_text::motion;

/// Remove the selection into the register and return its start.
fn cut(ctx: &mut VimContext<'_>) -> Option<usize> {
    let sel = ctx.visual_selection()?;
    let text = ctx.value().to_string();
    ctx.set_register(Register::charwise(&text[sel.start..sel.end]));
    ctx.set_mode(VimMode::Normal);
    let value = splice(&text, sel.start..sel.end, "");
    tracing::trace!(target: "vim.dispatch", op = "visual_cut", start = sel.start, end = sel.end, "edit");
    ctx.update_value(value, Some(sel.start));
    Some(sel.start)
}

pub fn delete(ctx: &mut VimContext<'_>) {
    if let Some(start) = cut(ctx) {
        let pos = motion::normalize_normal(ctx.value(), start);
        ctx.set_cursor(pos);
    }
}

pub fn change(ctx: &mut VimContext<'_>) {
    if cut(ctx).is_some() {
        ctx.set_mode(VimMode::Insert);
    }
}

pub fn yank(ctx: &mut VimContext<'_>) {
    let Some(sel) = ctx.visual_selection() else {
        return;
    };
    let text = ctx.value()[sel.start..sel.end].to_string();
    ctx.set_register(Register::charwise(text));
    ctx.set_mode(VimMode::Normal);
    ctx.set_cursor(sel.start);
}

pub fn swap_anchor(ctx: &mut VimContext<'_>) {
    ctx.swap_visual_anchor();
}

pub fn leave(ctx: &mut VimContext<'_>) {
    ctx.set_mode(VimMode::Normal);
    let pos = motion::normalize_normal(ctx.value(), ctx.cursor());
    ctx.set_cursor(pos);
}
