//! Command-line mode keys and `:` command execution.

use crate::dispatcher::command_parser::{CommandParser, ParsedCommand, SubstituteRange};
use core_search::{SearchOptions, replace_n_in};
use core_state::{HostRequest, VimContext, VimMode};
use core_text::{line_span, motion};

pub fn cancel(ctx: &mut VimContext<'_>) {
    ctx.set_mode(VimMode::Normal);
}

/// Delete the last character; on a bare `:` leave the command line.
pub fn backspace(ctx: &mut VimContext<'_>) {
    if ctx.command_line().chars().count() <= 1 {
        ctx.set_mode(VimMode::Normal);
    } else {
        ctx.command_line_mut().pop();
    }
}

pub fn execute(ctx: &mut VimContext<'_>) {
    let line = ctx.command_line().to_string();
    ctx.set_mode(VimMode::Normal);
    let parsed = CommandParser::parse(&line);
    tracing::debug!(target: "vim.command_line", command = %line, parsed = ?parsed, "command_execute");
    match parsed {
        ParsedCommand::Empty => {}
        ParsedCommand::Write => ctx.request(HostRequest::Save),
        ParsedCommand::Quit => ctx.request(HostRequest::Quit),
        ParsedCommand::WriteQuit => {
            ctx.request(HostRequest::Save);
            ctx.request(HostRequest::Quit);
        }
        ParsedCommand::GotoLine(line) => {
            let pos = motion::goto_line(ctx.value(), line.saturating_sub(1));
            ctx.set_cursor(pos);
        }
        ParsedCommand::Substitute {
            range,
            pattern,
            replacement,
            global,
            case_sensitive,
        } => {
            let options = SearchOptions {
                case_sensitive,
                use_regex: true,
                whole_word: false,
            };
            substitute(ctx, range, &pattern, &replacement, global, &options);
        }
        ParsedCommand::Unknown(cmd) => {
            tracing::warn!(target: "vim.command_line", command = %cmd, "unknown_command");
            ctx.set_message(format!("Not an editor command: {cmd}"));
        }
    }
}

/// Line-by-line substitution. Without `global` only the first match on each
/// line is replaced.
fn substitute(
    ctx: &mut VimContext<'_>,
    range: SubstituteRange,
    pattern: &str,
    replacement: &str,
    global: bool,
    options: &SearchOptions,
) {
    let text = ctx.value().to_string();
    let region = match range {
        SubstituteRange::CurrentLine => {
            let span = line_span(&text, ctx.cursor());
            span.start..span.end
        }
        SubstituteRange::WholeDocument => 0..text.len(),
    };
    let limit = usize::from(!global);
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..region.start]);
    let mut total = 0usize;
    let mut lines = 0usize;
    let mut last_line = None;
    for (i, line) in text[region.clone()].split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let result = replace_n_in(line, pattern, replacement, options, limit);
        if result.success {
            total += result.replacement_count;
            lines += 1;
            last_line = Some(out.len());
        }
        out.push_str(&result.new_document);
    }
    out.push_str(&text[region.end..]);

    let Some(last_line) = last_line else {
        ctx.set_message(format!("Pattern not found: {pattern}"));
        return;
    };
    tracing::debug!(target: "vim.command_line", total, lines, "substitute");
    let cursor = motion::first_non_blank(&out, last_line);
    ctx.update_value(out, Some(cursor));
    ctx.set_message(format!(
        "{total} substitution{} on {lines} line{}",
        if total == 1 { "" } else { "s" },
        if lines == 1 { "" } else { "s" },
    ));
}
