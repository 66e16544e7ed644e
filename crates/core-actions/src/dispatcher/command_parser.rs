//! Structured `:` command line parsing.
//!
//! Converts the raw command line (always beginning with ':') into a
//! `ParsedCommand`. Pure classification; execution lives in
//! `commands::command_line`.
//!
//! Substitute follows Vim's surface syntax: any non-alphanumeric delimiter,
//! `\<delim>` to escape it, `\1`..`\9` and `&` in the replacement, and the
//! `g`, `i`, `I` flags.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstituteRange {
    CurrentLine,
    WholeDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Write,
    Quit,
    WriteQuit,
    /// One-based line number.
    GotoLine(usize),
    Substitute {
        range: SubstituteRange,
        /// Regex pattern.
        pattern: String,
        /// Replacement in `regex` crate syntax (`${1}`, `$$`).
        replacement: String,
        global: bool,
        case_sensitive: bool,
    },
    /// Nothing after the colon.
    Empty,
    Unknown(String),
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let s = raw.trim();
        let body = s.strip_prefix(':').unwrap_or(s).trim();
        if body.is_empty() {
            return ParsedCommand::Empty;
        }
        match body {
            "w" | "write" => return ParsedCommand::Write,
            "q" | "quit" | "q!" => return ParsedCommand::Quit,
            "wq" | "x" | "wq!" => return ParsedCommand::WriteQuit,
            _ => {}
        }
        if body.bytes().all(|b| b.is_ascii_digit()) {
            return match body.parse::<usize>() {
                Ok(line) => ParsedCommand::GotoLine(line),
                Err(_) => ParsedCommand::Unknown(body.to_string()),
            };
        }
        let (range, rest) = match body.strip_prefix('%') {
            Some(rest) => (SubstituteRange::WholeDocument, rest),
            None => (SubstituteRange::CurrentLine, body),
        };
        if let Some(args) = rest.strip_prefix('s')
            && let Some(cmd) = parse_substitute(range, args)
        {
            return cmd;
        }
        ParsedCommand::Unknown(body.to_string())
    }
}

fn parse_substitute(range: SubstituteRange, args: &str) -> Option<ParsedCommand> {
    let mut chars = args.chars();
    let delim = chars.next()?;
    if delim.is_alphanumeric() || delim == '\\' || delim == '"' || delim.is_whitespace() {
        return None;
    }
    let mut fields = split_fields(chars.as_str(), delim).into_iter();
    let pattern = fields.next().unwrap_or_default();
    let replacement = fields.next().unwrap_or_default();
    let flags = fields.next().unwrap_or_default();
    if pattern.is_empty() || fields.next().is_some() {
        return None;
    }
    let mut global = false;
    let mut case_sensitive = true;
    for flag in flags.chars() {
        match flag {
            'g' => global = true,
            'i' => case_sensitive = false,
            'I' => case_sensitive = true,
            _ => return None,
        }
    }
    Some(ParsedCommand::Substitute {
        range,
        pattern,
        replacement: translate_replacement(&replacement),
        global,
        case_sensitive,
    })
}

/// Split on unescaped `delim`, unescaping `\<delim>`. Other escapes are kept.
fn split_fields(s: &str, delim: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == delim => field.push(next),
                Some(next) => {
                    field.push('\\');
                    field.push(next);
                }
                None => field.push('\\'),
            }
        } else if c == delim {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

/// Vim replacement syntax to `regex` syntax.
fn translate_replacement(rep: &str) -> String {
    let mut out = String::with_capacity(rep.len());
    let mut chars = rep.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('$') => out.push_str("$$"),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '&' => out.push_str("${0}"),
            '$' => out.push_str("$$"),
            _ => out.push(c),
        }
    }
    out
}
