//! Core key event types for markpad.
//!
//! The host UI reports keystrokes as `KeyEvent`s. The modal dispatcher works
//! on string tokens (`"j"`, `"Escape"`, `"<C-r>"`), so every event can be
//! rendered to its token and parsed back from one. Tokens follow the
//! DOM `KeyboardEvent.key` naming for named keys so a browser host can pass
//! its values straight through.
//!
//! `parse_key_script` turns a vim-notation script (`3jdd<Esc>`) into a
//! sequence of events; the CLI and the integration tests replay scripts this
//! way.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations consumed by higher layers.
/// Printable keys (including ':' and digits) always arrive as `KeyCode::Char`.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified printable key.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub const fn esc() -> Self {
        Self::new(KeyCode::Esc, KeyModifiers::empty())
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    /// Printable character carried by this event when no CTRL/ALT chord is involved.
    /// SHIFT is ignored because the character is already case-adjusted.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                Some(c)
            }
            _ => None,
        }
    }

    /// Dispatcher token for this key.
    pub fn token(&self) -> String {
        match self.code {
            KeyCode::Char(c) if self.mods.contains(KeyModifiers::CTRL) => format!("<C-{c}>"),
            KeyCode::Char(c) if self.mods.contains(KeyModifiers::ALT) => format!("<A-{c}>"),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".into(),
            KeyCode::Esc => "Escape".into(),
            KeyCode::Backspace => "Backspace".into(),
            KeyCode::Tab => "Tab".into(),
            KeyCode::Up => "ArrowUp".into(),
            KeyCode::Down => "ArrowDown".into(),
            KeyCode::Left => "ArrowLeft".into(),
            KeyCode::Right => "ArrowRight".into(),
        }
    }

    /// Inverse of [`KeyEvent::token`]. Returns `None` for names this layer does not model.
    pub fn from_token(token: &str) -> Option<Self> {
        let named = |code| Some(Self::new(code, KeyModifiers::empty()));
        match token {
            "Enter" => named(KeyCode::Enter),
            "Escape" => named(KeyCode::Esc),
            "Backspace" => named(KeyCode::Backspace),
            "Tab" => named(KeyCode::Tab),
            "ArrowUp" => named(KeyCode::Up),
            "ArrowDown" => named(KeyCode::Down),
            "ArrowLeft" => named(KeyCode::Left),
            "ArrowRight" => named(KeyCode::Right),
            _ => {
                if let Some(c) = chord_char(token, "<C-") {
                    return Some(Self::ctrl(c));
                }
                if let Some(c) = chord_char(token, "<A-") {
                    return Some(Self::new(KeyCode::Char(c), KeyModifiers::ALT));
                }
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Self::char(c)),
                    _ => None,
                }
            }
        }
    }
}

fn chord_char(token: &str, prefix: &str) -> Option<char> {
    let inner = token.strip_prefix(prefix)?.strip_suffix('>')?;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("unknown key notation <{0}> at byte {1}")]
    UnknownKey(String, usize),
    #[error("empty key notation <> at byte {0}")]
    Empty(usize),
}

/// Parse a vim-notation key script into events.
///
/// Plain characters map to themselves. Bracketed names are recognised
/// case-insensitively: `<Esc>`, `<CR>`, `<Enter>`, `<BS>`, `<Tab>`, `<Up>`,
/// `<Down>`, `<Left>`, `<Right>`, `<lt>` (a literal `<`), `<C-x>` and `<A-x>`.
/// A `<` with no closing `>` is taken literally.
pub fn parse_key_script(script: &str) -> Result<Vec<KeyEvent>, KeyParseError> {
    let mut out = Vec::new();
    let mut rest = script;
    let mut offset = 0usize;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(close) = rest.find('>')
        {
            let name = &rest[1..close];
            out.push(parse_notation(name, offset)?);
            offset += close + 1;
            rest = &rest[close + 1..];
            continue;
        }
        out.push(match c {
            '\n' => KeyEvent::new(KeyCode::Enter, KeyModifiers::empty()),
            '\t' => KeyEvent::new(KeyCode::Tab, KeyModifiers::empty()),
            _ => KeyEvent::char(c),
        });
        offset += c.len_utf8();
        rest = &rest[c.len_utf8()..];
    }
    Ok(out)
}

fn parse_notation(name: &str, offset: usize) -> Result<KeyEvent, KeyParseError> {
    if name.is_empty() {
        return Err(KeyParseError::Empty(offset));
    }
    let plain = |code| Ok(KeyEvent::new(code, KeyModifiers::empty()));
    match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => return plain(KeyCode::Esc),
        "cr" | "enter" | "return" => return plain(KeyCode::Enter),
        "bs" | "backspace" => return plain(KeyCode::Backspace),
        "tab" => return plain(KeyCode::Tab),
        "up" => return plain(KeyCode::Up),
        "down" => return plain(KeyCode::Down),
        "left" => return plain(KeyCode::Left),
        "right" => return plain(KeyCode::Right),
        "lt" => return Ok(KeyEvent::char('<')),
        "space" => return Ok(KeyEvent::char(' ')),
        _ => {}
    }
    let modifier = |prefix: &str| {
        let inner = name.get(..2)?.eq_ignore_ascii_case(prefix).then(|| &name[2..])?;
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    };
    if let Some(c) = modifier("c-") {
        return Ok(KeyEvent::ctrl(c));
    }
    if let Some(c) = modifier("a-") {
        return Ok(KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT));
    }
    Err(KeyParseError::UnknownKey(name.to_string(), offset))
}
