//! Modal editing state shared by the keymap and the dispatcher.
//!
//! * `VimMode` / `CursorStyle` - the mode enumeration and the cursor shape
//!   each mode presents on the bound input.
//! * `input` - the `TextInput` seam to the host's text element plus
//!   `TextArea`, an in-memory element used by tests and the CLI.
//! * `context` - `VimSession` (per-dispatcher mutable state) and
//!   `VimContext`, the bundle a command executes against.
//!
//! Offsets are byte offsets into the input value and always sit on char
//! boundaries.

pub mod context;
pub mod input;

pub use context::{VimContext, VimSession};
pub use input::{TextArea, TextInput};

use std::fmt;

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VimMode {
    /// Command/navigation mode; every key is intercepted.
    Normal,
    /// Text entry; keys pass through to the input except `Escape`.
    Insert,
    /// Character-wise selection anchored where `v` was pressed.
    Visual,
    /// `:` command line entry.
    Command,
}

impl VimMode {
    pub const ALL: [VimMode; 4] = [
        VimMode::Normal,
        VimMode::Insert,
        VimMode::Visual,
        VimMode::Command,
    ];

    /// Mode a dispatcher starts in for the given emulation flag.
    pub const fn initial(enabled: bool) -> Self {
        if enabled { Self::Normal } else { Self::Insert }
    }

    pub const fn cursor_style(self) -> CursorStyle {
        match self {
            Self::Normal | Self::Visual => CursorStyle::Block,
            Self::Insert => CursorStyle::Line,
            Self::Command => CursorStyle::Underline,
        }
    }

    /// Status-line label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
            Self::Command => "COMMAND",
        }
    }
}

impl fmt::Display for VimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caret presentation applied to the bound input on every mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    Block,
    #[default]
    Line,
    Underline,
}

/// Selection bounds, `start <= end`. A collapsed selection is the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Unnamed yank register written by `y`, `d`, `x`, `c` and read by `p`/`P`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    pub text: String,
    /// Whole lines (`yy`, `dd`): pasted on a line of their own.
    pub linewise: bool,
}

impl Register {
    pub fn charwise(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            linewise: false,
        }
    }

    pub fn linewise(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            linewise: true,
        }
    }
}

/// Work the core hands back to the host (persistence and history live there).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    Save,
    Quit,
    Undo,
    Redo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_mode_follows_enabled_flag() {
        assert_eq!(VimMode::initial(true), VimMode::Normal);
        assert_eq!(VimMode::initial(false), VimMode::Insert);
    }

    #[test]
    fn cursor_style_per_mode() {
        assert_eq!(VimMode::Normal.cursor_style(), CursorStyle::Block);
        assert_eq!(VimMode::Visual.cursor_style(), CursorStyle::Block);
        assert_eq!(VimMode::Insert.cursor_style(), CursorStyle::Line);
        assert_eq!(VimMode::Command.cursor_style(), CursorStyle::Underline);
    }

    #[test]
    fn selection_normalizes_order() {
        let s = Selection::new(9, 3);
        assert_eq!((s.start, s.end), (3, 9));
        assert!(!s.is_collapsed());
        assert!(Selection::caret(4).is_collapsed());
    }

    #[test]
    fn mode_labels() {
        assert_eq!(VimMode::Visual.to_string(), "VISUAL");
    }
}
