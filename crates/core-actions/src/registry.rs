//! Command registry: every Vim command keyed by `(mode, key)`.
//!
//! The table is immutable after construction and shared process-wide through
//! [`CommandRegistry::global`]. Multi-key commands (`dd`, `gg`) contribute
//! their strict prefixes so the pending-key buffer can tell "wait for more"
//! from "unknown".

use crate::commands::{command_line, edit, mode, motion, visual};
use core_keymap::SequenceTable;
use core_state::{VimContext, VimMode};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

pub type CommandFn = fn(&mut VimContext<'_>);

#[derive(Debug, Clone, Copy)]
pub struct VimCommand {
    pub mode: VimMode,
    pub key: &'static str,
    pub execute: CommandFn,
    pub description: &'static str,
}

/// Vim keys this editor knows by name but does not implement. Pressing one
/// logs a warning instead of being silently dropped.
const UNIMPLEMENTED_KEYS: &[&str] = &[
    "d", "c", "y", "g", "r", "R", "s", "S", "f", "F", "t", "T", ";", ",", "n", "N", "*", "#", "%",
    "m", "'", "`", "q", "@", ".", "~", "z", "Z", "H", "M", "L", "W", "B", "E", "V", "Y", "<", ">",
    "=", "!", "&", "{", "}", "(", ")", "+", "-", "_", "|", "/", "?", "\"", "Enter", "Backspace",
    "Tab", "<C-a>", "<C-b>", "<C-d>", "<C-e>", "<C-f>", "<C-i>", "<C-o>", "<C-u>", "<C-v>",
    "<C-w>", "<C-x>", "<C-y>",
];

#[derive(Debug)]
pub struct CommandRegistry {
    commands: HashMap<VimMode, HashMap<&'static str, VimCommand>>,
    prefixes: HashMap<VimMode, HashSet<String>>,
}

impl CommandRegistry {
    /// Build from a command list. A later entry for the same `(mode, key)`
    /// replaces the earlier one.
    pub fn from_commands(list: impl IntoIterator<Item = VimCommand>) -> Self {
        let mut commands: HashMap<VimMode, HashMap<&'static str, VimCommand>> = HashMap::new();
        let mut prefixes: HashMap<VimMode, HashSet<String>> = HashMap::new();
        for cmd in list {
            if is_sequence(cmd.key) {
                let set = prefixes.entry(cmd.mode).or_default();
                for (i, _) in cmd.key.char_indices().skip(1) {
                    set.insert(cmd.key[..i].to_string());
                }
            }
            if commands
                .entry(cmd.mode)
                .or_default()
                .insert(cmd.key, cmd)
                .is_some()
            {
                tracing::trace!(target: "vim.registry", mode = %cmd.mode, key = cmd.key, "command_overridden");
            }
        }
        Self { commands, prefixes }
    }

    /// The built-in command set, constructed on first use.
    pub fn global() -> &'static CommandRegistry {
        static REGISTRY: OnceLock<CommandRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| Self::from_commands(builtin_commands()))
    }

    pub fn lookup(&self, mode: VimMode, key: &str) -> Option<&VimCommand> {
        self.commands.get(&mode)?.get(key)
    }

    /// `key` names a Vim command in any mode, implemented or not.
    pub fn is_recognized(&self, key: &str) -> bool {
        UNIMPLEMENTED_KEYS.contains(&key) || self.commands.values().any(|m| m.contains_key(key))
    }

    /// Commands of one mode, sorted by key.
    pub fn commands(&self, mode: VimMode) -> Vec<&VimCommand> {
        let mut list: Vec<_> = self
            .commands
            .get(&mode)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        list.sort_by_key(|c| c.key);
        list
    }

    /// Multi-key commands of one mode, sorted.
    pub fn sequences(&self, mode: VimMode) -> Vec<&'static str> {
        let mut keys: Vec<_> = self
            .commands(mode)
            .into_iter()
            .map(|c| c.key)
            .filter(|k| is_sequence(k))
            .collect();
        keys.dedup();
        keys
    }

    pub fn len(&self) -> usize {
        self.commands.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence view of one mode for the pending-key buffer.
    pub fn table(&self, mode: VimMode) -> ModeTable<'_> {
        ModeTable {
            registry: self,
            mode,
        }
    }
}

/// A lowercase multi-character key such as `dd`. Named keys (`Escape`,
/// `ArrowUp`, `<C-r>`) are single tokens even though they span several chars.
fn is_sequence(key: &str) -> bool {
    key.chars().count() > 1
        && !key.starts_with('<')
        && !key.starts_with(|c: char| c.is_ascii_uppercase())
}

#[derive(Debug, Clone, Copy)]
pub struct ModeTable<'a> {
    registry: &'a CommandRegistry,
    mode: VimMode,
}

impl SequenceTable for ModeTable<'_> {
    fn is_command(&self, action: &str) -> bool {
        self.registry.lookup(self.mode, action).is_some()
    }

    fn is_prefix(&self, action: &str) -> bool {
        self.registry
            .prefixes
            .get(&self.mode)
            .is_some_and(|set| set.contains(action))
    }
}

fn cmd(
    mode: VimMode,
    key: &'static str,
    execute: CommandFn,
    description: &'static str,
) -> VimCommand {
    VimCommand {
        mode,
        key,
        execute,
        description,
    }
}

/// Motions shared by Normal and Visual mode.
const MOTIONS: &[(&str, CommandFn, &str)] = &[
    ("h", motion::left, "move left"),
    ("j", motion::down, "move down"),
    ("k", motion::up, "move up"),
    ("l", motion::right, "move right"),
    ("w", motion::word_forward, "next word start"),
    ("b", motion::word_backward, "previous word start"),
    ("e", motion::word_end, "word end"),
    ("0", motion::line_start, "line start"),
    ("^", motion::first_non_blank, "first non-blank"),
    ("$", motion::line_end, "line end"),
    ("gg", motion::document_start, "first line"),
    ("G", motion::document_end, "last line"),
];

fn builtin_commands() -> Vec<VimCommand> {
    use VimMode::{Command, Insert, Normal, Visual};
    let mut list = Vec::new();
    for &(key, f, desc) in MOTIONS {
        list.push(cmd(Normal, key, f, desc));
        list.push(cmd(Visual, key, f, desc));
    }
    list.extend([
        cmd(Normal, "ArrowLeft", motion::left, "move left"),
        cmd(Normal, "ArrowDown", motion::down, "move down"),
        cmd(Normal, "ArrowUp", motion::up, "move up"),
        cmd(Normal, "ArrowRight", motion::right, "move right"),
        // mode switches
        cmd(Normal, "i", mode::insert, "insert before cursor"),
        cmd(Normal, "a", mode::append, "append after cursor"),
        cmd(Normal, "I", mode::insert_line_start, "insert at first non-blank"),
        cmd(Normal, "A", mode::append_line_end, "append at line end"),
        cmd(Normal, "o", mode::open_below, "open line below"),
        cmd(Normal, "O", mode::open_above, "open line above"),
        cmd(Normal, "v", mode::visual, "start visual selection"),
        cmd(Normal, ":", mode::command_line, "enter command line"),
        cmd(Normal, "Escape", mode::cancel, "cancel pending keys"),
        // edits
        cmd(Normal, "x", edit::delete_char, "delete character"),
        cmd(Normal, "X", edit::delete_char_before, "delete character before"),
        cmd(Normal, "dd", edit::delete_line, "delete line"),
        cmd(Normal, "D", edit::delete_to_line_end, "delete to line end"),
        cmd(Normal, "dw", edit::delete_word, "delete word"),
        cmd(Normal, "cc", edit::change_line, "change line"),
        cmd(Normal, "cw", edit::change_word, "change word"),
        cmd(Normal, "C", edit::change_to_line_end, "change to line end"),
        cmd(Normal, "yy", edit::yank_line, "yank line"),
        cmd(Normal, "yw", edit::yank_word, "yank word"),
        cmd(Normal, "p", edit::paste_after, "paste after"),
        cmd(Normal, "P", edit::paste_before, "paste before"),
        cmd(Normal, "J", edit::join_lines, "join lines"),
        cmd(Normal, "u", edit::undo, "undo"),
        cmd(Normal, "<C-r>", edit::redo, "redo"),
        // insert
        cmd(Insert, "Escape", mode::leave_insert, "back to normal mode"),
        // visual
        cmd(Visual, "d", visual::delete, "delete selection"),
        cmd(Visual, "x", visual::delete, "delete selection"),
        cmd(Visual, "y", visual::yank, "yank selection"),
        cmd(Visual, "c", visual::change, "change selection"),
        cmd(Visual, "o", visual::swap_anchor, "other end of selection"),
        cmd(Visual, "Escape", visual::leave, "back to normal mode"),
        // command line
        cmd(Command, "Escape", command_line::cancel, "abandon command line"),
        cmd(Command, "Enter", command_line::execute, "run command line"),
        cmd(Command, "Backspace", command_line::backspace, "delete last character"),
    ]);
    list
}
