//! core-keymap: key sequence parsing for the modal dispatcher.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the pending tokens,
//!   the sequence table and the supplied `Instant`.
//! - Counts are a syntactic prefix (`3j`, `12dd`); a solitary leading `0` is
//!   an action (line start), never a count.
//! - Ambiguity (`d` may become `dd`) is surfaced as `NeedMore`; the caller
//!   arms the deadline and flushes on expiry.
//! - No side effects: logging only at TRACE for buffer transitions.

use smallvec::SmallVec;
use std::time::{Duration, Instant};
use tracing::trace;

/// Upper bound for repeat counts.
pub const MAX_COUNT: u32 = 999_999;
/// Default multi-key timeout (Vim `timeoutlen`).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

// -------------------------------------------------------------------------------------------------
// Count / action split
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedKey<'a> {
    pub count: u32,
    /// True when digits were present (`1j` vs `j`).
    pub explicit_count: bool,
    pub action: &'a str,
}

/// Split a raw key string into `{count, action}`.
///
/// Leading digits (first one `1`-`9`) form the count, clamped to
/// [`MAX_COUNT`]; the remainder is the action token. Without digits the count is 1.
pub fn parse_key(raw: &str) -> ParsedKey<'_> {
    let digits = if raw.starts_with(|c: char| matches!(c, '1'..='9')) {
        raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len())
    } else {
        0
    };
    let count = raw[..digits].bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10)
            .saturating_add(u32::from(b - b'0'))
            .min(MAX_COUNT)
    });
    ParsedKey {
        count: count.max(1),
        explicit_count: digits > 0,
        action: &raw[digits..],
    }
}

// -------------------------------------------------------------------------------------------------
// Sequence table
// -------------------------------------------------------------------------------------------------
/// What the buffer needs to know about the commands of the active mode.
pub trait SequenceTable {
    /// `action` is a complete command.
    fn is_command(&self, action: &str) -> bool;
    /// `action` is a strict prefix of at least one multi-key command.
    fn is_prefix(&self, action: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Run `action` `count` times.
    Execute { count: u32, action: String },
    /// Pending tokens may still complete a command.
    NeedMore,
    /// A pending prefix was followed by a key that completes nothing; the
    /// pending keys are dropped and `key` is handled on its own.
    Unrelated { key: String },
    /// No command for `action`.
    Unknown { action: String },
}

// -------------------------------------------------------------------------------------------------
// CommandBuffer
// -------------------------------------------------------------------------------------------------
/// Pending keystrokes awaiting completion, with an expiry deadline.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    tokens: SmallVec<[String; 4]>,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TIMEOUT))
    }
}

impl CommandBuffer {
    /// `timeout = None` keeps pending keys until completed or cleared.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            tokens: SmallVec::new(),
            deadline: None,
            timeout,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn pending(&self) -> String {
        self.tokens.concat()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Append a token and re-arm the deadline.
    pub fn push(&mut self, token: &str, now: Instant) {
        self.tokens.push(token.to_string());
        self.deadline = self.timeout.map(|t| now + t);
        trace!(target: "vim.buffer", pending = %self.pending(), "buffer_push");
    }

    pub fn expired(&self, now: Instant) -> bool {
        !self.tokens.is_empty() && self.deadline.is_some_and(|d| now >= d)
    }

    pub fn clear(&mut self) {
        if !self.tokens.is_empty() {
            trace!(target: "vim.buffer", pending = %self.pending(), "buffer_clear");
        }
        self.tokens.clear();
        self.deadline = None;
    }

    /// Classify the pending tokens. Terminal outcomes clear the buffer;
    /// `NeedMore` leaves it armed.
    pub fn resolve(&mut self, table: &impl SequenceTable) -> Resolution {
        let raw = self.pending();
        let parsed = parse_key(&raw);
        let action = parsed.action;
        let resolution = if action.is_empty() || table.is_prefix(action) {
            Resolution::NeedMore
        } else if table.is_command(action) {
            Resolution::Execute {
                count: parsed.count,
                action: action.to_string(),
            }
        } else {
            let last = self.tokens.last().map(String::as_str).unwrap_or_default();
            if action.len() > last.len() {
                Resolution::Unrelated {
                    key: last.to_string(),
                }
            } else {
                Resolution::Unknown {
                    action: action.to_string(),
                }
            }
        };
        if resolution != Resolution::NeedMore {
            self.clear();
        }
        resolution
    }

    /// Deadline passed: interpret whatever is pending as a complete key.
    /// Returns `None` when only a count was pending.
    pub fn flush(&mut self, table: &impl SequenceTable) -> Option<Resolution> {
        let raw = self.pending();
        self.clear();
        let parsed = parse_key(&raw);
        if parsed.action.is_empty() {
            return None;
        }
        trace!(target: "vim.buffer", action = parsed.action, "buffer_flush");
        Some(if table.is_command(parsed.action) {
            Resolution::Execute {
                count: parsed.count,
                action: parsed.action.to_string(),
            }
        } else {
            Resolution::Unknown {
                action: parsed.action.to_string(),
            }
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
        self.clear();
    }
}
