//! Modal key dispatcher.
//!
//! One `VimDispatcher` serves one bound text input. Routing per mode:
//! * Normal / Visual - every key is intercepted and pushed through the
//!   pending-key buffer, which resolves counts and multi-key sequences
//!   against the registry.
//! * Insert - only `Escape` is intercepted; everything else passes through
//!   to the host element (`handled == false`).
//! * Command - printable keys edit the `:` line; `Escape`, `Enter` and
//!   `Backspace` run their registered commands.
//!
//! Every mode transition re-applies the cursor style on the input and
//! notifies registered `ModeObserver`s with `(from, to)`.
//!
//! Time is injected: `handle_key_at` / `poll_timeout` take the current
//! `Instant`, so the pending-key deadline is testable without sleeping.

pub mod command_parser;

use crate::registry::CommandRegistry;
use core_config::Config;
use core_events::KeyEvent;
use core_keymap::{CommandBuffer, Resolution, parse_key};
use core_state::{
    CursorStyle, HostRequest, Register, TextInput, VimContext, VimMode, VimSession,
};
use std::time::{Duration, Instant};

/// Observer notified after every mode transition.
pub trait ModeObserver {
    fn on_mode_change(&self, from: VimMode, to: VimMode);
}

/// What handling one key (or one explicit command) produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The key was consumed; the host must suppress its default behavior.
    pub handled: bool,
    pub mode: VimMode,
    pub mode_changed: bool,
    pub requests: Vec<HostRequest>,
    /// Status message to show (`:s` summary, unknown command).
    pub message: Option<String>,
    /// Keys still waiting for completion (`2d`).
    pub pending: String,
}

pub struct VimDispatcher {
    enabled: bool,
    session: VimSession,
    buffer: CommandBuffer,
    registry: &'static CommandRegistry,
    observers: Vec<Box<dyn ModeObserver>>,
}

impl std::fmt::Debug for VimDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VimDispatcher")
            .field("enabled", &self.enabled)
            .field("mode", &self.session.mode)
            .field("pending", &self.buffer.pending())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl VimDispatcher {
    /// `timeout = None` waits indefinitely for multi-key completion.
    pub fn new(enabled: bool, timeout: Option<Duration>) -> Self {
        Self {
            enabled,
            session: VimSession::new(VimMode::initial(enabled)),
            buffer: CommandBuffer::new(timeout),
            registry: CommandRegistry::global(),
            observers: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.vim_enabled(), config.sequence_timeout())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> VimMode {
        self.session.mode
    }

    pub fn pending(&self) -> String {
        self.buffer.pending()
    }

    /// When the pending keys will be flushed, if any are pending.
    pub fn deadline(&self) -> Option<Instant> {
        if self.buffer.is_empty() {
            None
        } else {
            self.buffer.deadline()
        }
    }

    pub fn command_line(&self) -> &str {
        &self.session.command_line
    }

    pub fn register(&self) -> &Register {
        &self.session.register
    }

    pub fn registry(&self) -> &'static CommandRegistry {
        self.registry
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModeObserver>) {
        self.observers.push(observer);
    }

    /// Bind to an input: apply the cursor style of the current state.
    pub fn attach(&mut self, input: &mut dyn TextInput) {
        input.set_cursor_style(self.cursor_style());
    }

    fn cursor_style(&self) -> CursorStyle {
        if self.enabled {
            self.session.mode.cursor_style()
        } else {
            CursorStyle::Line
        }
    }

    /// Toggle emulation. Pending keys are dropped and the modal state is
    /// re-initialized (Normal when enabled, Insert when disabled).
    pub fn set_enabled(&mut self, enabled: bool, input: &mut dyn TextInput) {
        if self.enabled == enabled {
            return;
        }
        self.buffer.clear();
        self.enabled = enabled;
        let from = self.session.mode;
        let to = VimMode::initial(enabled);
        self.session.reset(to);
        tracing::info!(target: "vim.mode", enabled, mode = %to, "vim_toggled");
        input.set_cursor_style(self.cursor_style());
        if from != to {
            self.notify(from, to);
        }
    }

    /// Apply a deferred caret (host's next frame). Returns true when a commit
    /// was settled.
    pub fn settle(&mut self, input: &mut dyn TextInput) -> bool {
        self.session.settle(input)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, input: &mut dyn TextInput) -> KeyOutcome {
        self.handle_key_at(key, input, Instant::now())
    }

    pub fn handle_key_at(
        &mut self,
        key: &KeyEvent,
        input: &mut dyn TextInput,
        now: Instant,
    ) -> KeyOutcome {
        let before = self.session.mode;
        if !self.enabled {
            return self.outcome(before, false);
        }
        self.session.settle(input);
        if self.buffer.expired(now) {
            self.flush_pending(input);
        }
        let token = key.token();
        tracing::trace!(target: "vim.dispatch", mode = %self.session.mode, key = %token, "key");
        let handled = match self.session.mode {
            VimMode::Insert => {
                if self.registry.lookup(VimMode::Insert, &token).is_some() {
                    self.run(&token, 1, input);
                    true
                } else {
                    false
                }
            }
            VimMode::Command => {
                if self.registry.lookup(VimMode::Command, &token).is_some() {
                    self.run(&token, 1, input);
                } else if let Some(c) = key.printable() {
                    self.session.command_line.push(c);
                }
                true
            }
            VimMode::Normal | VimMode::Visual => {
                self.buffer.push(&token, now);
                self.resolve_pending(input, now);
                true
            }
        };
        self.outcome(before, handled)
    }

    /// Flush pending keys whose deadline has passed. `None` when nothing was due.
    pub fn poll_timeout(&mut self, input: &mut dyn TextInput, now: Instant) -> Option<KeyOutcome> {
        if !self.enabled || !self.buffer.expired(now) {
            return None;
        }
        let before = self.session.mode;
        self.session.settle(input);
        self.flush_pending(input);
        Some(self.outcome(before, true))
    }

    /// Run a raw key string (`"3j"`, `"dd"`) directly, bypassing the buffer.
    pub fn execute_command(&mut self, raw: &str, input: &mut dyn TextInput) -> KeyOutcome {
        let before = self.session.mode;
        if !self.enabled {
            return self.outcome(before, false);
        }
        self.session.settle(input);
        let parsed = parse_key(raw);
        self.run(parsed.action, parsed.count, input);
        self.outcome(before, true)
    }

    fn resolve_pending(&mut self, input: &mut dyn TextInput, now: Instant) {
        loop {
            let table = self.registry.table(self.session.mode);
            match self.buffer.resolve(&table) {
                Resolution::NeedMore => break,
                Resolution::Execute { count, action } => {
                    self.run(&action, count, input);
                    break;
                }
                Resolution::Unrelated { key } => {
                    tracing::trace!(target: "vim.dispatch", key = %key, "sequence_abandoned");
                    self.buffer.push(&key, now);
                }
                Resolution::Unknown { action } => {
                    self.report_unknown(&action);
                    break;
                }
            }
        }
    }

    fn flush_pending(&mut self, input: &mut dyn TextInput) {
        let table = self.registry.table(self.session.mode);
        match self.buffer.flush(&table) {
            Some(Resolution::Execute { count, action }) => self.run(&action, count, input),
            Some(Resolution::Unknown { action }) => self.report_unknown(&action),
            _ => {}
        }
    }

    /// Look `action` up in the current mode and execute it `count` times.
    fn run(&mut self, action: &str, count: u32, input: &mut dyn TextInput) {
        let mode = self.session.mode;
        let Some(command) = self.registry.lookup(mode, action).copied() else {
            self.report_unknown(action);
            return;
        };
        tracing::debug!(target: "vim.dispatch", mode = %mode, key = command.key, count, "execute");
        for pass in 0..count {
            self.session.begin_pass(pass);
            let from = self.session.mode;
            {
                let mut ctx = VimContext::new(&mut *input, &mut self.session);
                (command.execute)(&mut ctx);
            }
            let to = self.session.mode;
            if from != to {
                self.buffer.clear();
                input.set_cursor_style(to.cursor_style());
                tracing::debug!(target: "vim.mode", from = %from, to = %to, "mode_change");
                self.notify(from, to);
            }
            if self.session.repeat_stopped() {
                break;
            }
        }
    }

    fn report_unknown(&self, action: &str) {
        if self.registry.is_recognized(action) {
            tracing::warn!(target: "vim.dispatch", mode = %self.session.mode, key = action, "command_not_implemented");
        }
    }

    fn notify(&self, from: VimMode, to: VimMode) {
        for observer in &self.observers {
            observer.on_mode_change(from, to);
        }
    }

    fn outcome(&mut self, before: VimMode, handled: bool) -> KeyOutcome {
        KeyOutcome {
            handled,
            mode: self.session.mode,
            mode_changed: before != self.session.mode,
            requests: self.session.take_requests(),
            message: self.session.take_message(),
            pending: self.buffer.pending(),
        }
    }
}
