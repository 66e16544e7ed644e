//! Per-dispatcher session state and the per-execution command context.
//!
//! Cursor ordering contract: `VimContext::update_value` commits the new
//! value to the input immediately but parks the requested caret in the
//! session. Until the host's next frame calls `VimSession::settle`, every
//! selection write lands in that parked slot, so the input never receives a
//! selection before the value it refers to.

use crate::{HostRequest, Register, Selection, TextInput, VimMode};
use core_text::{clamp_offset, grapheme};

#[derive(Debug, Clone)]
pub struct VimSession {
    pub mode: VimMode,
    pub register: Register,
    /// `:` line including the leading colon while in Command mode.
    pub command_line: String,
    visual_anchor: Option<usize>,
    visual_head: usize,
    pending_cursor: Option<Selection>,
    value_unsettled: bool,
    /// Zero-based pass of a counted command (`3dd` runs passes 0, 1, 2).
    pass: u32,
    repeat_stopped: bool,
    requests: Vec<HostRequest>,
    message: Option<String>,
}

impl VimSession {
    pub fn new(mode: VimMode) -> Self {
        Self {
            mode,
            register: Register::default(),
            command_line: String::new(),
            visual_anchor: None,
            visual_head: 0,
            pending_cursor: None,
            value_unsettled: false,
            pass: 0,
            repeat_stopped: false,
            requests: Vec::new(),
            message: None,
        }
    }

    /// Reset modal state for a new mode (used when emulation is toggled).
    /// The register and any unsettled cursor survive.
    pub fn reset(&mut self, mode: VimMode) {
        self.mode = mode;
        self.command_line.clear();
        self.visual_anchor = None;
        self.visual_head = 0;
    }

    /// A value was committed and its caret has not been applied yet.
    pub fn has_unsettled_commit(&self) -> bool {
        self.value_unsettled
    }

    /// Apply the parked caret. Returns true when a commit was settled.
    pub fn settle(&mut self, input: &mut dyn TextInput) -> bool {
        if !self.value_unsettled {
            return false;
        }
        if let Some(sel) = self.pending_cursor.take() {
            input.set_selection(sel);
        }
        self.value_unsettled = false;
        true
    }

    /// Start pass `pass` of a counted command.
    pub fn begin_pass(&mut self, pass: u32) {
        self.pass = pass;
        self.repeat_stopped = false;
    }

    /// The running command asked for its remaining passes to be skipped.
    pub fn repeat_stopped(&self) -> bool {
        self.repeat_stopped
    }

    pub fn visual_anchor(&self) -> Option<usize> {
        self.visual_anchor
    }

    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }
}

/// Everything a command may read or change. Built fresh per execution.
pub struct VimContext<'a> {
    input: &'a mut dyn TextInput,
    session: &'a mut VimSession,
}

impl<'a> VimContext<'a> {
    pub fn new(input: &'a mut dyn TextInput, session: &'a mut VimSession) -> Self {
        Self { input, session }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Effective selection: the parked one while a commit is unsettled.
    pub fn selection(&self) -> Selection {
        if self.session.value_unsettled {
            self.session
                .pending_cursor
                .unwrap_or_else(|| self.input.selection())
        } else {
            self.input.selection()
        }
    }

    /// Caret offset. In Visual mode this is the moving end of the selection.
    pub fn cursor(&self) -> usize {
        match self.session.mode {
            VimMode::Visual => clamp_offset(self.value(), self.session.visual_head),
            _ => self.selection().start,
        }
    }

    pub fn mode(&self) -> VimMode {
        self.session.mode
    }

    pub fn pass(&self) -> u32 {
        self.session.pass
    }

    /// Skip the remaining passes of a counted command (`5dd` on two lines).
    pub fn stop_repeat(&mut self) {
        self.session.repeat_stopped = true;
    }

    /// Switch mode. Entering Visual anchors at the caret; leaving it collapses
    /// the selection onto the moving end. Cursor style and observers are the
    /// dispatcher's concern.
    pub fn set_mode(&mut self, mode: VimMode) {
        let from = self.session.mode;
        if from == mode {
            return;
        }
        if mode == VimMode::Visual {
            let pos = self.cursor();
            self.session.visual_anchor = Some(pos);
            self.session.visual_head = pos;
        }
        if mode == VimMode::Command {
            self.session.command_line = ":".to_string();
        } else if from == VimMode::Command {
            self.session.command_line.clear();
        }
        self.session.mode = mode;
        if mode == VimMode::Visual {
            self.sync_visual_selection();
        } else if from == VimMode::Visual {
            let head = clamp_offset(self.value(), self.session.visual_head);
            self.session.visual_anchor = None;
            self.write_selection(Selection::caret(head));
        }
    }

    /// Commit a new value now; place the caret (if given) once the host settles.
    pub fn update_value(&mut self, value: String, cursor: Option<usize>) {
        self.input.set_value(value);
        self.session.value_unsettled = true;
        self.session.pending_cursor =
            cursor.map(|c| Selection::caret(clamp_offset(self.input.value(), c)));
        if self.session.mode == VimMode::Visual
            && let Some(c) = cursor
        {
            self.session.visual_head = c;
        }
    }

    /// Move the caret (or the moving end of a Visual selection).
    pub fn set_cursor(&mut self, pos: usize) {
        let pos = clamp_offset(self.value(), pos);
        if self.session.mode == VimMode::Visual {
            self.session.visual_head = pos;
            self.sync_visual_selection();
        } else {
            self.write_selection(Selection::caret(pos));
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.write_selection(selection);
    }

    /// Inclusive Visual range as a half-open selection (covers the cluster under the head).
    /// Both ends are clamped to the current value, which the host may have
    /// replaced since they were recorded.
    pub fn visual_selection(&self) -> Option<Selection> {
        let text = self.value();
        let anchor = clamp_offset(text, self.session.visual_anchor?);
        let head = clamp_offset(text, self.session.visual_head);
        let (lo, hi) = (anchor.min(head), anchor.max(head));
        let end = grapheme::next_boundary(text, hi);
        Some(Selection::new(lo, end))
    }

    /// Exchange the anchor and the moving end (`o` in Visual mode).
    pub fn swap_visual_anchor(&mut self) {
        if let Some(anchor) = self.session.visual_anchor {
            self.session.visual_anchor = Some(self.session.visual_head);
            self.session.visual_head = anchor;
            self.sync_visual_selection();
        }
    }

    pub fn register(&self) -> &Register {
        &self.session.register
    }

    pub fn set_register(&mut self, register: Register) {
        self.session.register = register;
    }

    pub fn request(&mut self, request: HostRequest) {
        self.session.requests.push(request);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.session.message = Some(message.into());
    }

    pub fn command_line(&self) -> &str {
        &self.session.command_line
    }

    pub fn command_line_mut(&mut self) -> &mut String {
        &mut self.session.command_line
    }

    fn sync_visual_selection(&mut self) {
        if let Some(sel) = self.visual_selection() {
            self.write_selection(sel);
        }
    }

    fn write_selection(&mut self, selection: Selection) {
        if self.session.value_unsettled {
            self.session.pending_cursor = Some(selection);
        } else {
            self.input.set_selection(selection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextArea;

    #[test]
    fn update_value_defers_caret_until_settle() {
        let mut area = TextArea::with_caret("hello world", 0);
        let mut session = VimSession::new(VimMode::Normal);
        {
            let mut ctx = VimContext::new(&mut area, &mut session);
            ctx.update_value("hello".into(), Some(2));
            assert_eq!(ctx.cursor(), 2);
        }
        // Input still shows the element's own post-commit caret.
        assert_eq!(area.selection(), Selection::caret(5));
        assert!(session.settle(&mut area));
        assert_eq!(area.selection(), Selection::caret(2));
        assert!(!session.settle(&mut area));
    }

    #[test]
    fn selection_writes_after_commit_are_parked() {
        let mut area = TextArea::with_caret("abc", 0);
        let mut session = VimSession::new(VimMode::Normal);
        {
            let mut ctx = VimContext::new(&mut area, &mut session);
            ctx.update_value("abcdef".into(), None);
            ctx.set_cursor(1);
        }
        assert_eq!(area.selection(), Selection::caret(6));
        session.settle(&mut area);
        assert_eq!(area.selection(), Selection::caret(1));
    }

    #[test]
    fn visual_mode_tracks_anchor_and_head() {
        let mut area = TextArea::with_caret("abcdef", 1);
        let mut session = VimSession::new(VimMode::Normal);
        let mut ctx = VimContext::new(&mut area, &mut session);
        ctx.set_mode(VimMode::Visual);
        assert_eq!(ctx.selection(), Selection::new(1, 2));
        ctx.set_cursor(3);
        assert_eq!(ctx.visual_selection(), Some(Selection::new(1, 4)));
        ctx.swap_visual_anchor();
        assert_eq!(ctx.cursor(), 1);
        ctx.set_mode(VimMode::Normal);
        assert_eq!(ctx.selection(), Selection::caret(1));
        assert_eq!(ctx.visual_selection(), None);
    }

    #[test]
    fn visual_range_clamps_after_host_rewrite() {
        let mut area = TextArea::with_caret("abcdef", 0);
        let mut session = VimSession::new(VimMode::Normal);
        {
            let mut ctx = VimContext::new(&mut area, &mut session);
            ctx.set_mode(VimMode::Visual);
            ctx.set_cursor(5);
        }
        area.set_value("ab".into());
        let ctx = VimContext::new(&mut area, &mut session);
        assert_eq!(ctx.visual_selection(), Some(Selection::new(0, 2)));
        assert_eq!(ctx.cursor(), 2);

        let mut area = TextArea::with_caret("h\u{e9}llo", 0);
        let mut session = VimSession::new(VimMode::Normal);
        {
            let mut ctx = VimContext::new(&mut area, &mut session);
            ctx.set_mode(VimMode::Visual);
            ctx.set_cursor(3);
        }
        // byte 3 now falls inside the second cluster
        area.set_value("\u{e9}\u{e9}".into());
        let ctx = VimContext::new(&mut area, &mut session);
        assert_eq!(ctx.visual_selection(), Some(Selection::new(0, 4)));
    }

    #[test]
    fn stop_repeat_lasts_one_pass() {
        let mut area = TextArea::new("");
        let mut session = VimSession::new(VimMode::Normal);
        session.begin_pass(1);
        {
            let mut ctx = VimContext::new(&mut area, &mut session);
            assert_eq!(ctx.pass(), 1);
            ctx.stop_repeat();
        }
        assert!(session.repeat_stopped());
        session.begin_pass(0);
        assert!(!session.repeat_stopped());
    }

    #[test]
    fn command_mode_seeds_colon() {
        let mut area = TextArea::new("");
        let mut session = VimSession::new(VimMode::Normal);
        let mut ctx = VimContext::new(&mut area, &mut session);
        ctx.set_mode(VimMode::Command);
        assert_eq!(ctx.command_line(), ":");
        ctx.set_mode(VimMode::Normal);
        assert_eq!(ctx.command_line(), "");
    }
}
