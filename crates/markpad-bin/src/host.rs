//! Headless host used to replay key scripts.
//!
//! Plays the part of the browser textarea: keys the dispatcher leaves
//! unhandled get the element's default behavior, every key is followed by a
//! settle (the next frame), and the host-owned concerns the core delegates
//! (undo history, save, quit) are serviced here.

use core_actions::VimDispatcher;
use core_events::{KeyCode, KeyEvent};
use core_state::{HostRequest, Selection, TextArea, TextInput, VimMode};
use core_text::grapheme;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    value: String,
    caret: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub value: String,
    pub caret: usize,
    pub mode: VimMode,
    pub requests: Vec<HostRequest>,
    pub messages: Vec<String>,
    /// Document content at the last `Save` request.
    pub saved: Option<String>,
    pub quit: bool,
}

pub struct ScriptHost {
    area: TextArea,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    /// An undo step already covers the current Insert session.
    insert_grouped: bool,
}

impl ScriptHost {
    pub fn new(text: &str, caret: usize) -> Self {
        Self {
            area: TextArea::with_caret(text, caret),
            undo: Vec::new(),
            redo: Vec::new(),
            insert_grouped: false,
        }
    }

    pub fn value(&self) -> &str {
        self.area.value()
    }

    /// Feed `keys` through `vim`, all stamped `now`, then flush whatever is
    /// still pending once its deadline passes.
    pub fn replay(
        &mut self,
        vim: &mut VimDispatcher,
        keys: &[KeyEvent],
        now: Instant,
    ) -> ReplayReport {
        vim.attach(&mut self.area);
        let mut report = ReplayReport {
            value: String::new(),
            caret: 0,
            mode: vim.mode(),
            requests: Vec::new(),
            messages: Vec::new(),
            saved: None,
            quit: false,
        };
        for key in keys {
            let before = self.snapshot();
            let out = vim.handle_key_at(key, &mut self.area, now);
            if !out.handled {
                default_action(&mut self.area, key);
            }
            vim.settle(&mut self.area);
            self.record_change(before, out.mode);
            report.messages.extend(out.message);
            for request in out.requests {
                self.service(request, &mut report);
            }
            if report.quit {
                break;
            }
        }
        if !report.quit
            && let Some(deadline) = vim.deadline()
            && let Some(out) = vim.poll_timeout(&mut self.area, deadline)
        {
            vim.settle(&mut self.area);
            report.messages.extend(out.message);
        }
        report.value = self.area.value().to_string();
        report.caret = self.area.caret();
        report.mode = vim.mode();
        report
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            value: self.area.value().to_string(),
            caret: self.area.caret(),
        }
    }

    /// Push an undo step when the value changed. Typing inside one Insert
    /// session collapses into the step that entered it.
    fn record_change(&mut self, before: Snapshot, mode: VimMode) {
        if mode != VimMode::Insert {
            self.insert_grouped = false;
        }
        if before.value == self.area.value() {
            return;
        }
        if mode == VimMode::Insert {
            if self.insert_grouped {
                return;
            }
            self.insert_grouped = true;
        }
        self.undo.push(before);
        self.redo.clear();
    }

    fn service(&mut self, request: HostRequest, report: &mut ReplayReport) {
        debug!(target: "host", ?request, "host_request");
        match request {
            HostRequest::Save => report.saved = Some(self.area.value().to_string()),
            HostRequest::Quit => report.quit = true,
            HostRequest::Undo => {
                if let Some(prev) = self.undo.pop() {
                    let current = self.snapshot();
                    self.restore(prev);
                    self.redo.push(current);
                } else {
                    report.messages.push("Already at oldest change".into());
                }
            }
            HostRequest::Redo => {
                if let Some(next) = self.redo.pop() {
                    let current = self.snapshot();
                    self.restore(next);
                    self.undo.push(current);
                } else {
                    report.messages.push("Already at newest change".into());
                }
            }
        }
        report.requests.push(request);
    }

    fn restore(&mut self, snap: Snapshot) {
        info!(target: "host", len = snap.value.len(), caret = snap.caret, "history_restore");
        self.area.set_value(snap.value);
        self.area.set_selection(Selection::caret(snap.caret));
    }
}

/// What a plain textarea does with a key nobody intercepted.
fn default_action(area: &mut TextArea, key: &KeyEvent) {
    let sel = area.selection();
    let text = area.value().to_string();
    let insert = match (key.code, key.printable()) {
        (_, Some(c)) => c.to_string(),
        (KeyCode::Enter, _) => "\n".to_string(),
        (KeyCode::Tab, _) => "\t".to_string(),
        (KeyCode::Backspace, _) => {
            let start = if sel.is_collapsed() {
                grapheme::prev_boundary(&text, sel.start)
            } else {
                sel.start
            };
            area.set_value(format!("{}{}", &text[..start], &text[sel.end..]));
            area.set_selection(Selection::caret(start));
            return;
        }
        _ => return,
    };
    area.set_value(format!("{}{}{}", &text[..sel.start], insert, &text[sel.end..]));
    area.set_selection(Selection::caret(sel.start + insert.len()));
}
