#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{KeyOutcome, VimDispatcher};
use core_events::{KeyCode, KeyEvent, parse_key_script};
use core_state::{Selection, TextArea, TextInput, VimMode};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

pub const TIMEOUT: Duration = Duration::from_millis(1000);

/// A dispatcher bound to an in-memory textarea with a controllable clock.
/// Keys the dispatcher does not handle get the browser's default behavior,
/// and every key is followed by a settle (the host's next frame).
pub struct Harness {
    pub vim: VimDispatcher,
    pub area: TextArea,
    pub now: Instant,
}

impl Harness {
    pub fn new(text: &str, caret: usize) -> Self {
        Self::with_dispatcher(VimDispatcher::new(true, Some(TIMEOUT)), text, caret)
    }

    pub fn with_dispatcher(mut vim: VimDispatcher, text: &str, caret: usize) -> Self {
        let mut area = TextArea::with_caret(text, caret);
        vim.attach(&mut area);
        Self {
            vim,
            area,
            now: Instant::now(),
        }
    }

    pub fn key(&mut self, key: KeyEvent) -> KeyOutcome {
        let out = self.vim.handle_key_at(&key, &mut self.area, self.now);
        if !out.handled {
            host_default(&mut self.area, &key);
        }
        self.vim.settle(&mut self.area);
        out
    }

    pub fn keys(&mut self, script: &str) -> Vec<KeyOutcome> {
        parse_key_script(script)
            .expect("valid key script")
            .into_iter()
            .map(|k| self.key(k))
            .collect()
    }

    /// Outcome of the last key of `script`.
    pub fn last(&mut self, script: &str) -> KeyOutcome {
        self.keys(script).pop().expect("non-empty key script")
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn poll(&mut self) -> Option<KeyOutcome> {
        let out = self.vim.poll_timeout(&mut self.area, self.now);
        self.vim.settle(&mut self.area);
        out
    }

    pub fn value(&self) -> &str {
        self.area.value()
    }

    pub fn caret(&self) -> usize {
        self.area.caret()
    }

    pub fn mode(&self) -> VimMode {
        self.vim.mode()
    }
}

/// What a plain textarea does with a key nobody intercepted.
pub fn host_default(area: &mut TextArea, key: &KeyEvent) {
    let sel = area.selection();
    let text = area.value().to_string();
    let insert = match (key.code, key.printable()) {
        (_, Some(c)) => c.to_string(),
        (KeyCode::Enter, _) => "\n".to_string(),
        (KeyCode::Tab, _) => "\t".to_string(),
        (KeyCode::Backspace, _) => {
            if sel.start == 0 {
                return;
            }
            let start = text[..sel.start]
                .char_indices()
                .last()
                .map_or(0, |(i, _)| i);
            let value = format!("{}{}", &text[..start], &text[sel.end..]);
            area.set_value(value);
            area.set_selection(Selection::caret(start));
            return;
        }
        _ => return,
    };
    let value = format!("{}{}{}", &text[..sel.start], insert, &text[sel.end..]);
    area.set_value(value);
    area.set_selection(Selection::caret(sel.start + insert.len()));
}

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` with a WARN-level subscriber and return its result plus the log text.
pub fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(BufferWriter {
            inner: buffer.clone(),
        })
        .finish();
    let result = with_default(subscriber, f);
    let logs = String::from_utf8(buffer.lock().expect("log buffer poisoned").clone())
        .expect("utf-8 log output");
    (result, logs)
}
