//! The host text element.
//!
//! `TextInput` is the only way the core touches the host UI. It mirrors the
//! subset of a DOM textarea the dispatcher needs. Hosts must behave like a
//! real element in one respect: `set_value` may move the caret (browsers move
//! it to the end), so callers that want a specific caret after a value change
//! set the selection afterwards. The dispatcher's deferred cursor exists for
//! exactly that ordering.

use crate::{CursorStyle, Selection};
use core_text::clamp_offset;

pub trait TextInput {
    fn value(&self) -> &str;
    fn selection(&self) -> Selection;
    fn set_value(&mut self, value: String);
    fn set_selection(&mut self, selection: Selection);
    fn set_cursor_style(&mut self, style: CursorStyle);
}

/// In-memory textarea.
#[derive(Debug, Clone, Default)]
pub struct TextArea {
    value: String,
    selection: Selection,
    cursor_style: CursorStyle,
    style_changes: usize,
}

impl TextArea {
    /// New element with the caret at the start.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_caret(value: impl Into<String>, pos: usize) -> Self {
        let mut area = Self::new(value);
        area.set_selection(Selection::caret(pos));
        area
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    /// Number of `set_cursor_style` calls received.
    pub fn style_changes(&self) -> usize {
        self.style_changes
    }

    pub fn caret(&self) -> usize {
        self.selection.start
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

impl TextInput for TextArea {
    fn value(&self) -> &str {
        &self.value
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_value(&mut self, value: String) {
        self.value = value;
        self.selection = Selection::caret(self.value.len());
    }

    fn set_selection(&mut self, selection: Selection) {
        let start = clamp_offset(&self.value, selection.start);
        let end = clamp_offset(&self.value, selection.end);
        self.selection = Selection::new(start, end);
    }

    fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
        self.style_changes += 1;
    }
}
