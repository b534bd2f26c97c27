//! Edit state for one input session: the line buffer, its undo stack, the
//! kill-ring and the pending terminal output.
//!
//! Undo model:
//! - A contiguous run of self-inserted characters is captured by a *single*
//!   snapshot taken lazily at the first insert of the run.
//! - Every destructive edit (deletes, kills, case changes, line replacement)
//!   ends the run and pushes its own snapshot, so it undoes individually.
//! - Text removed by a destructive edit is appended to the kill-ring and can be
//!   yanked back.
//! - The stack is cleared whenever a line is accepted.
//!
//! Output:
//! - Mutations never write to the terminal directly. `draw_line` and
//!   `write_out` append to an outbox that the session drains after each key
//!   event, so the redraw always follows the mutation that caused it.

pub mod buffer;
pub mod undo;

pub use buffer::{Buffer, CONTINUATION_PROMPT, Mask, Prompt};
pub use undo::{InsertRun, UNDO_STACK_MAX, UndoSnapshot, UndoStack};

use tracing::trace;

/// Bounded kill-ring. Most recent entry last.
#[derive(Debug, Clone, Default)]
pub struct PasteManager {
    entries: Vec<String>,
}

impl PasteManager {
    pub const MAX: usize = 10; // ring capacity

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_text<S: Into<String>>(&mut self, text: S) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if self.entries.len() == Self::MAX {
            let _ = self.entries.remove(0);
        }
        self.entries.push(text);
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A `Buffer` plus the undo, kill-ring and output state that edits touch.
#[derive(Default)]
pub struct ConsoleBuffer {
    buffer: Buffer,
    undo: UndoStack,
    paste: PasteManager,
    outbox: String,
}

impl ConsoleBuffer {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            buffer: Buffer::new(prompt),
            ..Self::default()
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Direct access for edits that need no undo record (cursor motion,
    /// prompt and mode changes).
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    pub fn paste_manager(&self) -> &PasteManager {
        &self.paste
    }

    /// Self-insert typed text as part of the current insert run.
    pub fn insert(&mut self, text: &[char]) {
        if text.is_empty() {
            return;
        }
        self.undo.begin_insert_coalescing(&self.buffer);
        self.buffer.insert(text);
        self.undo.note_insert_edit();
    }

    /// Insert text as one undo unit, outside any insert run (paste, yank,
    /// completion).
    pub fn insert_discrete(&mut self, text: &[char]) {
        if text.is_empty() {
            return;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        self.buffer.insert(text);
    }

    pub fn end_insert_run(&mut self) {
        self.undo.end_insert_coalescing();
    }

    pub fn delete_forward(&mut self, n: usize) -> usize {
        if self.buffer.cursor() >= self.buffer.len() {
            return 0;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        let removed = self.buffer.delete_forward(n);
        self.kill(&removed);
        removed.len()
    }

    pub fn delete_previous(&mut self, n: usize) -> usize {
        if self.buffer.cursor() == 0 {
            return 0;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        let removed = self.buffer.delete_previous(n);
        self.kill(&removed);
        removed.len()
    }

    /// Delete `[start, end)` and leave the cursor at `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) -> usize {
        if start >= end || start >= self.buffer.len() {
            return 0;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        let removed = self.buffer.delete_range(start, end);
        self.kill(&removed);
        removed.len()
    }

    pub fn kill_to_end(&mut self) -> usize {
        let (start, end) = (self.buffer.cursor(), self.buffer.len());
        self.delete_range(start, end)
    }

    pub fn kill_to_start(&mut self) -> usize {
        let end = self.buffer.cursor();
        self.delete_range(0, end)
    }

    pub fn delete_line(&mut self) -> usize {
        let end = self.buffer.len();
        self.delete_range(0, end)
    }

    pub fn replace_char(&mut self, c: char, pos: usize) -> bool {
        if pos >= self.buffer.len() {
            return false;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        self.buffer.replace_char(c, pos)
    }

    /// Swap in a whole new line (history fetch, completion rewrite).
    pub fn replace_line(&mut self, text: &[char]) {
        if self.buffer.line() == text {
            return;
        }
        self.undo.push_discrete_edit_snapshot(&self.buffer);
        self.buffer.replace(text);
    }

    /// Insert the most recent kill-ring entry. Returns false when the ring is empty.
    pub fn yank(&mut self) -> bool {
        let Some(text) = self.paste.last() else {
            return false;
        };
        let chars: Vec<char> = text.chars().collect();
        self.insert_discrete(&chars);
        true
    }

    pub fn undo(&mut self) -> bool {
        self.undo.undo(&mut self.buffer)
    }

    pub fn clear_undo(&mut self) {
        self.undo.clear();
    }

    /// Delete used while masking with no glyph: the user cannot see what a
    /// partial delete would remove, so the whole line goes.
    pub fn delete_with_mask_enabled(&mut self) -> usize {
        let removed = self.delete_line();
        self.draw_line();
        removed
    }

    /// Reset the buffer for the next read.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.undo.clear();
    }

    /// Queue a full redraw of prompt and line, leaving the terminal cursor at
    /// the buffer's display cursor.
    pub fn draw_line(&mut self) {
        self.outbox.push_str("\r\x1b[2K");
        self.outbox.push_str(self.buffer.prompt().text());
        let visible = self.buffer.visible_line();
        self.outbox.push_str(&visible);
        let tail = core_text::visible_width(&visible).saturating_sub(self.buffer.display_cursor());
        if tail > 0 {
            self.outbox.push_str(&format!("\x1b[{tail}D"));
        }
        trace!(target: "state.buffer", len = self.buffer.len(), cursor = self.buffer.cursor(), "draw_line");
    }

    pub fn write_out(&mut self, text: &str) {
        self.outbox.push_str(text);
    }

    /// Drain everything queued for the terminal.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.outbox)
    }

    fn kill(&mut self, removed: &[char]) {
        if !removed.is_empty() {
            self.paste.add_text(removed.iter().collect::<String>());
        }
    }
}
