//! The editable line: code points, logical cursor, prompt and multi-line
//! accumulation. Nothing here records undo state; see `ConsoleBuffer`.

use core_text::{LINE_SEPARATOR, visible_width};

/// Prompt shown while a multi-line read is being continued.
pub const CONTINUATION_PROMPT: &str = "> ";

/// How masked input is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    /// Nothing is echoed.
    Hidden,
    /// One glyph per character.
    Glyph(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    text: String,
    mask: Option<Mask>,
}

impl Prompt {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            mask: None,
        }
    }

    pub fn masked<S: Into<String>>(text: S, mask: Mask) -> Self {
        Self {
            text: text.into(),
            mask: Some(mask),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mask(&self) -> Option<Mask> {
        self.mask
    }

    pub fn is_masking(&self) -> bool {
        self.mask.is_some()
    }

    pub fn width(&self) -> usize {
        visible_width(&self.text)
    }
}

/// Editable line state. `cursor` is the logical index into `line` and is kept
/// in `[0, len]`; the on-screen column is derived by `display_cursor` since it
/// diverges from the logical index whenever masking is active.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    line: Vec<char>,
    cursor: usize,
    multi_line: bool,
    multi_line_buffer: Vec<char>,
    prompt: Prompt,
    main_prompt: Prompt,
}

impl Buffer {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt: prompt.clone(),
            main_prompt: prompt,
            ..Self::default()
        }
    }

    pub fn line(&self) -> &[char] {
        &self.line
    }

    pub fn as_string(&self) -> String {
        self.line.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Terminal columns between the end of the prompt and the cursor.
    pub fn display_cursor(&self) -> usize {
        match self.prompt.mask() {
            Some(Mask::Hidden) => 0,
            Some(Mask::Glyph(_)) => self.cursor,
            None => {
                let before: String = self.line[..self.cursor].iter().collect();
                visible_width(&before)
            }
        }
    }

    pub fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    /// Replace the prompt used for this and every following read.
    pub fn set_prompt(&mut self, prompt: Prompt) {
        self.prompt = prompt.clone();
        self.main_prompt = prompt;
    }

    pub fn set_masking(&mut self, mask: Option<Mask>) {
        self.prompt.mask = mask;
        self.main_prompt.mask = mask;
    }

    pub fn is_masking(&self) -> bool {
        self.prompt.is_masking()
    }

    /// Insert at the cursor and advance past the inserted text.
    pub fn insert(&mut self, text: &[char]) {
        let at = self.cursor;
        self.line.splice(at..at, text.iter().copied());
        self.cursor += text.len();
    }

    /// Remove up to `n` characters starting at the cursor.
    pub fn delete_forward(&mut self, n: usize) -> Vec<char> {
        let end = (self.cursor + n).min(self.line.len());
        self.line.drain(self.cursor..end).collect()
    }

    /// Remove up to `n` characters before the cursor.
    pub fn delete_previous(&mut self, n: usize) -> Vec<char> {
        let start = self.cursor.saturating_sub(n);
        let removed: Vec<char> = self.line.drain(start..self.cursor).collect();
        self.cursor = start;
        removed
    }

    /// Remove `[start, end)` (clamped) and leave the cursor at `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Vec<char> {
        let end = end.min(self.line.len());
        let start = start.min(end);
        let removed: Vec<char> = self.line.drain(start..end).collect();
        self.cursor = start;
        removed
    }

    /// Overwrite the character at `pos`. Returns false when `pos` is past the end.
    pub fn replace_char(&mut self, c: char, pos: usize) -> bool {
        match self.line.get_mut(pos) {
            Some(slot) => {
                *slot = c;
                true
            }
            None => false,
        }
    }

    /// Replace the whole line and put the cursor at its end.
    pub fn replace(&mut self, text: &[char]) {
        self.line = text.to_vec();
        self.cursor = self.line.len();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, self.line.len() as isize) as usize;
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.line.len());
    }

    /// Empty the line, leave multi-line mode and restore the main prompt.
    pub fn reset(&mut self) {
        self.line.clear();
        self.cursor = 0;
        self.multi_line = false;
        self.multi_line_buffer.clear();
        self.prompt = self.main_prompt.clone();
    }

    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    pub fn set_multi_line(&mut self, multi_line: bool) {
        self.multi_line = multi_line;
    }

    /// Fold the current line into the accumulated multi-line text. One trailing
    /// continuation backslash is dropped; each folded line ends with the
    /// platform line separator.
    pub fn append_to_multi_line(&mut self) {
        let mut folded = std::mem::take(&mut self.line);
        if folded.last() == Some(&'\\') {
            folded.pop();
        }
        self.multi_line_buffer.extend(folded);
        self.multi_line_buffer.extend(LINE_SEPARATOR.chars());
        self.cursor = 0;
        self.prompt = Prompt {
            text: CONTINUATION_PROMPT.to_string(),
            mask: self.main_prompt.mask,
        };
    }

    /// Accumulated lines followed by the current one.
    pub fn multi_line_text(&self) -> String {
        self.multi_line_buffer
            .iter()
            .chain(self.line.iter())
            .collect()
    }

    /// The characters drawn after the prompt.
    pub fn visible_line(&self) -> String {
        match self.prompt.mask() {
            Some(Mask::Hidden) => String::new(),
            Some(Mask::Glyph(g)) => std::iter::repeat_n(g, self.line.len()).collect(),
            None => self.as_string(),
        }
    }
}
