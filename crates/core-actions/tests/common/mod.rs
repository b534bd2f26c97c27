#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{InputProcessor, ReadlineFlags};
use core_events::KeyEvent;
use core_history::InMemoryHistory;
use core_keymap::Keymap;
use core_state::Prompt;

pub const PROMPT: &str = "$ ";

/// One input session driven the way a terminal would drive it.
pub struct Session {
    pub processor: InputProcessor,
}

impl Session {
    pub fn new(keymap: Keymap, flags: ReadlineFlags) -> Self {
        let history = InMemoryHistory::new(50).expect("capacity");
        let mut processor = InputProcessor::new(Prompt::new(PROMPT), Box::new(history), keymap, flags);
        processor.begin_line(Prompt::new(PROMPT));
        Self { processor }
    }

    pub fn emacs() -> Self {
        Self::new(Keymap::emacs(), ReadlineFlags::default())
    }

    pub fn vi() -> Self {
        Self::new(Keymap::vi(), ReadlineFlags::default())
    }

    /// Feed text as one terminal read and return every line it completed.
    pub fn feed(&mut self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        self.processor.feed(&chars);
        self.drain()
    }

    pub fn key(&mut self, key: KeyEvent) -> Vec<String> {
        self.processor.feed(&key.code_points());
        self.drain()
    }

    fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.processor.run() {
            lines.push(line);
        }
        lines
    }

    pub fn line(&self) -> String {
        self.processor.console().buffer().as_string()
    }

    pub fn cursor(&self) -> usize {
        self.processor.console().buffer().cursor()
    }

    pub fn output(&mut self) -> String {
        self.processor.take_output()
    }
}
