#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use std::io;
use std::sync::{Arc, Mutex};

use core_terminal::{
    CloseHandler, CloseReason, Connection, SignalHandler, Size, SizeHandler, StdinHandler,
    StdoutHandler,
};

/// In-process connection: tests push input with `read` and inspect what the
/// session wrote with `output`.
#[derive(Default)]
pub struct TestConnection {
    stdin: Mutex<Option<StdinHandler>>,
    size_handler: Mutex<Option<SizeHandler>>,
    signal: Mutex<Option<SignalHandler>>,
    close: Mutex<Option<CloseHandler>>,
    output: Arc<Mutex<String>>,
}

impl TestConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn read(&self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let handler = self.stdin.lock().unwrap().clone();
        handler.expect("stdin handler installed")(&chars);
    }

    pub fn resize(&self, size: Size) {
        let handler = self.size_handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(size);
        }
    }

    pub fn output(&self) -> String {
        self.output.lock().unwrap().clone()
    }

    /// Output with escape sequences removed.
    pub fn plain_output(&self) -> String {
        core_text::strip_ansi(&self.output())
    }
}

impl Connection for TestConnection {
    fn terminal_type(&self) -> Option<&str> {
        Some("test-term")
    }

    fn size(&self) -> Size {
        Size::new(80, 20)
    }

    fn set_stdin_handler(&self, handler: Option<StdinHandler>) {
        *self.stdin.lock().unwrap() = handler;
    }

    fn stdin_handler(&self) -> Option<StdinHandler> {
        self.stdin.lock().unwrap().clone()
    }

    fn set_size_handler(&self, handler: Option<SizeHandler>) {
        *self.size_handler.lock().unwrap() = handler;
    }

    fn set_signal_handler(&self, handler: Option<SignalHandler>) {
        *self.signal.lock().unwrap() = handler;
    }

    fn set_close_handler(&self, handler: Option<CloseHandler>) {
        *self.close.lock().unwrap() = handler;
    }

    fn stdout_handler(&self) -> StdoutHandler {
        let output = Arc::clone(&self.output);
        Arc::new(move |chars: &[char]| -> io::Result<()> {
            output.lock().unwrap().extend(chars.iter());
            Ok(())
        })
    }

    fn close(&self) {
        let handler = self.close.lock().unwrap().take();
        if let Some(handler) = handler {
            handler(CloseReason::Requested);
        }
    }
}

/// Collects delivered lines.
#[derive(Clone, Default)]
pub struct Lines(pub Arc<Mutex<Vec<String>>>);

impl Lines {
    pub fn sink(&self) -> impl FnOnce(String) + Send + 'static {
        let lines = Arc::clone(&self.0);
        move |line| lines.lock().unwrap().push(line)
    }

    pub fn get(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
