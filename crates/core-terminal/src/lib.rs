//! Terminal I/O boundary: a byte-stream connection that decodes input to
//! code points and hands it to a registered handler.
//!
//! Each connection runs one blocking read loop. Handlers are single-slot:
//! registering a new one replaces the previous. Every handler is invoked on
//! the reader thread, outside the connection's internal locks, so a handler
//! may re-register handlers or close the connection.

use std::fmt;
use std::io;
use std::sync::Arc;

pub mod backend;
pub mod codec;
pub mod connection;

pub use backend::{CrosstermBackend, RawModeGuard, TerminalBackend};
pub use codec::{Charset, Decoder, Encoder};
pub use connection::{READ_BUFFER_SIZE, TerminalConnection};

/// Fallback when the terminal cannot report its size.
pub const DEFAULT_SIZE: Size = Size {
    columns: 80,
    rows: 24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub columns: u16,
    pub rows: u16,
}

impl Size {
    pub const fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    /// Size of the process terminal, or `DEFAULT_SIZE` when there is none.
    pub fn detect() -> Self {
        match crossterm::terminal::size() {
            Ok((columns, rows)) if columns > 0 && rows > 0 => Self { columns, rows },
            _ => DEFAULT_SIZE,
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        DEFAULT_SIZE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Interrupt (a lone Ctrl-C byte in raw mode).
    Int,
}

/// Why a connection closed.
#[derive(Debug)]
pub enum CloseReason {
    Requested,
    EndOfStream,
    Failed(io::Error),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("requested"),
            Self::EndOfStream => f.write_str("end of stream"),
            Self::Failed(e) => write!(f, "read failed: {e}"),
        }
    }
}

pub type StdinHandler = Arc<dyn Fn(&[char]) + Send + Sync>;
pub type SizeHandler = Arc<dyn Fn(Size) + Send + Sync>;
pub type SignalHandler = Arc<dyn Fn(Signal) + Send + Sync>;
pub type CloseHandler = Box<dyn FnOnce(CloseReason) + Send>;
/// Encodes code points and writes them to the connection's sink.
pub type StdoutHandler = Arc<dyn Fn(&[char]) -> io::Result<()> + Send + Sync>;

/// A bidirectional terminal session.
pub trait Connection: Send + Sync {
    /// Terminal type (`$TERM` style), when known.
    fn terminal_type(&self) -> Option<&str>;

    fn size(&self) -> Size;

    fn set_stdin_handler(&self, handler: Option<StdinHandler>);

    fn stdin_handler(&self) -> Option<StdinHandler>;

    fn set_size_handler(&self, handler: Option<SizeHandler>);

    fn set_signal_handler(&self, handler: Option<SignalHandler>);

    /// The close handler runs at most once, on the first `close`.
    fn set_close_handler(&self, handler: Option<CloseHandler>);

    fn stdout_handler(&self) -> StdoutHandler;

    fn close(&self);

    /// Encode and write `text` through `stdout_handler`.
    fn write_str(&self, text: &str) -> io::Result<()> {
        let chars: Vec<char> = text.chars().collect();
        (self.stdout_handler())(&chars)
    }
}
