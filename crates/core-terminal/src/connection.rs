//! `Connection` over any `Read`/`Write` pair.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tracing::{debug, trace, warn};

use crate::{
    Charset, CloseHandler, CloseReason, Connection, Decoder, Encoder, Signal, SignalHandler, Size,
    SizeHandler, StdinHandler, StdoutHandler,
};

pub const READ_BUFFER_SIZE: usize = 1024;

const INTERRUPT: char = '\u{3}';

#[derive(Default)]
struct Handlers {
    stdin: Option<StdinHandler>,
    size: Option<SizeHandler>,
    signal: Option<SignalHandler>,
    close: Option<CloseHandler>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TerminalConnection<R, W> {
    input: Mutex<Option<R>>,
    output: Arc<Mutex<W>>,
    charset: Charset,
    terminal_type: Option<String>,
    size: Mutex<Size>,
    handlers: Mutex<Handlers>,
    closed: AtomicBool,
}

impl TerminalConnection<io::Stdin, io::Stdout> {
    /// Connection on the process's stdin/stdout. Size and terminal type come
    /// from the environment.
    pub fn stdio(charset: Charset) -> Self {
        let mut conn = Self::with_charset(io::stdin(), io::stdout(), charset);
        conn.terminal_type = std::env::var("TERM").ok();
        conn.size = Mutex::new(Size::detect());
        conn
    }
}

impl<R, W> TerminalConnection<R, W>
where
    R: Read + Send,
    W: Write + Send + 'static,
{
    pub fn new(input: R, output: W) -> Self {
        Self::with_charset(input, output, Charset::default())
    }

    pub fn with_charset(input: R, output: W, charset: Charset) -> Self {
        Self {
            input: Mutex::new(Some(input)),
            output: Arc::new(Mutex::new(output)),
            charset,
            terminal_type: None,
            size: Mutex::new(Size::default()),
            handlers: Mutex::new(Handlers::default()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Record a new size and notify the size handler.
    pub fn set_size(&self, size: Size) {
        *lock(&self.size) = size;
        let handler = lock(&self.handlers).size.clone();
        debug!(target: "terminal.reader", columns = size.columns, rows = size.rows, "resize");
        if let Some(handler) = handler {
            handler(size);
        }
    }

    /// Close with an explicit reason. Only the first close reaches the
    /// close handler.
    pub fn close_with(&self, reason: CloseReason) {
        if self.closed.swap(true, Ordering::AcqRel) {
            trace!(target: "terminal.reader", %reason, "close_ignored");
            return;
        }
        debug!(target: "terminal.reader", %reason, "closed");
        let handler = lock(&self.handlers).close.take();
        if let Some(handler) = handler {
            handler(reason);
        }
    }

    /// Run the read loop on the calling thread until end of stream, a read
    /// error, or `close`. Returns immediately if the reader already ran.
    pub fn start_blocking_reader(&self) {
        let Some(mut input) = lock(&self.input).take() else {
            warn!(target: "terminal.reader", "reader_already_started");
            return;
        };
        let mut decoder = Decoder::new(self.charset);
        let mut buf = [0u8; READ_BUFFER_SIZE];
        debug!(target: "terminal.reader", charset = ?self.charset, "reader_started");
        while !self.is_closed() {
            match input.read(&mut buf) {
                Ok(0) => {
                    self.close_with(CloseReason::EndOfStream);
                    break;
                }
                Ok(n) => {
                    let chars = decoder.decode(&buf[..n]);
                    trace!(target: "terminal.reader", bytes = n, chars = chars.len(), pending = decoder.pending(), "read");
                    if !chars.is_empty() {
                        self.deliver(&chars);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(target: "terminal.reader", error = %e, "read_failed");
                    self.close_with(CloseReason::Failed(e));
                    break;
                }
            }
        }
        debug!(target: "terminal.reader", "reader_stopped");
    }

    fn deliver(&self, chars: &[char]) {
        let (stdin, signal) = {
            let handlers = lock(&self.handlers);
            (handlers.stdin.clone(), handlers.signal.clone())
        };
        if let (&[INTERRUPT], Some(signal)) = (chars, signal) {
            signal(Signal::Int);
            return;
        }
        match stdin {
            Some(handler) => handler(chars),
            None => trace!(target: "terminal.reader", chars = chars.len(), "input_without_handler"),
        }
    }
}

impl<R, W> TerminalConnection<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Run the read loop on a dedicated named thread.
    pub fn spawn_reader(self: Arc<Self>) -> io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("oxline-reader".into())
            .spawn(move || self.start_blocking_reader())
    }
}

impl<R, W> Connection for TerminalConnection<R, W>
where
    R: Read + Send,
    W: Write + Send + 'static,
{
    fn terminal_type(&self) -> Option<&str> {
        self.terminal_type.as_deref()
    }

    fn size(&self) -> Size {
        *lock(&self.size)
    }

    fn set_stdin_handler(&self, handler: Option<StdinHandler>) {
        lock(&self.handlers).stdin = handler;
    }

    fn stdin_handler(&self) -> Option<StdinHandler> {
        lock(&self.handlers).stdin.clone()
    }

    fn set_size_handler(&self, handler: Option<SizeHandler>) {
        lock(&self.handlers).size = handler;
    }

    fn set_signal_handler(&self, handler: Option<SignalHandler>) {
        lock(&self.handlers).signal = handler;
    }

    fn set_close_handler(&self, handler: Option<CloseHandler>) {
        lock(&self.handlers).close = handler;
    }

    fn stdout_handler(&self) -> StdoutHandler {
        let output = Arc::clone(&self.output);
        let encoder = Encoder::new(self.charset);
        Arc::new(move |chars: &[char]| {
            let bytes = encoder.encode(chars);
            let mut out = lock(&output);
            out.write_all(&bytes)?;
            out.flush()
        })
    }

    fn close(&self) {
        self.close_with(CloseReason::Requested);
    }
}
