//! A readline session: wires a `Connection` to an `InputProcessor`.
//!
//! `readline` draws the prompt and installs a stdin handler. The handler runs
//! on the connection's reader thread, feeds decoded input to the processor,
//! writes the resulting output, and hands the accepted line to the callback
//! after releasing the processor lock, so the callback may start the next
//! read. Input that arrives after a line was accepted stays queued in the
//! processor and is replayed by the next `readline` call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use core_actions::{InputProcessor, ReadlineFlags};
use core_completion::Completer;
use core_config::{Config, EditingMode, PermissionConfig};
use core_history::{FileAccessPermission, FileHistory, History, HistoryError, InMemoryHistory};
use core_keymap::{EditMode, Keymap};
use core_state::Prompt;
use core_terminal::{Connection, Size, StdoutHandler};
use tracing::{debug, warn};

type Callback = Box<dyn FnOnce(String) + Send>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn permission(config: &PermissionConfig) -> FileAccessPermission {
    FileAccessPermission {
        readable: config.readable,
        readable_owner_only: config.readable_owner_only,
        writable: config.writable,
        writable_owner_only: config.writable_owner_only,
        executable: config.executable,
        executable_owner_only: config.executable_owner_only,
    }
}

/// History store described by the `[history]` section.
pub fn history_from_config(config: &Config) -> Result<Box<dyn History>, HistoryError> {
    let section = &config.file.history;
    if !section.enabled {
        let mut history = InMemoryHistory::new(section.size)?;
        history.set_enabled(false);
        return Ok(Box::new(history));
    }
    match section.resolved_file() {
        Some(path) => Ok(Box::new(FileHistory::open(
            path,
            section.size,
            permission(&section.permission),
        )?)),
        None => {
            debug!(target: "readline", "no_history_file_location");
            Ok(Box::new(InMemoryHistory::new(section.size)?))
        }
    }
}

/// Keymap for the configured edit mode with `[bindings]` applied. Bindings
/// with an invalid key spec or an unknown action are skipped with a warning.
pub fn keymap_from_config(config: &Config, known: impl Fn(&str) -> bool) -> Keymap {
    let mut keymap = Keymap::new(match config.file.editing.mode {
        EditingMode::Emacs => EditMode::Emacs,
        EditingMode::Vi => EditMode::Vi,
    });
    for (spec, action) in &config.file.bindings {
        if !known(action) {
            warn!(target: "readline", spec = %spec, action = %action, "binding_unknown_action");
            continue;
        }
        if let Err(e) = keymap.bind_spec(spec, action) {
            warn!(target: "readline", spec = %spec, error = %e, "binding_invalid_key");
        }
    }
    keymap
}

pub struct Readline {
    processor: Arc<Mutex<InputProcessor>>,
}

impl Readline {
    /// Session configured from `config`. Fails only when the history store
    /// cannot be created.
    pub fn new(config: &Config) -> Result<Self, HistoryError> {
        let history = history_from_config(config)?;
        let flags = ReadlineFlags {
            quote_continuation: config.file.editing.quote_continuation,
        };
        let registry = core_actions::ActionRegistry::with_builtins();
        let keymap = keymap_from_config(config, |name| registry.contains(name));
        Ok(Self::with_parts(history, keymap, flags))
    }

    pub fn with_parts(history: Box<dyn History>, keymap: Keymap, flags: ReadlineFlags) -> Self {
        let processor = InputProcessor::new(Prompt::new(""), history, keymap, flags);
        Self {
            processor: Arc::new(Mutex::new(processor)),
        }
    }

    pub fn add_completer(&self, completer: Box<dyn Completer>) {
        lock(&self.processor).add_completer(completer);
    }

    /// Run `f` with exclusive access to the processor.
    pub fn with_processor<T>(&self, f: impl FnOnce(&mut InputProcessor) -> T) -> T {
        f(&mut lock(&self.processor))
    }

    /// Read one line from `conn`. `callback` runs exactly once, on the
    /// thread that delivers the final keystroke (or on this thread when
    /// queued input already completes the line).
    pub fn readline<C>(&self, conn: &C, prompt: Prompt, callback: impl FnOnce(String) + Send + 'static)
    where
        C: Connection + ?Sized,
    {
        let stdout = conn.stdout_handler();
        let replayed = {
            let mut processor = lock(&self.processor);
            processor.set_terminal_width(usize::from(conn.size().columns));
            processor.begin_line(prompt);
            let line = if processor.has_queued_input() {
                processor.run()
            } else {
                None
            };
            write_output(&stdout, &mut processor);
            line
        };
        debug!(target: "readline", replayed = replayed.is_some(), "readline_started");

        let mut callback: Option<Callback> = Some(Box::new(callback));
        let pending = if replayed.is_some() { None } else { callback.take() };
        let slot = Arc::new(Mutex::new(pending));
        let processor = Arc::clone(&self.processor);
        let handler_slot = Arc::clone(&slot);
        let handler_stdout = Arc::clone(&stdout);
        conn.set_stdin_handler(Some(Arc::new(move |input: &[char]| {
            let accepted = {
                let mut processor = lock(&processor);
                processor.feed(input);
                // Once the line is delivered, further input waits for the next read.
                if lock(&handler_slot).is_none() {
                    return;
                }
                let line = processor.run();
                write_output(&handler_stdout, &mut processor);
                line
            };
            if let Some(line) = accepted {
                debug!(target: "readline", len = line.len(), "line_delivered");
                let callback = lock(&handler_slot).take();
                if let Some(callback) = callback {
                    callback(line);
                }
            }
        })));

        let processor = Arc::clone(&self.processor);
        conn.set_size_handler(Some(Arc::new(move |size: Size| {
            lock(&processor).set_terminal_width(usize::from(size.columns));
        })));

        if let (Some(line), Some(callback)) = (replayed, callback) {
            callback(line);
        }
    }

    /// Flush history to its durable store.
    pub fn stop(&self) -> Result<(), HistoryError> {
        let result = lock(&self.processor).stop();
        if let Err(e) = &result {
            warn!(target: "readline", error = %e, "history_flush_failed");
        }
        result
    }
}

fn write_output(stdout: &StdoutHandler, processor: &mut InputProcessor) {
    let out = processor.take_output();
    if out.is_empty() {
        return;
    }
    let chars: Vec<char> = out.chars().collect();
    if let Err(e) = stdout(&chars) {
        warn!(target: "readline", error = %e, "write_failed");
    }
}
