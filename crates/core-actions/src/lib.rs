//! Edit actions and the input processor that dispatches them.
//!
//! An `Action` is a named edit applied to an explicit `ActionContext`; the
//! keymap maps key events to action names and the `ActionRegistry` maps names
//! to actions. All session state an action may touch is passed in the
//! context, so actions hold no state of their own and the same registry can
//! serve any number of sessions.

use core_completion::Completer;
use core_config::QuoteContinuation;
use core_history::History;
use core_keymap::Layer;
use core_state::ConsoleBuffer;

pub mod dispatcher;

pub use dispatcher::{ActionRegistry, BuiltinAction, DispatchResult, InputProcessor};

/// Session-wide switches consulted by actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadlineFlags {
    pub quote_continuation: QuoteContinuation,
}

/// Everything an action may read or mutate while it runs.
pub struct ActionContext<'a> {
    pub console: &'a mut ConsoleBuffer,
    pub history: &'a mut dyn History,
    pub completers: &'a [Box<dyn Completer>],
    pub flags: ReadlineFlags,
    /// Active keymap layer; vi mode switches flip it.
    pub layer: &'a mut Layer,
    pub terminal_width: usize,
    /// Term of the incremental history search in progress, if any.
    pub search_term: &'a mut Option<String>,
    finished: &'a mut Option<String>,
}

impl<'a> ActionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        console: &'a mut ConsoleBuffer,
        history: &'a mut dyn History,
        completers: &'a [Box<dyn Completer>],
        flags: ReadlineFlags,
        layer: &'a mut Layer,
        terminal_width: usize,
        search_term: &'a mut Option<String>,
        finished: &'a mut Option<String>,
    ) -> Self {
        Self {
            console,
            history,
            completers,
            flags,
            layer,
            terminal_width,
            search_term,
            finished,
        }
    }

    /// Hand a completed line to the reader. Only the first line of a read is
    /// kept; returns false if one was already delivered.
    pub fn finish_line(&mut self, line: String) -> bool {
        if self.finished.is_some() {
            return false;
        }
        *self.finished = Some(line);
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }
}

/// A named edit operation.
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, ctx: &mut ActionContext<'_>) -> DispatchResult;
}

/// Notified before every named action runs.
pub trait ActionObserver: Send {
    fn on_action(&self, name: &str);
}
