//! Action registry and the input processor driving it.
//!
//! Sub-modules hold the built-in actions grouped by concern:
//! * `enter`    - line acceptance and multi-line continuation
//! * `edit`     - deletes, kills, yank and case change
//! * `motion`   - cursor movement
//! * `history`  - history navigation and search
//! * `complete` - Tab completion
//! * `mode`     - vi layer switches
//! * `undo`     - undo
//!
//! `InputProcessor::run` dispatches queued key events one at a time. After an
//! action reports `dirty` the processor queues a redraw before the next event
//! is handled, so output always reflects the mutation that preceded it.

use std::collections::{HashMap, VecDeque};

use core_completion::Completer;
use core_events::KeyEvent;
use core_history::{History, HistoryError};
use core_input::{InputToken, KeyParser};
use core_keymap::{Keymap, Layer};
use core_state::{ConsoleBuffer, Prompt};
use tracing::{debug, trace};

use crate::{Action, ActionContext, ActionObserver, ReadlineFlags};

mod complete;
mod edit;
mod enter;
mod history;
mod mode;
mod motion;
mod undo;

/// Width assumed until the connection reports a size.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Result of dispatching a single action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// The line must be redrawn.
    pub dirty: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self { dirty: true }
    }
    pub fn clean() -> Self {
        Self { dirty: false }
    }
}

/// An action backed by a plain function.
#[derive(Clone, Copy)]
pub struct BuiltinAction {
    name: &'static str,
    apply: fn(&mut ActionContext<'_>) -> DispatchResult,
}

impl BuiltinAction {
    pub const fn new(
        name: &'static str,
        apply: fn(&mut ActionContext<'_>) -> DispatchResult,
    ) -> Self {
        Self { name, apply }
    }
}

impl Action for BuiltinAction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, ctx: &mut ActionContext<'_>) -> DispatchResult {
        (self.apply)(ctx)
    }
}

const BUILTINS: &[BuiltinAction] = &[
    BuiltinAction::new("accept-line", enter::accept_line),
    BuiltinAction::new("delete-char", edit::delete_char),
    BuiltinAction::new("backward-delete-char", edit::backward_delete_char),
    BuiltinAction::new("change-case-char", edit::change_case_char),
    BuiltinAction::new("kill-line", edit::kill_line),
    BuiltinAction::new("unix-line-discard", edit::unix_line_discard),
    BuiltinAction::new("backward-kill-word", edit::backward_kill_word),
    BuiltinAction::new("yank", edit::yank),
    BuiltinAction::new("forward-char", motion::forward_char),
    BuiltinAction::new("backward-char", motion::backward_char),
    BuiltinAction::new("forward-word", motion::forward_word),
    BuiltinAction::new("backward-word", motion::backward_word),
    BuiltinAction::new("beginning-of-line", motion::beginning_of_line),
    BuiltinAction::new("end-of-line", motion::end_of_line),
    BuiltinAction::new("previous-history", history::previous_history),
    BuiltinAction::new("next-history", history::next_history),
    BuiltinAction::new("reverse-search-history", history::reverse_search_history),
    BuiltinAction::new("forward-search-history", history::forward_search_history),
    BuiltinAction::new("complete", complete::complete),
    BuiltinAction::new("undo", undo::undo),
    BuiltinAction::new("vi-movement-mode", mode::vi_movement_mode),
    BuiltinAction::new("vi-insert-mode", mode::vi_insert_mode),
    BuiltinAction::new("vi-append-mode", mode::vi_append_mode),
    BuiltinAction::new("vi-insert-beginning-of-line", mode::vi_insert_beginning_of_line),
    BuiltinAction::new("vi-append-end-of-line", mode::vi_append_end_of_line),
];

/// Actions whose runs share one search term.
const SEARCH_ACTIONS: &[&str] = &["reverse-search-history", "forward-search-history"];

/// Name to action lookup.
pub struct ActionRegistry {
    actions: HashMap<&'static str, Box<dyn Action>>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl ActionRegistry {
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in BUILTINS {
            registry.register(Box::new(*builtin));
        }
        registry
    }

    /// Add or replace an action under its own name. Returns the replaced action.
    pub fn register(&mut self, action: Box<dyn Action>) -> Option<Box<dyn Action>> {
        self.actions.insert(action.name(), action)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions.get(name).map(|a| a.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }
}

/// Turns raw code points into edits on one session's buffer.
pub struct InputProcessor {
    console: ConsoleBuffer,
    history: Box<dyn History>,
    keymap: Keymap,
    registry: ActionRegistry,
    completers: Vec<Box<dyn Completer>>,
    observers: Vec<Box<dyn ActionObserver>>,
    flags: ReadlineFlags,
    parser: KeyParser,
    queue: VecDeque<InputToken>,
    layer: Layer,
    terminal_width: usize,
    search_term: Option<String>,
}

impl InputProcessor {
    pub fn new(prompt: Prompt, history: Box<dyn History>, keymap: Keymap, flags: ReadlineFlags) -> Self {
        Self {
            console: ConsoleBuffer::new(prompt),
            history,
            keymap,
            registry: ActionRegistry::with_builtins(),
            completers: Vec::new(),
            observers: Vec::new(),
            flags,
            parser: KeyParser::new(),
            queue: VecDeque::new(),
            layer: Layer::Insert,
            terminal_width: DEFAULT_TERMINAL_WIDTH,
            search_term: None,
        }
    }

    pub fn console(&self) -> &ConsoleBuffer {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut ConsoleBuffer {
        &mut self.console
    }

    pub fn history(&self) -> &dyn History {
        self.history.as_ref()
    }

    pub fn history_mut(&mut self) -> &mut dyn History {
        self.history.as_mut()
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    pub fn flags(&self) -> ReadlineFlags {
        self.flags
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn add_completer(&mut self, completer: Box<dyn Completer>) {
        self.completers.push(completer);
    }

    pub fn add_observer(&mut self, observer: Box<dyn ActionObserver>) {
        self.observers.push(observer);
    }

    pub fn set_terminal_width(&mut self, width: usize) {
        self.terminal_width = width.max(1);
    }

    /// Start a read: install `prompt` and draw it.
    pub fn begin_line(&mut self, prompt: Prompt) {
        self.console.buffer_mut().set_prompt(prompt);
        self.console.draw_line();
    }

    /// Parse `input` and queue the resulting key events.
    pub fn feed(&mut self, input: &[char]) {
        let tokens = self.parser.feed(input);
        trace!(target: "actions.dispatch", chars = input.len(), tokens = tokens.len(), "feed");
        self.queue.extend(tokens);
    }

    pub fn has_queued_input(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Dispatch queued events until a line is accepted or the queue drains.
    /// Events after an accepted line stay queued for the next read.
    pub fn run(&mut self) -> Option<String> {
        let mut finished = None;
        while finished.is_none() {
            let Some(token) = self.queue.pop_front() else {
                break;
            };
            match token {
                InputToken::Key(key) => self.dispatch_key(key, &mut finished),
                InputToken::Paste(text) => self.paste(&text),
            }
        }
        if finished.is_some() {
            self.layer = Layer::Insert;
            self.search_term = None;
            debug!(target: "actions.dispatch", queued = self.queue.len(), "line_accepted");
        }
        finished
    }

    /// Drain output produced by the actions run so far.
    pub fn take_output(&mut self) -> String {
        self.console.take_output()
    }

    /// Flush history to durable storage.
    pub fn stop(&mut self) -> Result<(), HistoryError> {
        self.history.stop()
    }

    fn dispatch_key(&mut self, key: KeyEvent, finished: &mut Option<String>) {
        if let Some(name) = self.keymap.lookup(self.layer, &key).map(str::to_owned) {
            self.dispatch_named(&name, finished);
            return;
        }
        match key.printable() {
            Some(c) if self.layer == Layer::Insert => self.self_insert(c),
            _ => trace!(target: "actions.dispatch", key = %key, "unbound_key"),
        }
    }

    /// Run the action registered as `name`. Unknown names are ignored.
    pub fn dispatch_named(&mut self, name: &str, finished: &mut Option<String>) -> DispatchResult {
        let Some(action) = self.registry.get(name) else {
            debug!(target: "actions.dispatch", action = name, "unknown_action");
            return DispatchResult::clean();
        };
        for obs in &self.observers {
            obs.on_action(name);
        }
        if !SEARCH_ACTIONS.contains(&name) {
            self.search_term = None;
        }
        self.console.end_insert_run();
        let mut ctx = ActionContext::new(
            &mut self.console,
            self.history.as_mut(),
            &self.completers,
            self.flags,
            &mut self.layer,
            self.terminal_width,
            &mut self.search_term,
            finished,
        );
        let result = action.apply(&mut ctx);
        trace!(target: "actions.dispatch", action = name, dirty = result.dirty, "dispatch");
        if result.dirty {
            self.console.draw_line();
        }
        result
    }

    fn self_insert(&mut self, c: char) {
        self.search_term = None;
        self.console.insert(&[c]);
        self.console.draw_line();
    }

    /// A paste is one undo unit. Line breaks inside it become spaces so a
    /// paste never accepts the line on its own.
    fn paste(&mut self, text: &str) {
        let chars: Vec<char> = text
            .replace("\r\n", "\n")
            .chars()
            .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
            .collect();
        if self.layer != Layer::Insert || chars.is_empty() {
            return;
        }
        self.search_term = None;
        self.console.insert_discrete(&chars);
        self.console.draw_line();
    }
}
