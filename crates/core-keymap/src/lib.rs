//! core-keymap: key to action-name binding tables.
//!
//! A keymap resolves a `KeyEvent` to the name of an action registered with
//! the dispatcher. Resolution is pure; the dispatcher owns the action objects
//! and decides what to do with unbound keys (self-insert in insert layers).
//!
//! Emacs mode has a single layer. Vi mode has an insert layer and a command
//! layer, switched by the `vi-*` mode actions.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Emacs,
    Vi,
}

impl FromStr for EditMode {
    type Err = KeySpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emacs" => Ok(Self::Emacs),
            "vi" | "vim" => Ok(Self::Vi),
            _ => Err(KeySpecError::UnknownMode(s.to_string())),
        }
    }
}

/// Active binding table. Emacs only ever uses `Insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    #[default]
    Insert,
    Command,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeySpecError {
    #[error("empty key spec")]
    Empty,
    #[error("unknown modifier `{0}` in key spec")]
    UnknownModifier(String),
    #[error("unknown key `{0}` in key spec")]
    UnknownKey(String),
    #[error("unknown edit mode `{0}`")]
    UnknownMode(String),
    #[error("unknown layer `{0}`")]
    UnknownLayer(String),
}

#[derive(Debug, Clone)]
pub struct Keymap {
    mode: EditMode,
    layers: HashMap<Layer, HashMap<KeyEvent, String>>,
}

const EMACS: &[(&str, &str)] = &[
    ("enter", "accept-line"),
    ("ctrl-j", "accept-line"),
    ("tab", "complete"),
    ("backspace", "backward-delete-char"),
    ("ctrl-h", "backward-delete-char"),
    ("delete", "delete-char"),
    ("ctrl-d", "delete-char"),
    ("left", "backward-char"),
    ("ctrl-b", "backward-char"),
    ("right", "forward-char"),
    ("ctrl-f", "forward-char"),
    ("alt-b", "backward-word"),
    ("alt-f", "forward-word"),
    ("home", "beginning-of-line"),
    ("ctrl-a", "beginning-of-line"),
    ("end", "end-of-line"),
    ("ctrl-e", "end-of-line"),
    ("up", "previous-history"),
    ("ctrl-p", "previous-history"),
    ("down", "next-history"),
    ("ctrl-n", "next-history"),
    ("ctrl-k", "kill-line"),
    ("ctrl-u", "unix-line-discard"),
    ("ctrl-w", "backward-kill-word"),
    ("alt-backspace", "backward-kill-word"),
    ("ctrl-y", "yank"),
    ("ctrl-_", "undo"),
    ("ctrl-r", "reverse-search-history"),
    ("ctrl-s", "forward-search-history"),
];

const VI_INSERT: &[(&str, &str)] = &[
    ("enter", "accept-line"),
    ("ctrl-j", "accept-line"),
    ("tab", "complete"),
    ("backspace", "backward-delete-char"),
    ("ctrl-h", "backward-delete-char"),
    ("delete", "delete-char"),
    ("left", "backward-char"),
    ("right", "forward-char"),
    ("home", "beginning-of-line"),
    ("end", "end-of-line"),
    ("up", "previous-history"),
    ("down", "next-history"),
    ("ctrl-u", "unix-line-discard"),
    ("ctrl-w", "backward-kill-word"),
    ("esc", "vi-movement-mode"),
];

const VI_COMMAND: &[(&str, &str)] = &[
    ("enter", "accept-line"),
    ("h", "backward-char"),
    ("left", "backward-char"),
    ("backspace", "backward-char"),
    ("l", "forward-char"),
    ("right", "forward-char"),
    ("space", "forward-char"),
    ("w", "forward-word"),
    ("b", "backward-word"),
    ("0", "beginning-of-line"),
    ("home", "beginning-of-line"),
    ("$", "end-of-line"),
    ("end", "end-of-line"),
    ("k", "previous-history"),
    ("up", "previous-history"),
    ("j", "next-history"),
    ("down", "next-history"),
    ("x", "delete-char"),
    ("delete", "delete-char"),
    ("X", "backward-delete-char"),
    ("~", "change-case-char"),
    ("D", "kill-line"),
    ("p", "yank"),
    ("u", "undo"),
    ("i", "vi-insert-mode"),
    ("a", "vi-append-mode"),
    ("I", "vi-insert-beginning-of-line"),
    ("A", "vi-append-end-of-line"),
];

impl Keymap {
    /// Default bindings for `mode`.
    pub fn new(mode: EditMode) -> Self {
        let mut km = Self {
            mode,
            layers: HashMap::new(),
        };
        let tables: &[(Layer, &[(&str, &str)])] = match mode {
            EditMode::Emacs => &[(Layer::Insert, EMACS)],
            EditMode::Vi => &[(Layer::Insert, VI_INSERT), (Layer::Command, VI_COMMAND)],
        };
        for (layer, table) in tables {
            for (spec, action) in *table {
                match parse_key_spec(spec) {
                    Ok(key) => {
                        km.bind(*layer, key, *action);
                    }
                    Err(e) => debug!(target: "keymap", spec, error = %e, "default_binding_skipped"),
                }
            }
        }
        km
    }

    pub fn emacs() -> Self {
        Self::new(EditMode::Emacs)
    }

    pub fn vi() -> Self {
        Self::new(EditMode::Vi)
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Bind `key` in `layer`, returning the action it replaced.
    pub fn bind(&mut self, layer: Layer, key: KeyEvent, action: impl Into<String>) -> Option<String> {
        let action = action.into();
        trace!(target: "keymap", %key, ?layer, action = %action, "bind");
        self.layers.entry(layer).or_default().insert(key, action)
    }

    /// Bind from a textual spec such as `"ctrl-t"` or `"command:x"`. A
    /// `layer:` prefix selects the layer; without one the insert layer is used.
    pub fn bind_spec(&mut self, spec: &str, action: &str) -> Result<Option<String>, KeySpecError> {
        let (layer, key_spec) = match spec.split_once(':') {
            Some(("insert", rest)) if !rest.is_empty() => (Layer::Insert, rest),
            Some(("command", rest)) if !rest.is_empty() => (Layer::Command, rest),
            Some((prefix, rest)) if !prefix.is_empty() && !rest.is_empty() => {
                return Err(KeySpecError::UnknownLayer(prefix.to_string()));
            }
            _ => (Layer::Insert, spec),
        };
        let key = parse_key_spec(key_spec)?;
        Ok(self.bind(layer, key, action))
    }

    pub fn unbind(&mut self, layer: Layer, key: &KeyEvent) -> Option<String> {
        self.layers.get_mut(&layer).and_then(|m| m.remove(key))
    }

    pub fn lookup(&self, layer: Layer, key: &KeyEvent) -> Option<&str> {
        self.layers
            .get(&layer)
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// All bound action names, for validating a keymap against a registry.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.layers.values().flat_map(|m| m.values().map(String::as_str))
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::emacs()
    }
}

/// Parse `"ctrl-a"`, `"alt-backspace"`, `"up"`, `"x"`, `"ctrl-_"` and the like.
/// Modifier and key names are case-insensitive; a single character key keeps
/// its case (`"X"` differs from `"x"`).
pub fn parse_key_spec(spec: &str) -> Result<KeyEvent, KeySpecError> {
    if spec.is_empty() {
        return Err(KeySpecError::Empty);
    }
    // a trailing '-' is the minus key itself ("ctrl--")
    let parts: SmallVec<[&str; 4]> = if let Some(head) = spec.strip_suffix("--") {
        head.split('-').chain(std::iter::once("-")).collect()
    } else if spec == "-" {
        std::iter::once("-").collect()
    } else {
        spec.split('-').collect()
    };
    let Some((key_part, mod_parts)) = parts.split_last() else {
        return Err(KeySpecError::Empty);
    };

    let mut mods = KeyModifiers::empty();
    for m in mod_parts {
        match m.to_ascii_lowercase().as_str() {
            "ctrl" | "c" | "control" => mods |= KeyModifiers::CTRL,
            "alt" | "meta" | "m" => mods |= KeyModifiers::ALT,
            "shift" | "s" => mods |= KeyModifiers::SHIFT,
            _ => return Err(KeySpecError::UnknownModifier((*m).to_string())),
        }
    }

    let mut chars = key_part.chars();
    let code = match (chars.next(), chars.next()) {
        (Some(c), None) => KeyCode::Char(if mods.contains(KeyModifiers::CTRL) {
            c.to_ascii_lowercase()
        } else {
            c
        }),
        _ => match key_part.to_ascii_lowercase().as_str() {
            "enter" | "return" | "ret" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" | "bs" => KeyCode::Backspace,
            "tab" => KeyCode::Tab,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "delete" | "del" => KeyCode::Delete,
            "space" => KeyCode::Char(' '),
            _ => return Err(KeySpecError::UnknownKey(key_part.to_string())),
        },
    };
    Ok(KeyEvent::new(code, mods))
}
