//! Logical key events produced by the input parser and consumed by keymaps.

use std::fmt;

/// Normalized logical key. Printable input is always `Char`; control
/// combinations are `Char` plus `KeyModifiers::CTRL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub const fn alt(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::ALT)
    }

    /// Character to insert when the key is not bound to an action.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !c.is_control()
                    && !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// The code points a terminal sends for this key (xterm conventions).
    pub fn code_points(&self) -> Vec<char> {
        let mut out = Vec::new();
        if self.mods.contains(KeyModifiers::ALT) {
            out.push('\x1b');
        }
        match self.code {
            KeyCode::Char(' ') if self.mods.contains(KeyModifiers::CTRL) => out.push('\0'),
            KeyCode::Char(c) if self.mods.contains(KeyModifiers::CTRL) => {
                let upper = c.to_ascii_uppercase();
                if ('@'..='_').contains(&upper) {
                    out.push(char::from(upper as u8 & 0x1f));
                } else {
                    out.push(c);
                }
            }
            KeyCode::Char(c) => out.push(c),
            KeyCode::Enter => out.push('\r'),
            KeyCode::Esc => out.push('\x1b'),
            KeyCode::Backspace => out.push('\x7f'),
            KeyCode::Tab => out.push('\t'),
            KeyCode::Up => out.extend(['\x1b', '[', 'A']),
            KeyCode::Down => out.extend(['\x1b', '[', 'B']),
            KeyCode::Right => out.extend(['\x1b', '[', 'C']),
            KeyCode::Left => out.extend(['\x1b', '[', 'D']),
            KeyCode::Home => out.extend(['\x1b', '[', 'H']),
            KeyCode::End => out.extend(['\x1b', '[', 'F']),
            KeyCode::Delete => out.extend(['\x1b', '[', '3', '~']),
        }
        out
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(KeyModifiers::CTRL) {
            f.write_str("ctrl-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("shift-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::Delete => f.write_str("delete"),
        }
    }
}
