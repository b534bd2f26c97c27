//! Code point to key event parser.
//!
//! The terminal connection hands over decoded code points in whatever chunks
//! the OS read returned. `KeyParser` turns them into `InputToken`s, keeping an
//! unfinished escape sequence pending until the next chunk completes it.
//!
//! Rules:
//! * `\r`, `\n` and `\r\n` are one Enter.
//! * DEL and BS are Backspace; other C0 controls are Ctrl+letter (or
//!   Ctrl+`\`, `]`, `^`, `_` for 0x1c..=0x1f).
//! * `ESC x` is Alt+x. A lone ESC at the end of a chunk is the Esc key;
//!   an unfinished CSI (`ESC [ 1 ;`) stays pending.
//! * CSI/SS3 cursor keys with xterm modifier parameters (`ESC [ 1 ; 5 C`).
//! * Bracketed paste (`ESC [ 200 ~` .. `ESC [ 201 ~`) becomes one `Paste`.

use core_events::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;
use tracing::trace;

const ESC: char = '\x1b';
const PASTE_START: &str = "200~";
const PASTE_END: &str = "\x1b[201~";
const MAX_SEQUENCE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputToken {
    Key(KeyEvent),
    /// Bracketed paste payload, inserted verbatim.
    Paste(String),
}

#[derive(Debug, Default)]
pub struct KeyParser {
    pending: SmallVec<[char; MAX_SEQUENCE]>,
    paste: Option<String>,
    last_was_cr: bool,
}

#[inline]
pub(crate) fn log_paste_flush(payload: &str) {
    trace!(target: "input.paste", chunk_len = payload.len(), "paste_flush");
}

fn key(code: KeyCode) -> InputToken {
    InputToken::Key(KeyEvent::plain(code))
}

impl KeyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when an escape sequence or paste is still incomplete.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.paste.is_some()
    }

    pub fn feed(&mut self, input: &[char]) -> Vec<InputToken> {
        let mut out = Vec::with_capacity(input.len());
        for &c in input {
            self.push(c, &mut out);
        }
        if self.pending.as_slice() == [ESC] {
            self.pending.clear();
            out.push(key(KeyCode::Esc));
        }
        out
    }

    fn push(&mut self, c: char, out: &mut Vec<InputToken>) {
        if let Some(buf) = self.paste.as_mut() {
            buf.push(c);
            if buf.ends_with(PASTE_END) {
                buf.truncate(buf.len() - PASTE_END.len());
                let payload = std::mem::take(buf);
                self.paste = None;
                log_paste_flush(&payload);
                out.push(InputToken::Paste(payload));
            }
            return;
        }

        let was_cr = std::mem::replace(&mut self.last_was_cr, false);
        if self.pending.is_empty() {
            self.push_plain(c, was_cr, out);
            return;
        }

        // pending always starts with ESC
        match (self.pending.len(), self.pending.get(1).copied()) {
            (1, _) => match c {
                '[' | 'O' => self.pending.push(c),
                ESC => out.push(key(KeyCode::Esc)),
                _ => {
                    self.pending.clear();
                    out.push(InputToken::Key(alt_key(c)));
                }
            },
            (2, Some('O')) => {
                self.pending.clear();
                match ss3_key(c) {
                    Some(code) => out.push(key(code)),
                    None => trace!(target: "input.parser", "unknown_ss3"),
                }
            }
            _ => {
                self.pending.push(c);
                if ('\u{40}'..='\u{7e}').contains(&c) {
                    let body: String = self.pending[2..].iter().collect();
                    self.pending.clear();
                    self.resolve_csi(&body, out);
                } else if self.pending.len() >= MAX_SEQUENCE {
                    trace!(target: "input.parser", len = self.pending.len(), "sequence_overflow_dropped");
                    self.pending.clear();
                }
            }
        }
    }

    fn push_plain(&mut self, c: char, was_cr: bool, out: &mut Vec<InputToken>) {
        match c {
            ESC => self.pending.push(c),
            '\r' => {
                self.last_was_cr = true;
                out.push(key(KeyCode::Enter));
            }
            '\n' if was_cr => {}
            '\n' => out.push(key(KeyCode::Enter)),
            '\t' => out.push(key(KeyCode::Tab)),
            '\x7f' | '\x08' => out.push(key(KeyCode::Backspace)),
            '\0' => out.push(InputToken::Key(KeyEvent::ctrl(' '))),
            '\x01'..='\x1a' => {
                let letter = char::from(b'a' + (c as u8 - 1));
                out.push(InputToken::Key(KeyEvent::ctrl(letter)));
            }
            '\x1c'..='\x1f' => out.push(InputToken::Key(KeyEvent::ctrl(char::from(c as u8 + 0x40)))),
            c if c.is_control() => trace!(target: "input.parser", code = c as u32, "ignored_control"),
            c => out.push(InputToken::Key(KeyEvent::char(c))),
        }
    }

    fn resolve_csi(&mut self, body: &str, out: &mut Vec<InputToken>) {
        if body == PASTE_START {
            trace!(target: "input.paste", "start");
            self.paste = Some(String::new());
            return;
        }
        let Some(final_char) = body.chars().last() else {
            return;
        };
        let params = &body[..body.len() - final_char.len_utf8()];
        let mut fields = params.split(';');
        let first = fields.next().unwrap_or("");
        let mods = fields
            .next()
            .and_then(|m| m.parse::<u8>().ok())
            .map(xterm_modifiers)
            .unwrap_or_else(KeyModifiers::empty);

        let code = match (final_char, first) {
            ('A', _) => Some(KeyCode::Up),
            ('B', _) => Some(KeyCode::Down),
            ('C', _) => Some(KeyCode::Right),
            ('D', _) => Some(KeyCode::Left),
            ('H', _) => Some(KeyCode::Home),
            ('F', _) => Some(KeyCode::End),
            ('~', "1" | "7") => Some(KeyCode::Home),
            ('~', "4" | "8") => Some(KeyCode::End),
            ('~', "3") => Some(KeyCode::Delete),
            _ => None,
        };
        match code {
            Some(code) => out.push(InputToken::Key(KeyEvent::new(code, mods))),
            None => trace!(target: "input.parser", len = body.len(), "unknown_csi"),
        }
    }
}

fn alt_key(c: char) -> KeyEvent {
    match c {
        '\x7f' | '\x08' => KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT),
        '\r' => KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT),
        '\x01'..='\x1a' => KeyEvent::new(
            KeyCode::Char(char::from(b'a' + (c as u8 - 1))),
            KeyModifiers::CTRL | KeyModifiers::ALT,
        ),
        c => KeyEvent::alt(c),
    }
}

fn ss3_key(c: char) -> Option<KeyCode> {
    match c {
        'A' => Some(KeyCode::Up),
        'B' => Some(KeyCode::Down),
        'C' => Some(KeyCode::Right),
        'D' => Some(KeyCode::Left),
        'H' => Some(KeyCode::Home),
        'F' => Some(KeyCode::End),
        _ => None,
    }
}

/// xterm encodes modifiers as `1 + bits` with shift=1, alt=2, ctrl=4.
fn xterm_modifiers(param: u8) -> KeyModifiers {
    let bits = param.saturating_sub(1);
    let mut out = KeyModifiers::empty();
    if bits & 1 != 0 {
        out |= KeyModifiers::SHIFT;
    }
    if bits & 2 != 0 {
        out |= KeyModifiers::ALT;
    }
    if bits & 4 != 0 {
        out |= KeyModifiers::CTRL;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(parser: &mut KeyParser, s: &str) -> Vec<InputToken> {
        let cps: Vec<char> = s.chars().collect();
        parser.feed(&cps)
    }

    fn keys(s: &str) -> Vec<InputToken> {
        feed(&mut KeyParser::new(), s)
    }

    #[test]
    fn printable_and_enter_variants() {
        assert_eq!(
            keys("ab\r"),
            vec![
                InputToken::Key(KeyEvent::char('a')),
                InputToken::Key(KeyEvent::char('b')),
                key(KeyCode::Enter),
            ]
        );
        assert_eq!(keys("\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(keys("\r\n"), vec![key(KeyCode::Enter)]);
        assert_eq!(keys("\n\n"), vec![key(KeyCode::Enter), key(KeyCode::Enter)]);
    }

    #[test]
    fn crlf_split_across_chunks_is_one_enter() {
        let mut p = KeyParser::new();
        assert_eq!(feed(&mut p, "\r"), vec![key(KeyCode::Enter)]);
        assert!(feed(&mut p, "\n").is_empty());
    }

    #[test]
    fn control_keys() {
        assert_eq!(
            keys("\x01\x7f\x08\t"),
            vec![
                InputToken::Key(KeyEvent::ctrl('a')),
                key(KeyCode::Backspace),
                key(KeyCode::Backspace),
                key(KeyCode::Tab),
            ]
        );
    }

    #[test]
    fn cursor_sequences() {
        assert_eq!(
            keys("\x1b[A\x1b[B\x1b[C\x1b[D\x1bOH\x1b[F\x1b[3~"),
            vec![
                key(KeyCode::Up),
                key(KeyCode::Down),
                key(KeyCode::Right),
                key(KeyCode::Left),
                key(KeyCode::Home),
                key(KeyCode::End),
                key(KeyCode::Delete),
            ]
        );
    }

    #[test]
    fn modified_cursor_sequence() {
        assert_eq!(
            keys("\x1b[1;5C"),
            vec![InputToken::Key(KeyEvent::new(
                KeyCode::Right,
                KeyModifiers::CTRL
            ))]
        );
    }

    #[test]
    fn alt_and_lone_escape() {
        assert_eq!(keys("\x1bf"), vec![InputToken::Key(KeyEvent::alt('f'))]);
        assert_eq!(keys("\x1b"), vec![key(KeyCode::Esc)]);
        assert_eq!(keys("\x1b\x1b"), vec![key(KeyCode::Esc), key(KeyCode::Esc)]);
    }

    #[test]
    fn sequence_split_across_chunks() {
        let mut p = KeyParser::new();
        assert_eq!(feed(&mut p, "x\x1b[1;"), vec![InputToken::Key(KeyEvent::char('x'))]);
        assert!(p.has_pending());
        assert_eq!(
            feed(&mut p, "2A"),
            vec![InputToken::Key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT))]
        );
        assert!(!p.has_pending());
    }

    #[test]
    fn bracketed_paste_is_one_token() {
        let mut p = KeyParser::new();
        assert!(feed(&mut p, "\x1b[200~hello\r").is_empty());
        assert!(p.has_pending());
        assert_eq!(
            feed(&mut p, "world\x1b[201~a"),
            vec![
                InputToken::Paste("hello\rworld".to_string()),
                InputToken::Key(KeyEvent::char('a')),
            ]
        );
    }

    #[test]
    fn key_code_points_parse_back() {
        for ev in [
            KeyEvent::ctrl('e'),
            KeyEvent::ctrl('_'),
            KeyEvent::ctrl(' '),
            KeyEvent::alt('b'),
            KeyEvent::plain(KeyCode::Left),
            KeyEvent::plain(KeyCode::Delete),
            KeyEvent::plain(KeyCode::Backspace),
        ] {
            let mut p = KeyParser::new();
            assert_eq!(p.feed(&ev.code_points()), vec![InputToken::Key(ev)]);
        }
    }

    mod logging {
        use std::fmt;
        use std::sync::{Arc, Mutex};
        use tracing::Subscriber;
        use tracing::dispatcher::Dispatch;
        use tracing::field::{Field, Visit};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
        use tracing_subscriber::registry::Registry;

        #[derive(Clone, Default)]
        struct Capture {
            events: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
        }

        #[derive(Default)]
        struct FieldCollector {
            fields: Vec<(String, String)>,
        }

        impl Visit for FieldCollector {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                self.fields
                    .push((field.name().to_string(), format!("{:?}", value)));
            }
        }

        impl<S: Subscriber> Layer<S> for Capture {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                let mut collector = FieldCollector::default();
                event.record(&mut collector);
                self.events
                    .lock()
                    .unwrap()
                    .push((event.metadata().target().to_string(), collector.fields));
            }
        }

        #[test]
        fn paste_flush_log_redacts_content() {
            let capture = Capture::default();
            let events = capture.events.clone();
            let dispatch = Dispatch::new(Registry::default().with(capture));

            tracing::dispatcher::with_default(&dispatch, || {
                super::super::log_paste_flush("secret paste payload 💣");
            });

            let events = events.lock().unwrap();
            let (_, fields) = events
                .iter()
                .find(|(target, _)| target == "input.paste")
                .expect("missing input.paste event");
            assert!(fields.iter().any(|(name, _)| name == "chunk_len"));
            for (_, value) in fields {
                assert!(!value.contains("secret paste payload"), "leaked: {value}");
                assert!(!value.contains('💣'), "leaked: {value}");
            }
        }
    }
}
