//! Text primitives for the line editor.
//!
//! * `parser`  - quote/escape aware tokenizer producing `ParsedLine`
//! * `words`   - cursor relative word lookup and escaped-space helpers
//! * `ansi`    - escape sequence stripping and visible width
//! * `display` - completion candidate grids
//! * `width`   - grapheme cluster cell width
//!
//! Everything operates on `char` slices or `&str`; the edit buffer stores
//! code points, so the slice forms are the primary API and the `&str` forms
//! are thin conveniences.

pub mod ansi;
pub mod display;
pub mod parser;
pub mod width;
pub mod words;

pub use ansi::{strip_ansi, visible_width};
pub use display::{format_display_compact_list, format_display_list};
pub use parser::{ParsedLine, ParserStatus, QuoteKinds, contains_open_quote, tokenize, tokenize_at};
pub use width::egc_width;
pub use words::*;

/// Separator placed between physical lines of a multi-line entry and after
/// every row of a candidate grid.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Collect a string into code points.
pub fn to_code_points(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// Reassemble code points into a string.
pub fn from_code_points(cps: &[char]) -> String {
    cps.iter().collect()
}

/// True when the slice holds nothing but whitespace (or nothing at all).
pub fn is_trimmed_empty(cps: &[char]) -> bool {
    cps.iter().all(|c| c.is_whitespace())
}
