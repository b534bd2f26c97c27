//! ANSI escape stripping and visible width.
//!
//! Covers CSI sequences (`ESC [ ... final`), OSC sequences terminated by BEL
//! or `ESC \`, and two-character escapes. Width is measured per grapheme
//! cluster on the stripped text.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::egc_width;

fn ansi_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
            .expect("ansi regex must compile")
    })
}

/// Remove terminal escape sequences, leaving printable text.
pub fn strip_ansi(text: &str) -> String {
    if !text.contains('\x1b') {
        return text.to_string();
    }
    ansi_regex().replace_all(text, "").into_owned()
}

/// Terminal cell width of `text` once escape sequences are removed.
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text)
        .graphemes(true)
        .map(|g| egc_width(g) as usize)
        .sum()
}
