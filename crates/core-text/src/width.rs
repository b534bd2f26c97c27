//! Grapheme cluster display width.
//!
//! `egc_width` is the single place that decides how many terminal cells a
//! cluster occupies. It leans on `unicode_width` and widens emoji clusters the
//! crate under-measures (ZWJ sequences, flags, keycaps, skin tones).
//! Over-estimation is preferred: an extra blank cell is harmless while an
//! under-estimate makes the cursor drift on redraw.

use unicode_width::UnicodeWidthChar;

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// rough Extended Pictographic range check
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn char_width(c: char) -> u16 {
    c.width().unwrap_or(0) as u16
}

/// Column width of a single grapheme cluster. Empty input is 0 cells.
///
/// The caller segments; a multi-cluster slice is not rejected but its width
/// is only meaningful for the first cluster's classification.
pub fn egc_width(egc: &str) -> u16 {
    let mut chars = egc.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    if chars.as_str().is_empty() {
        if first.is_ascii() {
            return if first.is_ascii_control() { 0 } else { 1 };
        }
        if is_extended_pictographic(first) {
            return char_width(first).max(1);
        }
        return char_width(first);
    }

    let mut pictographic = 0usize;
    let mut regional = 0usize;
    let mut zwj = false;
    let mut emoji_hint = false;
    for c in egc.chars() {
        if is_extended_pictographic(c) {
            pictographic += 1;
        }
        if is_regional_indicator(c) {
            regional += 1;
        }
        if c == ZWJ {
            zwj = true;
        }
        if c == VS16 || c == KEYCAP_COMBINING || is_skin_tone_modifier(c) {
            emoji_hint = true;
        }
    }
    if regional == 2 || (zwj && pictographic >= 2) || (emoji_hint && pictographic > 0) {
        return 2;
    }
    if egc.ends_with(KEYCAP_COMBINING) {
        return 2;
    }
    // base plus combining marks: the base decides
    char_width(first).max(1)
}
