//! Cursor relative word lookup and escaped-space helpers used by completion.
//!
//! Indexes are character (code point) positions, matching the edit buffer.

const ESCAPED_SPACE: &str = "\\ ";

fn is_unescaped_space(chars: &[char], i: usize) -> bool {
    chars[i] == ' ' && (i == 0 || chars[i - 1] != '\\')
}

fn last_unescaped_space(chars: &[char]) -> Option<usize> {
    (0..chars.len()).rev().find(|&i| is_unescaped_space(chars, i))
}

/// Word touching `cursor`, cut at the cursor (the part typed so far).
/// Returns `""` when the cursor sits in a run of two or more spaces.
pub fn find_current_word_from_cursor(text: &str, cursor: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if cursor > 1
        && cursor < chars.len()
        && chars[cursor] == ' '
        && chars[cursor - 1] == ' '
    {
        return String::new();
    }
    let end = (cursor + 1).min(chars.len());
    let rest: String = chars[..end].iter().collect();
    let rest: Vec<char> = trim(&rest).chars().collect();
    let start = last_unescaped_space(&rest).map(|i| i + 1).unwrap_or(0);
    let word: String = rest[start..].iter().collect();
    switch_escaped_spaces_to_spaces_in_word(&word)
}

/// Whole word nearest to `cursor`, extending past the cursor to the next
/// unescaped space. A cursor directly after a word selects that word.
pub fn find_word_closest_to_cursor(text: &str, cursor: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let cursor = cursor.min(chars.len());
    let (start, end) = if cursor == chars.len() || is_unescaped_space(&chars, cursor) {
        if cursor == 0 || chars[cursor - 1] == ' ' {
            return String::new();
        }
        let start = last_unescaped_space(&chars[..cursor])
            .map(|i| i + 1)
            .unwrap_or(0);
        (start, cursor)
    } else {
        let start = last_unescaped_space(&chars[..cursor])
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = (cursor..chars.len())
            .find(|&i| is_unescaped_space(&chars, i))
            .unwrap_or(chars.len());
        (start, end)
    };
    let word: String = chars[start..end].iter().collect();
    switch_escaped_spaces_to_spaces_in_word(&word)
}

/// Text after the last unescaped space, escapes intact. Empty when the text
/// ends with an unescaped space.
pub fn find_escaped_space_word_close_to_end(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    match last_unescaped_space(&chars) {
        Some(i) => chars[i + 1..].iter().collect(),
        None => text.to_string(),
    }
}

/// True when the word has at least one space and every space is escaped.
pub fn do_word_contain_only_escaped_space(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    chars.contains(&' ') && !(0..chars.len()).any(|i| is_unescaped_space(&chars, i))
}

pub fn switch_escaped_spaces_to_spaces_in_word(word: &str) -> String {
    word.replace(ESCAPED_SPACE, " ")
}

pub fn switch_spaces_to_escaped_spaces_in_word(word: &str) -> String {
    word.replace(' ', ESCAPED_SPACE)
}

/// Longest common prefix of all items (`""` for an empty list).
pub fn find_starts_with<S: AsRef<str>>(items: &[S]) -> String {
    let Some((first, rest)) = items.split_first() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.as_ref().chars().collect();
    for item in rest {
        let common = prefix
            .iter()
            .zip(item.as_ref().chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(common);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}

/// Greedy word wrap: lines never exceed `size` unless a single word does.
pub fn split_by_size_keep_words(text: &str, size: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let wlen = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + wlen <= size {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Trim whitespace from both ends, keeping a trailing escaped space.
pub fn trim(text: &str) -> String {
    let chars: Vec<char> = text.trim_start().chars().collect();
    let mut end = chars.len();
    while end > 0 && chars[end - 1].is_whitespace() {
        if end > 1 && chars[end - 2] == '\\' {
            break;
        }
        end -= 1;
    }
    chars[..end].iter().collect()
}

pub fn trim_in_front(text: &str) -> &str {
    text.trim_start()
}

/// First whitespace separated word, ignoring leading whitespace.
pub fn find_first_word(text: &str) -> &str {
    let trimmed = text.trim_start();
    match trimmed.find(' ') {
        Some(i) => &trimmed[..i],
        None => trimmed,
    }
}

/// Right-align `text` in a field of `width` characters.
pub fn pad_left(width: usize, text: &str) -> String {
    format!("{text:>width$}")
}

pub fn find_number_of_spaces_in_word(word: &str) -> usize {
    let chars: Vec<char> = word.chars().collect();
    (0..chars.len())
        .filter(|&i| is_unescaped_space(&chars, i))
        .count()
}

pub fn contains_non_escaped_dollar(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    (0..chars.len()).any(|i| chars[i] == '$' && (i == 0 || chars[i - 1] != '\\'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn current_word_from_cursor() {
        assert_eq!(find_current_word_from_cursor(" ", 1), "");
        assert_eq!(find_current_word_from_cursor("foo bar", 3), "foo");
        assert_eq!(find_current_word_from_cursor("foo bar", 6), "bar");
        assert_eq!(find_current_word_from_cursor("foobar", 6), "foobar");
        assert_eq!(find_current_word_from_cursor("foobar", 2), "foo");
        assert_eq!(find_current_word_from_cursor("ls  ", 3), "");
        assert_eq!(find_current_word_from_cursor("ls  foo", 6), "foo");
        assert_eq!(find_current_word_from_cursor("ls  foo bar", 6), "foo");
        assert_eq!(find_current_word_from_cursor("ls  foo bar", 10), "bar");
        assert_eq!(find_current_word_from_cursor("ls  foo bar", 9), "ba");
        assert_eq!(find_current_word_from_cursor("ls foo ", 6), "foo");
        assert_eq!(
            find_current_word_from_cursor("ls o org/jboss/aeshell/Shell.class", 4),
            "o"
        );
        assert_eq!(
            find_current_word_from_cursor("ls  org/jboss/aeshell/Shell.class", 3),
            ""
        );
    }

    #[test]
    fn current_word_with_escaped_space() {
        assert_eq!(find_current_word_from_cursor("foo\\ bar", 7), "foo bar");
        assert_eq!(find_current_word_from_cursor("foo\\ bar", 6), "foo ba");
        assert_eq!(find_current_word_from_cursor("ls  foo\\ bar", 11), "foo bar");
    }

    #[test]
    fn closest_whole_word() {
        assert_eq!(find_word_closest_to_cursor("ls  foo bar", 6), "foo");
        assert_eq!(find_word_closest_to_cursor(" ", 1), "");
        assert_eq!(find_word_closest_to_cursor("foo bar", 1), "foo");
        assert_eq!(find_word_closest_to_cursor("foo bar", 3), "foo");
        assert_eq!(find_word_closest_to_cursor("foobar", 6), "foobar");
        assert_eq!(find_word_closest_to_cursor("foobar", 2), "foobar");
        assert_eq!(find_word_closest_to_cursor("ls  ", 3), "");
        assert_eq!(
            find_word_closest_to_cursor("ls o org/jboss/aeshell/Shell.class", 4),
            "o"
        );
        assert_eq!(
            find_word_closest_to_cursor("ls  org/jboss/aeshell/Shell.class", 3),
            ""
        );
        assert_eq!(find_word_closest_to_cursor("foo bar foo", 3), "foo");
        assert_eq!(find_word_closest_to_cursor("foo\\ bar", 7), "foo bar");
        assert_eq!(find_word_closest_to_cursor("ls  foo\\ bar", 11), "foo bar");
    }

    #[test]
    fn escaped_space_word_close_to_end() {
        assert_eq!(find_escaped_space_word_close_to_end(" ls\\ foo"), "ls\\ foo");
        assert_eq!(find_escaped_space_word_close_to_end("ls foo\\ bar"), "foo\\ bar");
        assert_eq!(find_escaped_space_word_close_to_end("ls foo bar"), "bar");
        assert_eq!(
            find_escaped_space_word_close_to_end("ls\\ foo\\ bar"),
            "ls\\ foo\\ bar"
        );
        assert_eq!(
            find_escaped_space_word_close_to_end("\\ ls\\ foo\\ bar"),
            "\\ ls\\ foo\\ bar"
        );
        assert_eq!(
            find_escaped_space_word_close_to_end(" ls\\ foo\\ bar\\ "),
            "ls\\ foo\\ bar\\ "
        );
        assert_eq!(find_escaped_space_word_close_to_end(" ls\\ foo\\ bar\\  "), "");
    }

    #[test]
    fn only_escaped_spaces() {
        assert!(do_word_contain_only_escaped_space("foo\\ bar"));
        assert!(do_word_contain_only_escaped_space("foo\\ bar\\ "));
        assert!(do_word_contain_only_escaped_space("\\ foo\\ bar\\ "));
        assert!(!do_word_contain_only_escaped_space(" foo\\ bar\\ "));
        assert!(!do_word_contain_only_escaped_space("foo bar\\ "));
        assert!(!do_word_contain_only_escaped_space("foo bar"));
        assert!(!do_word_contain_only_escaped_space("foobar"));
    }

    #[test]
    fn switch_space_escaping() {
        assert_eq!(switch_escaped_spaces_to_spaces_in_word("foo\\ bar"), "foo bar");
        assert_eq!(switch_escaped_spaces_to_spaces_in_word("\\ foo\\ bar"), " foo bar");
        assert_eq!(
            switch_escaped_spaces_to_spaces_in_word("\\ foo\\ bar\\ "),
            " foo bar "
        );
        assert_eq!(switch_escaped_spaces_to_spaces_in_word("\\ foo bar"), " foo bar");

        assert_eq!(switch_spaces_to_escaped_spaces_in_word("foo bar"), "foo\\ bar");
        assert_eq!(switch_spaces_to_escaped_spaces_in_word(" foo bar"), "\\ foo\\ bar");
        assert_eq!(
            switch_spaces_to_escaped_spaces_in_word(" foo bar "),
            "\\ foo\\ bar\\ "
        );
    }

    #[test]
    fn common_prefix() {
        assert_eq!(find_starts_with(&["foobar", "foobaz", "foobor", "foob"]), "foob");
        assert_eq!(find_starts_with(&["foo", "bar"]), "");
        assert_eq!(find_starts_with::<&str>(&[]), "");
    }

    #[test]
    fn split_keeps_words_whole() {
        let out = split_by_size_keep_words("foo to bar is how it is i guess", 10);
        assert_eq!(out, ["foo to bar", "is how it", "is i guess"]);

        let out = split_by_size_keep_words(
            "It is an error to use a backslash prior to any alphabetic",
            20,
        );
        assert_eq!(
            out,
            ["It is an error to", "use a backslash", "prior to any", "alphabetic"]
        );
    }

    #[test]
    fn trimming() {
        assert_eq!(trim("  foo "), "foo");
        assert_eq!(trim("bar foo "), "bar foo");
        assert_eq!(trim(" bar foo"), "bar foo");
        assert_eq!(trim("\\ foo\\  "), "\\ foo\\ ");

        assert_eq!(trim_in_front("  foo "), "foo ");
        assert_eq!(trim_in_front("  foo"), "foo");
        assert_eq!(trim_in_front("foo"), "foo");
    }

    #[test]
    fn first_word() {
        assert_eq!(find_first_word(" foo \\ bar"), "foo");
        assert_eq!(find_first_word(" foo bar baz"), "foo");
        assert_eq!(find_first_word("foo bar baz"), "foo");
        assert_eq!(find_first_word("foobar baz"), "foobar");
        assert_eq!(find_first_word("foobarbaz"), "foobarbaz");
    }

    #[test]
    fn padding_and_counting() {
        assert_eq!(pad_left(4, "foo"), " foo");
        assert_eq!(pad_left(6, "foo"), "   foo");

        assert_eq!(find_number_of_spaces_in_word("this is a word "), 4);
        assert_eq!(find_number_of_spaces_in_word("this is a word !"), 4);
        assert_eq!(find_number_of_spaces_in_word(" this is a word !"), 5);
        assert_eq!(find_number_of_spaces_in_word(" this is a\\ word !"), 4);
    }

    #[test]
    fn dollar_detection() {
        assert!(contains_non_escaped_dollar("foo $bar"));
        assert!(!contains_non_escaped_dollar("foo bar"));
        assert!(!contains_non_escaped_dollar("foo \\$bar"));
        assert!(!contains_non_escaped_dollar("foo \\$bar\\$"));
        assert!(!contains_non_escaped_dollar("\\$foo \\$bar\\$"));
        assert!(contains_non_escaped_dollar("$foo \\$bar\\$"));
        assert!(contains_non_escaped_dollar("\\$foo \\$bar$"));
    }
}
