//! Shell-like tokenizer.
//!
//! Words are separated by unescaped, unquoted spaces. A backslash escapes the
//! following character (an escaped space joins words, any other escaped
//! character keeps its backslash). Single and double quotes group text and are
//! removed; each kind is literal inside the other. Inside an open double quote
//! an immediately repeated `"` switches to verbatim mode: everything up to the
//! next `""` is taken literally, including quotes and backslashes.
//!
//! Parsing never fails. An unclosed quote is reported through
//! `ParserStatus::UnclosedQuote` together with the words collected so far.

const SPACE: char = ' ';
const BACK_SLASH: char = '\\';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStatus {
    Ok,
    UnclosedQuote,
}

/// Result of tokenizing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    original_input: String,
    words: Vec<String>,
    cursor: Option<usize>,
    selected_index: Option<usize>,
    word_cursor: Option<usize>,
    status: ParserStatus,
    error_message: String,
}

impl ParsedLine {
    /// The input exactly as it was handed to the tokenizer.
    pub fn line(&self) -> &str {
        &self.original_input
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn status(&self) -> ParserStatus {
        self.status
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn first_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the word the cursor sits in (or directly after).
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// The word under the cursor, or `""` when the cursor is between words
    /// or no cursor was supplied.
    pub fn selected_word(&self) -> &str {
        self.selected_index
            .and_then(|i| self.words.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Cursor offset inside the selected word, counted in characters of the
    /// unescaped word.
    pub fn word_cursor(&self) -> Option<usize> {
        self.word_cursor
    }
}

/// Tokenize without cursor tracking.
pub fn tokenize(text: &str) -> ParsedLine {
    parse(text, None)
}

/// Tokenize and record which word the cursor (a character index) falls in.
pub fn tokenize_at(text: &str, cursor: usize) -> ParsedLine {
    parse(text, Some(cursor))
}

fn parse(text: &str, cursor: Option<usize>) -> ParsedLine {
    let mut words: Vec<String> = Vec::new();
    let mut builder: Vec<char> = Vec::new();
    let mut have_escape = false;
    let mut single = false;
    let mut double = false;
    let mut verbatim = false;
    let mut prev: Option<char> = None;
    let mut selected_index = None;
    let mut word_cursor = None;
    let mut len = 0usize;

    let flush = |builder: &mut Vec<char>, words: &mut Vec<String>| {
        words.push(builder.drain(..).collect());
    };

    for (index, c) in text.chars().enumerate() {
        len = index + 1;
        // a cursor right after a space is not attached to any word
        if cursor == Some(index) && (prev != Some(SPACE) || have_escape) {
            selected_index = Some(words.len());
            word_cursor = Some(builder.len());
        }
        match c {
            SPACE => {
                if have_escape {
                    builder.push(SPACE);
                    have_escape = false;
                } else if single || double {
                    builder.push(SPACE);
                } else if !builder.is_empty() {
                    flush(&mut builder, &mut words);
                }
            }
            BACK_SLASH => {
                if have_escape || verbatim {
                    builder.push(BACK_SLASH);
                    have_escape = false;
                } else {
                    have_escape = true;
                }
            }
            SINGLE_QUOTE => {
                if have_escape || verbatim {
                    builder.push(SINGLE_QUOTE);
                    have_escape = false;
                } else if single {
                    if !builder.is_empty() {
                        flush(&mut builder, &mut words);
                    }
                    single = false;
                } else if double {
                    builder.push(SINGLE_QUOTE);
                } else {
                    single = true;
                }
            }
            DOUBLE_QUOTE => {
                if have_escape || (verbatim && prev != Some(DOUBLE_QUOTE)) {
                    builder.push(DOUBLE_QUOTE);
                    have_escape = false;
                } else if double {
                    if !verbatim && prev == Some(DOUBLE_QUOTE) {
                        verbatim = true;
                    } else if verbatim {
                        // drop the first half of the closing pair
                        builder.pop();
                        flush(&mut builder, &mut words);
                        verbatim = false;
                        double = false;
                    } else {
                        if !builder.is_empty() {
                            flush(&mut builder, &mut words);
                        }
                        double = false;
                    }
                } else if single {
                    builder.push(DOUBLE_QUOTE);
                } else {
                    double = true;
                }
            }
            other => {
                if have_escape {
                    builder.push(BACK_SLASH);
                    have_escape = false;
                }
                builder.push(other);
            }
        }
        prev = Some(c);
    }

    if cursor == Some(len) && (prev != Some(SPACE) || have_escape) {
        if builder.is_empty() && !have_escape && !words.is_empty() {
            selected_index = Some(words.len() - 1);
            word_cursor = words.last().map(|w| w.chars().count());
        } else {
            selected_index = Some(words.len());
            word_cursor = Some(builder.len());
        }
    }
    if have_escape {
        builder.push(BACK_SLASH);
    }
    if !builder.is_empty() {
        flush(&mut builder, &mut words);
    }

    let (status, error_message) = if single || double {
        (ParserStatus::UnclosedQuote, "unclosed quote".to_string())
    } else {
        (ParserStatus::Ok, String::new())
    };
    tracing::trace!(target: "text.parser", words = words.len(), ?status, "tokenize");

    ParsedLine {
        original_input: text.to_string(),
        words,
        cursor,
        selected_index,
        word_cursor,
        status,
        error_message,
    }
}

/// Which quote characters take part in an open-quote check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteKinds {
    pub single: bool,
    pub double: bool,
}

impl QuoteKinds {
    pub const BOTH: Self = Self {
        single: true,
        double: true,
    };
    pub const SINGLE_ONLY: Self = Self {
        single: true,
        double: false,
    };
    pub const DOUBLE_ONLY: Self = Self {
        single: false,
        double: true,
    };
    pub const NONE: Self = Self {
        single: false,
        double: false,
    };
}

/// True when `text` ends inside a quote of one of the considered kinds.
/// Quote characters of an ignored kind are treated as ordinary text.
pub fn contains_open_quote(text: &str, kinds: QuoteKinds) -> bool {
    let mut escaped = false;
    let mut single = false;
    let mut double = false;
    for c in text.chars() {
        match c {
            BACK_SLASH => {
                escaped = !escaped;
                continue;
            }
            SINGLE_QUOTE if kinds.single && !escaped && !double => single = !single,
            DOUBLE_QUOTE if kinds.double && !escaped && !single => double = !double,
            _ => {}
        }
        escaped = false;
    }
    single || double
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preserves_original_input() {
        let input = "echo foo -i bar";
        assert_eq!(tokenize(input).line(), input);
    }

    #[test]
    fn splits_on_whitespace_and_escaped_space() {
        let line = tokenize_at("   foo bar\\ baz 12345 ", 5);
        assert_eq!(line.words(), ["foo", "bar baz", "12345"]);
        assert_eq!(line.selected_word(), "foo");
        assert_eq!(line.word_cursor(), Some(2));

        let line = tokenize_at("man < foo\\ bar ", 14);
        assert_eq!(line.words(), ["man", "<", "foo bar"]);
        assert_eq!(line.selected_word(), "foo bar");
        assert_eq!(line.word_cursor(), Some(7));

        let line = tokenize_at("cd A\\ Directory\\ With\\ Spaces", 2);
        assert_eq!(line.words(), ["cd", "A Directory With Spaces"]);
        assert_eq!(line.selected_word(), "cd");
        assert_eq!(line.word_cursor(), Some(2));
    }

    #[test]
    fn trailing_escapes() {
        let line = tokenize_at("cd A\\ ", 5);
        assert_eq!(line.words(), ["cd", "A "]);
        assert_eq!(line.selected_word(), "A ");
        assert_eq!(line.word_cursor(), Some(1));

        let line = tokenize_at("cd A\\", 4);
        assert_eq!(line.words(), ["cd", "A\\"]);
        assert_eq!(line.selected_word(), "A\\");
        assert_eq!(line.word_cursor(), Some(1));

        let line = tokenize("ls --files /tmp/A\\ ");
        assert_eq!(line.words(), ["ls", "--files", "/tmp/A "]);
    }

    #[test]
    fn escaped_ordinary_characters_keep_backslash() {
        let path = "..\\..\\..\\..\\..\\..\\..\\temp\\foo.txt";
        assert_eq!(tokenize(path).words(), [path]);
    }

    #[test]
    fn quoted_words() {
        let line = tokenize_at("foo bar \"baz 12345\" ", 19);
        assert_eq!(line.words(), ["foo", "bar", "baz 12345"]);
        assert_eq!(line.selected_word(), "");
        assert_eq!(line.word_cursor(), Some(0));

        let line = tokenize("java -cp \"foo/bar\" \"Example\"");
        assert_eq!(line.words()[2], "foo/bar");
        assert_eq!(line.words()[3], "Example");

        let line = tokenize("'foo/bar/' Example\\ 1");
        assert_eq!(line.words(), ["foo/bar/", "Example 1"]);

        let line = tokenize("man -f='foo bar/' Example\\ 1 foo");
        assert_eq!(line.words(), ["man", "-f=foo bar/", "Example 1", "foo"]);

        let line = tokenize("-s 'redirectUris=[\"http://localhost:8080/blah/*\"]'");
        assert_eq!(
            line.words(),
            ["-s", "redirectUris=[\"http://localhost:8080/blah/*\"]"]
        );
    }

    #[test]
    fn unclosed_quotes_keep_partial_words() {
        let line = tokenize("man -f='foo/bar/ Example\\ 1");
        assert_eq!(line.status(), ParserStatus::UnclosedQuote);
        assert!(!line.error_message().is_empty());
        assert_eq!(line.words()[0], "man");

        let line = tokenize("man -f='foo/bar/' Example\\ 1\"");
        assert_eq!(line.status(), ParserStatus::UnclosedQuote);

        assert_eq!(tokenize("a 'b' \"c\"").status(), ParserStatus::Ok);
    }

    #[test]
    fn verbatim_double_quote_pairs() {
        assert_eq!(tokenize("\"\"  \"\"").words()[0], "  ");
        assert_eq!(tokenize("\"\"  foo bar \"\"").words()[0], "  foo bar ");
        assert_eq!(
            tokenize("\"\"  \"foo bar\" \"\"").words()[0],
            "  \"foo bar\" "
        );

        let line = tokenize("gah bah-bah  \"\"  \"foo bar\" \"\" boo");
        assert_eq!(line.words(), ["gah", "bah-bah", "  \"foo bar\" ", "boo"]);

        let line = tokenize(" \"\"/s-ramp/wsdl/Operation[xp2:matches(@name, 'submit.*')]\"\"");
        assert_eq!(
            line.words()[0],
            "/s-ramp/wsdl/Operation[xp2:matches(@name, 'submit.*')]"
        );

        let line = tokenize(" \"\"/s-ramp/ext/${type} \\ \"\"");
        assert_eq!(line.words()[0], "/s-ramp/ext/${type} \\ ");
    }

    #[test]
    fn cursor_at_end_after_closing_quote_selects_last_word() {
        let line = tokenize_at("foo \"bar\"", 9);
        assert_eq!(line.selected_word(), "bar");
        assert_eq!(line.word_cursor(), Some(3));
    }

    #[test]
    fn no_cursor_selects_nothing() {
        let line = tokenize("foo bar");
        assert_eq!(line.selected_word(), "");
        assert_eq!(line.word_cursor(), None);
        assert_eq!(line.first_word(), Some("foo"));
    }

    #[test]
    fn open_quote_detection() {
        assert!(!contains_open_quote("foo bar is bar", QuoteKinds::BOTH));
        assert!(!contains_open_quote(
            "\"foo bar is bar is foo is bar\"",
            QuoteKinds::BOTH
        ));
        assert!(!contains_open_quote(
            "\"foo bar \"is bar is \"foo is bar\"",
            QuoteKinds::BOTH
        ));
        assert!(!contains_open_quote(
            "'foo bar \"is bar is \"foo is bar'",
            QuoteKinds::BOTH
        ));
        assert!(contains_open_quote(
            "\"foo bar is bar is \"foo is bar\"",
            QuoteKinds::BOTH
        ));
        assert!(!contains_open_quote(
            "\"foo bar is bar is \\\"foo is bar\"",
            QuoteKinds::BOTH
        ));
        assert!(contains_open_quote(
            "\"foo bar is bar is \\\"foo is bar'",
            QuoteKinds::BOTH
        ));
    }

    #[test]
    fn open_quote_detection_respects_ignored_kinds() {
        assert!(contains_open_quote("echo \"foo", QuoteKinds::BOTH));
        assert!(!contains_open_quote("echo \"foo", QuoteKinds::SINGLE_ONLY));
        assert!(contains_open_quote("echo 'foo", QuoteKinds::SINGLE_ONLY));
        assert!(!contains_open_quote("echo 'foo", QuoteKinds::DOUBLE_ONLY));
        assert!(!contains_open_quote("echo 'foo \"", QuoteKinds::NONE));
    }
}
