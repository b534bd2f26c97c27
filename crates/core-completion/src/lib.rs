//! Completion requests and candidate formatting.
//!
//! A `CompleteOperation` describes the line being completed. Completers add
//! full-form candidates and set `offset` to where the completed word starts;
//! the formatter then strips the part of each candidate the user has already
//! typed (`cursor - offset` characters) so only the missing suffix is inserted.
//! All positions count code points.

use core_text::{switch_escaped_spaces_to_spaces_in_word, trim_in_front};

pub struct CompleteOperation {
    buffer: String,
    non_trimmed_buffer: Option<String>,
    cursor: usize,
    offset: usize,
    candidates: Vec<String>,
    separator: char,
    append_separator: bool,
    ignore_offset: bool,
    ignore_starts_with: bool,
    ignore_non_escaped_space: bool,
}

impl CompleteOperation {
    /// A buffer with leading spaces is trimmed and the cursor shifted left by
    /// the trimmed amount.
    pub fn new(buffer: &str, cursor: usize) -> Self {
        let (buffer, non_trimmed_buffer, cursor) = if buffer.starts_with(' ') {
            let trimmed = trim_in_front(buffer);
            let removed = buffer.chars().count() - trimmed.chars().count();
            (
                trimmed.to_string(),
                Some(buffer.to_string()),
                cursor.saturating_sub(removed),
            )
        } else {
            (buffer.to_string(), None, cursor)
        };
        Self {
            buffer,
            non_trimmed_buffer,
            cursor,
            offset: 0,
            candidates: Vec::new(),
            separator: ' ',
            append_separator: true,
            ignore_offset: false,
            ignore_starts_with: false,
            ignore_non_escaped_space: false,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_trimmed(&self) -> bool {
        self.non_trimmed_buffer.is_some()
    }

    pub fn non_trimmed_buffer(&self) -> Option<&str> {
        self.non_trimmed_buffer.as_deref()
    }

    /// Number of leading characters removed from the request buffer.
    pub fn trimmed_size(&self) -> usize {
        self.non_trimmed_buffer
            .as_deref()
            .map(|raw| raw.chars().count() - self.buffer.chars().count())
            .unwrap_or(0)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn ignore_offset(&self) -> bool {
        self.ignore_offset
    }

    pub fn set_ignore_offset(&mut self, ignore: bool) {
        self.ignore_offset = ignore;
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    pub fn append_separator(&self) -> bool {
        self.append_separator
    }

    pub fn set_append_separator(&mut self, append: bool) {
        self.append_separator = append;
    }

    pub fn ignore_starts_with(&self) -> bool {
        self.ignore_starts_with
    }

    pub fn set_ignore_starts_with(&mut self, ignore: bool) {
        self.ignore_starts_with = ignore;
    }

    pub fn ignore_non_escaped_space(&self) -> bool {
        self.ignore_non_escaped_space
    }

    pub fn set_ignore_non_escaped_space(&mut self, ignore: bool) {
        self.ignore_non_escaped_space = ignore;
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn add_candidate<S: Into<String>>(&mut self, candidate: S) {
        self.candidates.push(candidate.into());
    }

    pub fn add_candidates<I, S>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates.extend(candidates.into_iter().map(Into::into));
    }

    pub fn remove_escaped_spaces_from_candidates(&mut self) {
        for c in &mut self.candidates {
            *c = switch_escaped_spaces_to_spaces_in_word(c);
        }
    }

    fn typed_len(&self) -> Option<usize> {
        (self.offset < self.cursor).then(|| self.cursor - self.offset)
    }

    /// Candidates with the already typed prefix removed. A candidate shorter
    /// than the typed prefix becomes empty.
    pub fn formatted_candidates(&self) -> Vec<String> {
        let typed = if self.ignore_offset {
            None
        } else {
            self.typed_len()
        };
        self.candidates
            .iter()
            .map(|c| match typed {
                Some(pos) if c.chars().count() >= pos => c.chars().skip(pos).collect(),
                Some(_) => String::new(),
                None => c.clone(),
            })
            .collect()
    }

    /// Suffix of a single `completion` still to be inserted. Empty when the
    /// user has typed all of it.
    pub fn formatted_completion(&self, completion: &str) -> String {
        match self.typed_len() {
            Some(pos) if completion.chars().count() > pos => completion.chars().skip(pos).collect(),
            Some(_) => String::new(),
            None => completion.to_string(),
        }
    }
}

impl std::fmt::Debug for CompleteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompleteOperation")
            .field("buffer_len", &self.buffer.len())
            .field("cursor", &self.cursor)
            .field("offset", &self.offset)
            .field("ignore_offset", &self.ignore_offset)
            .field("append_separator", &self.append_separator)
            .field("candidates", &self.candidates.len())
            .finish()
    }
}

/// Source of completion candidates.
pub trait Completer: Send {
    fn complete(&self, op: &mut CompleteOperation);
}

impl<F> Completer for F
where
    F: Fn(&mut CompleteOperation) + Send,
{
    fn complete(&self, op: &mut CompleteOperation) {
        self(op)
    }
}

/// Completes the word under the cursor from a fixed vocabulary.
#[derive(Debug, Clone, Default)]
pub struct WordListCompleter {
    words: Vec<String>,
}

impl WordListCompleter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl Completer for WordListCompleter {
    fn complete(&self, op: &mut CompleteOperation) {
        let before: Vec<char> = op.buffer().chars().take(op.cursor()).collect();
        let start = word_start(&before);
        let typed: String = before[start..].iter().collect();
        let typed = switch_escaped_spaces_to_spaces_in_word(&typed);
        let hits: Vec<&String> = self.words.iter().filter(|w| w.starts_with(&typed)).collect();
        tracing::trace!(target: "completion", typed_len = typed.len(), hits = hits.len(), "word_list_complete");
        if hits.is_empty() {
            return;
        }
        // Candidates are unescaped, so the typed prefix is measured unescaped too.
        op.set_offset(op.cursor() - typed.chars().count());
        op.add_candidates(hits.into_iter().cloned());
    }
}

/// Index just past the last unescaped space.
fn word_start(chars: &[char]) -> usize {
    (0..chars.len())
        .rev()
        .find(|&i| chars[i] == ' ' && (i == 0 || chars[i - 1] != '\\'))
        .map(|i| i + 1)
        .unwrap_or(0)
}
