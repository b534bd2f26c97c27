mod common;

use common::Session;
use core_completion::{CompleteOperation, WordListCompleter};
use core_events::{KeyCode, KeyEvent};
use pretty_assertions::assert_eq;

const TAB: KeyEvent = KeyEvent::plain(KeyCode::Tab);

fn with_words(words: &[&str]) -> Session {
    let mut s = Session::emacs();
    s.processor
        .add_completer(Box::new(WordListCompleter::new(words.iter().copied())));
    s
}

#[test]
fn common_prefix_then_single_candidate() {
    let mut s = with_words(&["checkout", "cherry-pick", "commit"]);
    s.feed("git ch");
    s.key(TAB);
    assert_eq!(s.line(), "git che");
    s.feed("c");
    s.key(TAB);
    assert_eq!(s.line(), "git checkout ");
    assert_eq!(s.cursor(), 13);
}

#[test]
fn completion_is_one_undo_unit() {
    let mut s = with_words(&["status"]);
    s.feed("st");
    s.key(TAB);
    assert_eq!(s.line(), "status ");
    s.key(KeyEvent::ctrl('_'));
    assert_eq!(s.line(), "st");
}

#[test]
fn ambiguous_candidates_are_listed() {
    let mut s = with_words(&["cargo", "cat", "cd"]);
    s.feed("c");
    s.output();
    s.key(TAB);
    assert_eq!(s.line(), "c");
    let out = s.output();
    assert!(out.starts_with("\r\n"));
    for word in ["cargo", "cat", "cd"] {
        assert!(out.contains(word), "listing lacks {word}: {out:?}");
    }
    assert!(out.ends_with("\r\x1b[2K$ c"));
}

#[test]
fn no_candidates_leaves_line_alone() {
    let mut s = with_words(&["alpha"]);
    s.feed("zz");
    s.output();
    s.key(TAB);
    assert_eq!(s.line(), "zz");
    assert_eq!(s.output(), "");
}

#[test]
fn spaces_in_a_single_candidate_are_escaped() {
    let mut s = Session::emacs();
    s.processor.add_completer(Box::new(|op: &mut CompleteOperation| {
        op.set_offset(op.cursor());
        op.add_candidate("my file");
    }));
    s.feed("open ");
    s.key(TAB);
    assert_eq!(s.line(), "open my\\ file ");
}

#[test]
fn escaped_space_prefix_completes_without_losing_characters() {
    let mut s = with_words(&["my file", "other"]);
    s.feed("cat my\\ f");
    s.key(TAB);
    assert_eq!(s.line(), "cat my\\ file ");
}

#[test]
fn escaped_space_prefix_common_prefix_is_escaped() {
    let mut s = with_words(&["my file one", "my file two"]);
    s.feed("cat my\\ f");
    s.key(TAB);
    assert_eq!(s.line(), "cat my\\ file\\ ");
}

#[test]
fn completer_may_opt_out_of_escaping_and_separator() {
    let mut s = Session::emacs();
    s.processor.add_completer(Box::new(|op: &mut CompleteOperation| {
        op.set_ignore_non_escaped_space(true);
        op.set_append_separator(false);
        op.add_candidate("a b");
    }));
    s.key(TAB);
    assert_eq!(s.line(), "a b");
}

#[test]
fn first_completer_with_candidates_wins() {
    let mut s = Session::emacs();
    s.processor
        .add_completer(Box::new(|_: &mut CompleteOperation| {}));
    s.processor
        .add_completer(Box::new(WordListCompleter::new(["help"])));
    s.processor
        .add_completer(Box::new(WordListCompleter::new(["hello"])));
    s.feed("he");
    s.key(TAB);
    assert_eq!(s.line(), "help ");
}
