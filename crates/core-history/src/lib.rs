//! Bounded command history with fetch navigation and substring search.
//!
//! Two cursors walk the log independently:
//! - the *fetch* cursor drives previous/next navigation and sits one slot past
//!   the newest entry after every push;
//! - the *search* gap sits between entries. A reverse search examines entries
//!   below the gap and leaves it at the match, a forward search examines
//!   entries from the gap upward and leaves it just past the match. An
//!   exhausted scan wraps to the opposite end.
//!
//! Searching does not move the fetch cursor and vice versa.

mod error;
mod file;
mod memory;

pub use error::HistoryError;
pub use file::{FileAccessPermission, FileHistory};
pub use memory::InMemoryHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Reverse,
    Forward,
}

/// History store consulted by the line editor. Entries are returned borrowed;
/// callers copy what they keep.
pub trait History: Send {
    /// Append `entry` unless it equals the newest entry. Resets both cursors.
    fn push(&mut self, entry: &str);

    fn get(&self, index: usize) -> Option<&str>;

    fn size(&self) -> usize;

    /// Step the fetch cursor toward older entries, stopping at the oldest.
    fn previous_fetch(&mut self) -> Option<&str>;

    /// Step the fetch cursor toward newer entries. Stepping past the newest
    /// returns the line that was being edited before navigation began.
    fn next_fetch(&mut self) -> Option<&str>;

    /// True while the fetch cursor points at a stored entry rather than past
    /// the newest one.
    fn is_navigating(&self) -> bool;

    /// Remember the line being edited so `next_fetch` can return to it.
    fn set_current(&mut self, line: &str);

    fn current(&self) -> &str;

    fn search_direction(&self) -> SearchDirection;

    /// Changes only the direction of the next scan, not the gap position.
    fn set_search_direction(&mut self, direction: SearchDirection);

    /// Nearest entry containing `term`, scanning from the search gap.
    fn search(&mut self, term: &str) -> Option<&str>;

    fn clear(&mut self);

    fn get_all(&self) -> Vec<String>;

    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Flush to durable storage, if any.
    fn stop(&mut self) -> Result<(), HistoryError>;
}
