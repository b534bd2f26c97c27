use std::collections::VecDeque;

use tracing::trace;

use crate::{History, HistoryError, SearchDirection};

#[derive(Debug, Clone)]
pub struct InMemoryHistory {
    entries: VecDeque<String>,
    capacity: usize,
    fetch: usize,
    gap: usize,
    direction: SearchDirection,
    current: String,
    enabled: bool,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::InvalidCapacity { capacity });
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            fetch: 0,
            gap: 0,
            direction: SearchDirection::default(),
            current: String::new(),
            enabled: true,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn reset_cursors(&mut self) {
        self.fetch = self.entries.len();
        self.gap = self.entries.len();
    }
}

impl History for InMemoryHistory {
    fn push(&mut self, entry: &str) {
        if self.entries.back().map(String::as_str) == Some(entry) {
            trace!(target: "history", size = self.entries.len(), "push_duplicate_of_latest");
        } else {
            self.entries.push_back(entry.to_string());
            if self.entries.len() > self.capacity {
                let _ = self.entries.pop_front();
                trace!(target: "history", capacity = self.capacity, "evict_oldest");
            }
            trace!(target: "history", len = entry.len(), size = self.entries.len(), "push");
        }
        self.current.clear();
        self.reset_cursors();
    }

    fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn previous_fetch(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.fetch > 0 {
            self.fetch -= 1;
        }
        self.entries.get(self.fetch).map(String::as_str)
    }

    fn next_fetch(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.fetch + 1 < self.entries.len() {
            self.fetch += 1;
            self.entries.get(self.fetch).map(String::as_str)
        } else {
            self.fetch = self.entries.len();
            Some(&self.current)
        }
    }

    fn is_navigating(&self) -> bool {
        self.fetch < self.entries.len()
    }

    fn set_current(&mut self, line: &str) {
        self.current = line.to_string();
    }

    fn current(&self) -> &str {
        &self.current
    }

    fn search_direction(&self) -> SearchDirection {
        self.direction
    }

    fn set_search_direction(&mut self, direction: SearchDirection) {
        self.direction = direction;
    }

    fn search(&mut self, term: &str) -> Option<&str> {
        let entries = &self.entries;
        let gap = self.gap.min(entries.len());
        let matches = |i: &usize| entries[*i].contains(term);
        let hit = match self.direction {
            SearchDirection::Reverse => (0..gap)
                .rev()
                .find(matches)
                .or_else(|| (gap..entries.len()).rev().find(matches)),
            SearchDirection::Forward => (gap..entries.len())
                .find(matches)
                .or_else(|| (0..gap).find(matches)),
        };
        let Some(hit) = hit else {
            trace!(target: "history", direction = ?self.direction, "search_miss");
            return None;
        };
        self.gap = match self.direction {
            SearchDirection::Reverse => hit,
            SearchDirection::Forward => hit + 1,
        };
        trace!(target: "history", direction = ?self.direction, index = hit, "search_hit");
        self.entries.get(hit).map(String::as_str)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.current.clear();
        self.reset_cursors();
        trace!(target: "history", "clear");
    }

    fn get_all(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn stop(&mut self) -> Result<(), HistoryError> {
        Ok(())
    }
}
