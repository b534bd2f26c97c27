use tracing::trace;

use crate::Buffer;

/// Maximum number of snapshots retained.
pub const UNDO_STACK_MAX: usize = 200;

/// Line content and logical cursor captured before a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoSnapshot {
    pub line: Vec<char>,
    pub cursor: usize,
}

/// Insert run state tracking.
#[derive(Debug, Clone)]
pub enum InsertRun {
    Inactive,
    Active { edits: u32 },
}

/// Undo-only snapshot stack. There is no redo: a line editor's kill-ring
/// covers re-insertion.
pub struct UndoStack {
    snapshots: Vec<UndoSnapshot>,
    insert_run: InsertRun,
    /// Count of snapshots skipped due to identical successive state.
    snapshots_skipped: u64,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            insert_run: InsertRun::Inactive,
            snapshots_skipped: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.snapshots.len()
    }
    pub fn insert_run(&self) -> &InsertRun {
        &self.insert_run
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    pub fn push_snapshot(&mut self, buffer: &Buffer) {
        if let Some(last) = self.snapshots.last()
            && last.cursor == buffer.cursor()
            && last.line == buffer.line()
        {
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", undo_depth = self.snapshots.len(), "snapshot_dedupe_skip");
            return;
        }
        self.snapshots.push(UndoSnapshot {
            line: buffer.line().to_vec(),
            cursor: buffer.cursor(),
        });
        trace!(target: "state.undo", undo_depth = self.snapshots.len(), len = buffer.len(), "push_snapshot");
        if self.snapshots.len() > UNDO_STACK_MAX {
            let _ = self.snapshots.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
    }

    /// Snapshot once at the first self-insert of a run; later inserts in the
    /// same run are captured by that snapshot.
    pub fn begin_insert_coalescing(&mut self, buffer: &Buffer) {
        match self.insert_run {
            InsertRun::Inactive => {
                self.push_snapshot(buffer);
                self.insert_run = InsertRun::Active { edits: 0 };
            }
            InsertRun::Active { .. } => {}
        }
    }

    pub fn end_insert_coalescing(&mut self) {
        self.insert_run = InsertRun::Inactive;
    }

    /// Snapshot for an edit that must undo on its own; closes any insert run.
    pub fn push_discrete_edit_snapshot(&mut self, buffer: &Buffer) {
        self.end_insert_coalescing();
        self.push_snapshot(buffer);
    }

    pub fn note_insert_edit(&mut self) {
        if let InsertRun::Active { edits, .. } = &mut self.insert_run {
            *edits += 1;
        }
    }

    /// Restore the most recent snapshot into `buffer`. Returns true if one existed.
    pub fn undo(&mut self, buffer: &mut Buffer) -> bool {
        self.end_insert_coalescing();
        if let Some(last) = self.snapshots.pop() {
            trace!(target: "state.undo", undo_depth = self.snapshots.len(), "undo_pop");
            buffer.replace(&last.line);
            buffer.set_cursor(last.cursor);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.end_insert_coalescing();
        trace!(target: "state.undo", "undo_stack_cleared");
    }
}
