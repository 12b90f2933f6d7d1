//! Bounded clipboard stack
//!
//! Newest entry at index 0. Inserts only at the front, evicts only from the
//! back, and never stores the same snapshot twice in a row.

use std::collections::VecDeque;

use super::snapshot::ContentSnapshot;

/// Result of [`ClipboardStack::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Snapshot became the new top; `evicted` entries fell off the back.
    Inserted { evicted: usize },
    /// Snapshot equals the current top; nothing changed.
    Duplicate,
}

/// Read-only listing row for one stack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntryView {
    pub index: usize,
    pub preview: String,
    pub flavors: Vec<String>,
    pub byte_len: usize,
}

#[derive(Debug, Clone)]
pub struct ClipboardStack {
    entries: VecDeque<ContentSnapshot>,
    max_depth: usize,
}

impl ClipboardStack {
    /// Create an empty stack. A depth of 0 is treated as 1.
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            entries: VecDeque::with_capacity(max_depth),
            max_depth,
        }
    }

    pub fn push(&mut self, snapshot: ContentSnapshot) -> PushOutcome {
        if self.entries.front() == Some(&snapshot) {
            return PushOutcome::Duplicate;
        }
        self.entries.push_front(snapshot);
        PushOutcome::Inserted {
            evicted: self.evict_to(self.max_depth),
        }
    }

    pub fn peek_top(&self) -> Option<&ContentSnapshot> {
        self.entries.front()
    }

    /// Remove and return the top entry. No-op on an empty stack.
    pub fn pop_top(&mut self) -> Option<ContentSnapshot> {
        self.entries.pop_front()
    }

    /// Remove every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    /// Change the capacity, evicting from the back if the stack is now too deep.
    pub fn set_max_depth(&mut self, max_depth: usize) -> usize {
        self.max_depth = max_depth.max(1);
        self.evict_to(self.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get(&self, index: usize) -> Option<&ContentSnapshot> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &ContentSnapshot> {
        self.entries.iter()
    }

    /// Listing rows with previews truncated to `preview_limit`.
    pub fn views(&self, preview_limit: Option<usize>) -> Vec<StackEntryView> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, snapshot)| StackEntryView {
                index,
                preview: snapshot.preview(preview_limit),
                flavors: snapshot.flavors().map(str::to_string).collect(),
                byte_len: snapshot.byte_len(),
            })
            .collect()
    }

    fn evict_to(&mut self, depth: usize) -> usize {
        let excess = self.entries.len().saturating_sub(depth);
        self.entries.truncate(depth);
        excess
    }
}
