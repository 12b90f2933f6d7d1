//! In-process clipboard and paste simulator.
//!
//! Both types are cheap handles over shared state: clone one, hand the clone
//! to the engine, and inspect the original from the outside.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{ClipboardPlatform, PasteSimulator};
use crate::clipboard_stack::flavor::{FlavorMap, PLAIN_TEXT};
use crate::error::{Result, StackClipError};

#[derive(Debug, Default)]
struct MemoryState {
    change_count: i64,
    items: FlavorMap,
    /// Flavors advertised without readable bytes
    unreadable: BTreeSet<String>,
    writes: usize,
    fail_writes: bool,
}

/// Clipboard that lives entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate another application copying `flavors`.
    pub fn copy<'a>(&self, flavors: impl IntoIterator<Item = (&'a str, &'a [u8])>) {
        let mut state = self.state.lock();
        state.items = flavors
            .into_iter()
            .map(|(flavor, bytes)| (flavor.to_string(), bytes.to_vec()))
            .collect();
        state.unreadable.clear();
        state.change_count += 1;
    }

    /// Simulate another application copying plain text.
    pub fn copy_text(&self, text: &str) {
        self.copy([(PLAIN_TEXT, text.as_bytes())]);
    }

    /// Advertise a flavor whose payload cannot be read.
    pub fn advertise_unreadable(&self, flavor: &str) {
        self.state.lock().unreadable.insert(flavor.to_string());
    }

    /// Make subsequent clear/write calls fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Current contents.
    pub fn contents(&self) -> FlavorMap {
        self.state.lock().items.clone()
    }

    /// Current plain-text contents, if any.
    pub fn text(&self) -> Option<String> {
        self.state
            .lock()
            .items
            .get(PLAIN_TEXT)
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }

    pub fn current_change_count(&self) -> i64 {
        self.state.lock().change_count
    }

    /// Number of successful `write_item` calls.
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }
}

impl ClipboardPlatform for MemoryClipboard {
    fn change_count(&mut self) -> i64 {
        self.state.lock().change_count
    }

    fn flavors(&mut self) -> Vec<String> {
        let state = self.state.lock();
        state
            .items
            .keys()
            .chain(state.unreadable.iter())
            .cloned()
            .collect()
    }

    fn read_bytes(&mut self, flavor: &str) -> Option<Vec<u8>> {
        self.state.lock().items.get(flavor).cloned()
    }

    fn clear(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(StackClipError::Clipboard("memory clipboard is read-only".into()));
        }
        state.items.clear();
        state.unreadable.clear();
        state.change_count += 1;
        Ok(())
    }

    fn write_item(&mut self, item: &FlavorMap) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(StackClipError::ClipboardWrite {
                message: "memory clipboard is read-only".into(),
                flavor_count: item.len(),
            });
        }
        state.items = item.clone();
        state.change_count += 1;
        state.writes += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Paste simulator that counts keystrokes instead of posting them.
#[derive(Debug, Clone, Default)]
pub struct RecordingPasteSimulator {
    pastes: Arc<AtomicUsize>,
}

impl RecordingPasteSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paste_count(&self) -> usize {
        self.pastes.load(Ordering::SeqCst)
    }
}

impl PasteSimulator for RecordingPasteSimulator {
    fn simulate_paste(&self) -> Result<()> {
        self.pastes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
