//! Clipboard stack engine
//!
//! Owns the stack and the change detector and is driven one event at a time
//! from a single thread (see `runtime`). Side effects that need a clock or
//! the input system are returned as [`Effect`]s instead of being performed
//! here, so the whole engine runs in tests against a `MemoryClipboard`.

use tracing::{debug, info, instrument, warn};

use super::change_detection::{ChangeDetector, DetectorState, Observation};
use super::paste_delay::paste_delay;
use super::restore::PendingPaste;
use super::snapshot::ContentSnapshot;
use super::stack::{ClipboardStack, PushOutcome, StackEntryView};
use crate::config::{Config, SharedConfig};
use crate::logging;
use crate::platform::ClipboardPlatform;

/// Action bound to a global hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Restore the top entry, paste it, and pop it
    PopPaste,
    /// Restore the top entry and paste it, keeping it on the stack
    PeekPaste,
    /// Remove every entry
    ClearStack,
}

impl HotkeyAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HotkeyAction::PopPaste => "pop_paste",
            HotkeyAction::PeekPaste => "peek_paste",
            HotkeyAction::ClearStack => "clear_stack",
        }
    }
}

/// Everything the engine reacts to.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Poll the clipboard change counter
    Tick,
    Hotkey(HotkeyAction),
    Restore { pop: bool },
    /// Put the entry at `index` on the clipboard (menu selection)
    CopyToClipboard { index: usize },
    Clear,
    ConfigChanged(Config),
    /// A scheduled paste's delay has elapsed
    PasteDue(PendingPaste),
    Shutdown,
}

/// Work the engine asks its host to perform.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Deliver `PasteDue` back to the engine after `paste.delay`
    SchedulePaste(PendingPaste),
    /// Post the paste keystroke now
    SimulatePaste(PendingPaste),
}

/// Called with the current listing after every stack mutation.
pub type StackListener = Box<dyn FnMut(&[StackEntryView]) + Send>;

pub struct ClipboardEngine {
    config: SharedConfig,
    platform: Box<dyn ClipboardPlatform>,
    detector: ChangeDetector,
    stack: ClipboardStack,
    on_stack_changed: Option<StackListener>,
}

impl ClipboardEngine {
    /// Create an engine. The change counter is read now, so whatever is on
    /// the clipboard at startup is never recorded.
    pub fn new(config: SharedConfig, mut platform: Box<dyn ClipboardPlatform>) -> Self {
        let initial_change_count = platform.change_count();
        let max_depth = config.read().get_max_stack_depth();
        info!(
            backend = platform.name(),
            initial_change_count,
            max_depth,
            "Clipboard engine created"
        );
        Self {
            config,
            platform,
            detector: ChangeDetector::new(initial_change_count),
            stack: ClipboardStack::new(max_depth),
            on_stack_changed: None,
        }
    }

    pub fn with_listener(mut self, listener: StackListener) -> Self {
        self.on_stack_changed = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: StackListener) {
        self.on_stack_changed = Some(listener);
    }

    /// Process one event.
    pub fn handle(&mut self, event: EngineEvent) -> Vec<Effect> {
        match event {
            EngineEvent::Tick => {
                self.tick();
                Vec::new()
            }
            EngineEvent::Hotkey(action) => {
                debug!(action = action.as_str(), "Hotkey action received");
                match action {
                    HotkeyAction::PopPaste => self.restore_effects(true),
                    HotkeyAction::PeekPaste => self.restore_effects(false),
                    HotkeyAction::ClearStack => {
                        self.clear();
                        Vec::new()
                    }
                }
            }
            EngineEvent::Restore { pop } => self.restore_effects(pop),
            EngineEvent::CopyToClipboard { index } => {
                self.copy_to_clipboard(index);
                Vec::new()
            }
            EngineEvent::Clear => {
                self.clear();
                Vec::new()
            }
            EngineEvent::ConfigChanged(config) => {
                self.apply_config(config);
                Vec::new()
            }
            EngineEvent::PasteDue(paste) => {
                if paste.is_cancelled() {
                    debug!(correlation_id = %paste.id, "Pending paste was cancelled");
                    Vec::new()
                } else {
                    vec![Effect::SimulatePaste(paste)]
                }
            }
            EngineEvent::Shutdown => Vec::new(),
        }
    }

    /// Poll the clipboard once and record a genuine change.
    pub fn tick(&mut self) {
        let current = self.platform.change_count();
        match self.detector.observe(current) {
            Observation::Unchanged => {}
            Observation::SuppressedEcho => {
                debug!(change_count = current, "Ignored clipboard change from own write");
            }
            Observation::Changed => {
                let Some(snapshot) = ContentSnapshot::capture(self.platform.as_mut()) else {
                    debug!(change_count = current, "Clipboard changed but nothing was readable");
                    return;
                };
                let digest = snapshot.digest();
                match self.stack.push(snapshot) {
                    PushOutcome::Inserted { evicted } => {
                        if evicted > 0 {
                            debug!(evicted, "Evicted oldest stack entries");
                        }
                        logging::log_stack_event("push", self.stack.len(), Some(digest.as_str()));
                        self.notify_stack_changed();
                    }
                    PushOutcome::Duplicate => {
                        debug!(digest = %digest, "Clipboard content equals stack top, skipped");
                    }
                }
            }
        }
    }

    /// Write the top entry back to the clipboard and prepare its paste.
    ///
    /// Returns None on an empty stack. When `pop` is set the entry is removed
    /// immediately; the paste still fires later.
    #[instrument(skip(self), fields(depth = self.stack.len()))]
    pub fn restore(&mut self, pop: bool) -> Option<PendingPaste> {
        let Some(snapshot) = self.stack.peek_top().cloned() else {
            debug!("Restore requested on empty stack");
            return None;
        };

        // Must be armed before the write lands
        self.detector.expect_self_write();
        self.write_snapshot(&snapshot);

        let base = self.config.read().get_base_paste_delay();
        let delay = paste_delay(&snapshot, base);
        let paste = PendingPaste::new(snapshot.digest(), delay);
        logging::log_restore_event(pop, snapshot.flavor_count(), delay, &paste.digest);

        if pop {
            self.stack.pop_top();
            logging::log_stack_event("pop", self.stack.len(), Some(paste.digest.as_str()));
            self.notify_stack_changed();
        }

        Some(paste)
    }

    /// Put the entry at `index` on the clipboard without pasting.
    ///
    /// Suppression is not armed, so the next tick records the copy as a new
    /// top entry. Returns false for an out-of-range index.
    pub fn copy_to_clipboard(&mut self, index: usize) -> bool {
        let Some(snapshot) = self.stack.get(index).cloned() else {
            debug!(index, depth = self.stack.len(), "Copy requested for missing entry");
            return false;
        };
        info!(index, digest = %snapshot.digest(), "Copying stack entry to clipboard");
        self.write_snapshot(&snapshot);
        true
    }

    /// Remove every entry. Safe to call on an empty stack.
    pub fn clear(&mut self) {
        let removed = self.stack.clear();
        if removed > 0 {
            logging::log_stack_event("clear", 0, None);
            self.notify_stack_changed();
        }
    }

    /// Store a new configuration and re-bound the stack.
    pub fn apply_config(&mut self, config: Config) {
        let max_depth = config.get_max_stack_depth();
        *self.config.write() = config;

        let evicted = self.stack.set_max_depth(max_depth);
        info!(max_depth, evicted, "Configuration applied");
        if evicted > 0 {
            logging::log_stack_event("evict", self.stack.len(), None);
        }
        // Preview limit may have changed too, so listeners always re-render
        self.notify_stack_changed();
    }

    /// Current listing with the configured preview limit.
    pub fn entries(&self) -> Vec<StackEntryView> {
        let limit = self.config.read().get_preview_limit();
        self.stack.views(limit)
    }

    pub fn stack(&self) -> &ClipboardStack {
        &self.stack
    }

    pub fn detector_state(&self) -> DetectorState {
        self.detector.state()
    }

    fn restore_effects(&mut self, pop: bool) -> Vec<Effect> {
        self.restore(pop)
            .map(Effect::SchedulePaste)
            .into_iter()
            .collect()
    }

    fn write_snapshot(&mut self, snapshot: &ContentSnapshot) {
        let item = snapshot.restore_form();
        let written = self
            .platform
            .clear()
            .and_then(|()| self.platform.write_item(&item));
        if let Err(e) = written {
            warn!(
                error = %e,
                backend = self.platform.name(),
                digest = %snapshot.digest(),
                "Clipboard write failed"
            );
        }
    }

    fn notify_stack_changed(&mut self) {
        if self.on_stack_changed.is_none() {
            return;
        }
        let entries = self.entries();
        if let Some(listener) = self.on_stack_changed.as_mut() {
            listener(&entries);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
