//! Platform ports
//!
//! The engine talks to the system clipboard and to the synthetic input API
//! only through the two traits defined here, so it can run against an
//! in-memory clipboard in tests.
//!
//! ## Backends
//! - `macos`: NSPasteboard (every flavor, native changeCount) + Core Graphics Cmd+V
//! - `portable`: arboard (plain text + PNG image, content-hash change counter)
//! - `memory`: in-process clipboard and recording paste simulator

#[cfg(target_os = "macos")]
mod macos;
mod memory;
#[cfg(not(target_os = "macos"))]
mod portable;

use crate::clipboard_stack::flavor::FlavorMap;
use crate::error::Result;

pub use memory::{MemoryClipboard, RecordingPasteSimulator};

#[cfg(target_os = "macos")]
pub use macos::{CoreGraphicsPaste, MacPasteboard};
#[cfg(not(target_os = "macos"))]
pub use portable::{ArboardClipboard, UnsupportedPaste};

/// Access to the system clipboard.
///
/// Mirrors the pasteboard model: a monotonically increasing change counter,
/// a set of advertised flavors, and per-flavor byte payloads.
pub trait ClipboardPlatform {
    /// Current change counter. Increments on every clipboard write.
    fn change_count(&mut self) -> i64;

    /// Flavor identifiers advertised for the current clipboard contents.
    fn flavors(&mut self) -> Vec<String>;

    /// Bytes for one flavor, or None when the flavor cannot be read.
    fn read_bytes(&mut self, flavor: &str) -> Option<Vec<u8>>;

    /// Remove all clipboard contents.
    fn clear(&mut self) -> Result<()>;

    /// Write one item carrying every flavor in `item`.
    fn write_item(&mut self, item: &FlavorMap) -> Result<()>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Posts a synthetic paste keystroke to the foreground application.
pub trait PasteSimulator: Send {
    fn simulate_paste(&self) -> Result<()>;
}

/// Open the system clipboard backend for this platform.
pub fn system_clipboard() -> Result<Box<dyn ClipboardPlatform>> {
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(MacPasteboard::new()?))
    }
    #[cfg(not(target_os = "macos"))]
    {
        Ok(Box::new(ArboardClipboard::new()?))
    }
}

/// Synthetic paste backend for this platform.
pub fn system_paste_simulator() -> Box<dyn PasteSimulator> {
    #[cfg(target_os = "macos")]
    {
        Box::new(CoreGraphicsPaste)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(UnsupportedPaste)
    }
}

/// Check (and optionally prompt for) permission to post keyboard events.
///
/// Always true on platforms without such a permission model.
pub fn has_accessibility_permission(prompt: bool) -> bool {
    #[cfg(target_os = "macos")]
    {
        macos::has_accessibility_permission(prompt)
    }
    #[cfg(not(target_os = "macos"))]
    {
        let _ = prompt;
        true
    }
}
