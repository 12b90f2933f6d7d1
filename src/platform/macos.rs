//! macOS backend: NSPasteboard and Core Graphics keyboard events.
//!
//! Reads NSPasteboard.generalPasteboard.changeCount for cheap polling (no
//! payload reads) and copies every advertised type as raw bytes.
//!
//! ## Limitations
//!
//! Only the first pasteboard item is captured: `types` and `dataForType:` on
//! the pasteboard itself see just that item. A multi-item copy (several files
//! selected in Finder) is restored as a single item.
//!
//! ## Permissions
//!
//! Posting keyboard events requires Accessibility permission in
//! System Settings > Privacy & Security > Accessibility.

use cocoa::base::{id, nil, BOOL, NO};
use cocoa::foundation::{NSAutoreleasePool, NSString};
use macos_accessibility_client::accessibility;
use objc::{class, msg_send, sel, sel_impl};
use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{ClipboardPlatform, PasteSimulator};
use crate::clipboard_stack::flavor::FlavorMap;
use crate::error::{Result, StackClipError};

/// Drains an autorelease pool on drop.
///
/// The engine runs on a background thread that has no pool of its own.
struct AutoreleasePool(id);

impl AutoreleasePool {
    fn new() -> Self {
        unsafe { AutoreleasePool(NSAutoreleasePool::new(nil)) }
    }
}

impl Drop for AutoreleasePool {
    fn drop(&mut self) {
        unsafe { self.0.drain() }
    }
}

unsafe fn general_pasteboard() -> id {
    msg_send![class!(NSPasteboard), generalPasteboard]
}

unsafe fn ns_string(value: &str) -> id {
    NSString::alloc(nil).init_str(value).autorelease()
}

unsafe fn rust_string(value: id) -> Option<String> {
    if value == nil {
        return None;
    }
    let ptr: *const c_char = msg_send![value, UTF8String];
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// The general pasteboard.
///
/// Holds no Objective-C pointers; the pasteboard is looked up per call.
#[derive(Debug)]
pub struct MacPasteboard;

impl MacPasteboard {
    pub fn new() -> Result<Self> {
        let _pool = AutoreleasePool::new();
        let pasteboard = unsafe { general_pasteboard() };
        if pasteboard == nil {
            return Err(StackClipError::Clipboard(
                "NSPasteboard.generalPasteboard is unavailable".into(),
            ));
        }
        Ok(Self)
    }
}

impl ClipboardPlatform for MacPasteboard {
    fn change_count(&mut self) -> i64 {
        let _pool = AutoreleasePool::new();
        unsafe {
            let pasteboard = general_pasteboard();
            if pasteboard == nil {
                return 0;
            }
            // changeCount is an NSInteger (i64 on 64-bit)
            let change_count: i64 = msg_send![pasteboard, changeCount];
            change_count
        }
    }

    fn flavors(&mut self) -> Vec<String> {
        let _pool = AutoreleasePool::new();
        unsafe {
            let pasteboard = general_pasteboard();
            if pasteboard == nil {
                return Vec::new();
            }
            let types: id = msg_send![pasteboard, types];
            if types == nil {
                return Vec::new();
            }
            let count: usize = msg_send![types, count];
            (0..count)
                .filter_map(|index| {
                    let flavor: id = msg_send![types, objectAtIndex: index];
                    rust_string(flavor)
                })
                .collect()
        }
    }

    fn read_bytes(&mut self, flavor: &str) -> Option<Vec<u8>> {
        let _pool = AutoreleasePool::new();
        unsafe {
            let pasteboard = general_pasteboard();
            if pasteboard == nil {
                return None;
            }
            let data: id = msg_send![pasteboard, dataForType: ns_string(flavor)];
            if data == nil {
                return None;
            }
            let len: usize = msg_send![data, length];
            if len == 0 {
                return Some(Vec::new());
            }
            let ptr: *const u8 = msg_send![data, bytes];
            if ptr.is_null() {
                return None;
            }
            Some(std::slice::from_raw_parts(ptr, len).to_vec())
        }
    }

    fn clear(&mut self) -> Result<()> {
        let _pool = AutoreleasePool::new();
        unsafe {
            let pasteboard = general_pasteboard();
            if pasteboard == nil {
                return Err(StackClipError::Clipboard(
                    "NSPasteboard.generalPasteboard is unavailable".into(),
                ));
            }
            let _: i64 = msg_send![pasteboard, clearContents];
        }
        Ok(())
    }

    fn write_item(&mut self, item: &FlavorMap) -> Result<()> {
        let _pool = AutoreleasePool::new();
        unsafe {
            let pasteboard = general_pasteboard();
            if pasteboard == nil {
                return Err(StackClipError::ClipboardWrite {
                    message: "NSPasteboard.generalPasteboard is unavailable".into(),
                    flavor_count: item.len(),
                });
            }

            let pasteboard_item: id = msg_send![class!(NSPasteboardItem), new];
            for (flavor, bytes) in item {
                let data: id = msg_send![
                    class!(NSData),
                    dataWithBytes: bytes.as_ptr() as *const c_void
                    length: bytes.len()
                ];
                let accepted: BOOL =
                    msg_send![pasteboard_item, setData: data forType: ns_string(flavor)];
                if accepted == NO {
                    debug!(flavor = %flavor, "NSPasteboardItem rejected flavor");
                }
            }

            let objects: id = msg_send![class!(NSArray), arrayWithObject: pasteboard_item];
            let written: BOOL = msg_send![pasteboard, writeObjects: objects];
            let _: () = msg_send![pasteboard_item, release];

            if written == NO {
                return Err(StackClipError::ClipboardWrite {
                    message: "NSPasteboard writeObjects: returned NO".into(),
                    flavor_count: item.len(),
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "nspasteboard"
    }
}

// ============================================================================
// Permission Functions
// ============================================================================

/// Check if accessibility permissions are granted, optionally showing the
/// system prompt that opens System Settings.
#[instrument]
pub fn has_accessibility_permission(prompt: bool) -> bool {
    let granted = if prompt {
        info!("Requesting accessibility permission");
        accessibility::application_is_trusted_with_prompt()
    } else {
        accessibility::application_is_trusted()
    };
    debug!(granted, "Checked accessibility permission");
    granted
}

// ============================================================================
// Synthetic Paste
// ============================================================================

/// Simulates Cmd+V with Core Graphics events.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoreGraphicsPaste;

impl PasteSimulator for CoreGraphicsPaste {
    fn simulate_paste(&self) -> Result<()> {
        if !accessibility::application_is_trusted() {
            warn!("Accessibility permission missing, clipboard updated without auto-paste");
            return Err(StackClipError::AccessibilityDenied);
        }
        simulate_paste_with_cg()
    }
}

/// Simulate Cmd+V paste using Core Graphics events posted at the HID tap.
fn simulate_paste_with_cg() -> Result<()> {
    use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

    // 'v' key is keycode 9 on macOS
    const KEY_V: CGKeyCode = 9;

    let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| StackClipError::Paste("Failed to create CGEventSource".into()))?;

    let key_down = CGEvent::new_keyboard_event(source.clone(), KEY_V, true)
        .map_err(|_| StackClipError::Paste("Failed to create key down event".into()))?;
    key_down.set_flags(CGEventFlags::CGEventFlagCommand);

    let key_up = CGEvent::new_keyboard_event(source, KEY_V, false)
        .map_err(|_| StackClipError::Paste("Failed to create key up event".into()))?;
    key_up.set_flags(CGEventFlags::CGEventFlagCommand);

    key_down.post(CGEventTapLocation::HID);
    thread::sleep(Duration::from_millis(5));
    key_up.post(CGEventTapLocation::HID);

    debug!("Simulated Cmd+V via Core Graphics");
    Ok(())
}

// ============================================================================
// System Tests (require `cargo test --features system-tests`)
// ============================================================================
// These tests touch the real pasteboard.
