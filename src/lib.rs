#![allow(unexpected_cfgs)]

//! StackClip - a clipboard history stack
//!
//! Watches the system clipboard, keeps previous contents (every flavor) on a
//! bounded stack, and pastes them back with a global hotkey.

pub mod clipboard_stack;
pub mod config;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod platform;
pub mod watcher;
