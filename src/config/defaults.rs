//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default base delay before the synthetic paste fires (seconds)
pub const DEFAULT_BASE_PASTE_DELAY_SECS: f64 = 0.25;

/// Largest base delay honored; longer values are clamped (seconds)
pub const MAX_BASE_PASTE_DELAY_SECS: f64 = 60.0;

/// Default number of snapshots kept on the stack
pub const DEFAULT_MAX_STACK_DEPTH: usize = 20;

/// Default preview length (characters)
pub const DEFAULT_MAX_PREVIEW_LENGTH: usize = 32;

/// Preview lengths at or above this value disable truncation
pub const PREVIEW_LENGTH_UNLIMITED: usize = 100;

/// Default pop-and-paste hotkey (Cmd+Option+V)
pub const DEFAULT_POP_HOTKEY_MODIFIERS: &[&str] = &["meta", "alt"];
pub const DEFAULT_POP_HOTKEY_KEY: &str = "KeyV";

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "~/.stackclip/config.json";
