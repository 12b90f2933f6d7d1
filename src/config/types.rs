//! Configuration type definitions
//!
//! This module contains all the struct definitions for configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::defaults::*;

// ============================================
// HOTKEY CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    pub modifiers: Vec<String>,
    pub key: String,
}

impl HotkeyConfig {
    /// Create the default pop-and-paste hotkey (Cmd+Option+V)
    pub fn default_pop_hotkey() -> Self {
        HotkeyConfig {
            modifiers: DEFAULT_POP_HOTKEY_MODIFIERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            key: DEFAULT_POP_HOTKEY_KEY.to_string(),
        }
    }

    /// Convert to canonical shortcut string format (e.g., "alt+cmd+v").
    ///
    /// Maps modifier names from config format to shortcut format:
    /// - "meta" -> "cmd"
    /// - "ctrl" -> "ctrl"
    /// - "alt" -> "alt"
    /// - "shift" -> "shift"
    ///
    /// Keys are normalized:
    /// - "KeyX" -> "x" (strip Key prefix, lowercase)
    /// - "Digit0" -> "0" (strip Digit prefix)
    /// - Other keys kept as-is but lowercased
    pub fn to_shortcut_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        // Consistent order: alt, cmd, ctrl, shift
        let has_alt = self.modifiers.iter().any(|m| m == "alt" || m == "option");
        let has_cmd = self.modifiers.iter().any(|m| m == "meta" || m == "cmd");
        let has_ctrl = self.modifiers.iter().any(|m| m == "ctrl" || m == "control");
        let has_shift = self.modifiers.iter().any(|m| m == "shift");

        if has_alt {
            parts.push("alt".to_string());
        }
        if has_cmd {
            parts.push("cmd".to_string());
        }
        if has_ctrl {
            parts.push("ctrl".to_string());
        }
        if has_shift {
            parts.push("shift".to_string());
        }

        let key = if let Some(letter) = self.key.strip_prefix("Key") {
            letter.to_lowercase()
        } else if let Some(digit) = self.key.strip_prefix("Digit") {
            digit.to_string()
        } else {
            self.key.to_lowercase()
        };
        parts.push(key);

        parts.join("+")
    }
}

// ============================================
// MAIN CONFIG
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base settle delay in seconds before the synthetic paste (default: 0.25)
    #[serde(default = "default_base_paste_delay")]
    pub base_paste_delay: f64,
    /// Maximum number of snapshots retained on the stack (default: 20)
    #[serde(default = "default_max_stack_depth")]
    pub max_stack_depth: usize,
    /// Preview length in characters; values >= 100 mean unlimited (default: 32)
    #[serde(default = "default_max_preview_length")]
    pub max_preview_length: usize,
    /// Show a Dock icon on macOS instead of running as an accessory app (default: false)
    #[serde(default)]
    pub show_dock_icon: bool,
    /// Restore the top entry, paste it, and pop it (default: Cmd+Option+V)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop_hotkey: Option<HotkeyConfig>,
    /// Restore the top entry and paste it without popping (default: unbound)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peek_hotkey: Option<HotkeyConfig>,
    /// Clear the whole stack (default: unbound)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_hotkey: Option<HotkeyConfig>,
}

fn default_base_paste_delay() -> f64 {
    DEFAULT_BASE_PASTE_DELAY_SECS
}
fn default_max_stack_depth() -> usize {
    DEFAULT_MAX_STACK_DEPTH
}
fn default_max_preview_length() -> usize {
    DEFAULT_MAX_PREVIEW_LENGTH
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_paste_delay: DEFAULT_BASE_PASTE_DELAY_SECS,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            max_preview_length: DEFAULT_MAX_PREVIEW_LENGTH,
            show_dock_icon: false,
            pop_hotkey: None, // Will use HotkeyConfig::default_pop_hotkey() via getter
            peek_hotkey: None,
            clear_hotkey: None,
        }
    }
}

impl Config {
    /// Base paste delay as a Duration.
    ///
    /// Non-positive or non-finite values fall back to the default; values
    /// above `MAX_BASE_PASTE_DELAY_SECS` are clamped to it.
    pub fn get_base_paste_delay(&self) -> Duration {
        let secs = self.base_paste_delay;
        if !(secs.is_finite() && secs > 0.0) {
            warn!(base_paste_delay = secs, "Invalid basePasteDelay, using default");
            return Duration::from_secs_f64(DEFAULT_BASE_PASTE_DELAY_SECS);
        }
        if secs > MAX_BASE_PASTE_DELAY_SECS {
            warn!(
                base_paste_delay = secs,
                max = MAX_BASE_PASTE_DELAY_SECS,
                "basePasteDelay too large, clamping"
            );
            return Duration::from_secs_f64(MAX_BASE_PASTE_DELAY_SECS);
        }
        Duration::try_from_secs_f64(secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_BASE_PASTE_DELAY_SECS))
    }

    /// Maximum stack depth, never below 1.
    pub fn get_max_stack_depth(&self) -> usize {
        self.max_stack_depth.max(1)
    }

    /// Preview character limit, or None when the configured value means unlimited.
    pub fn get_preview_limit(&self) -> Option<usize> {
        if self.max_preview_length >= PREVIEW_LENGTH_UNLIMITED {
            None
        } else {
            Some(self.max_preview_length)
        }
    }

    /// Get the pop hotkey, falling back to Cmd+Option+V
    pub fn get_pop_hotkey(&self) -> HotkeyConfig {
        self.pop_hotkey
            .clone()
            .unwrap_or_else(HotkeyConfig::default_pop_hotkey)
    }

    /// Get the peek hotkey, if one is configured
    pub fn get_peek_hotkey(&self) -> Option<HotkeyConfig> {
        self.peek_hotkey.clone()
    }

    /// Get the clear hotkey, if one is configured
    pub fn get_clear_hotkey(&self) -> Option<HotkeyConfig> {
        self.clear_hotkey.clone()
    }

    /// Apply command-line overrides on top of file values.
    pub fn apply_overrides(&mut self, max_stack_depth: Option<usize>, base_paste_delay: Option<f64>) {
        if let Some(depth) = max_stack_depth {
            self.max_stack_depth = depth;
        }
        if let Some(delay) = base_paste_delay {
            self.base_paste_delay = delay;
        }
    }
}
