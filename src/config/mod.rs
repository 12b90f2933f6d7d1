//! Configuration module - Application settings and user preferences
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.stackclip/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//! - A shared handle passed explicitly into the engine
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (Config, HotkeyConfig)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

use parking_lot::RwLock;
use std::sync::Arc;

pub use defaults::{
    DEFAULT_BASE_PASTE_DELAY_SECS, DEFAULT_CONFIG_PATH, DEFAULT_MAX_PREVIEW_LENGTH,
    DEFAULT_MAX_STACK_DEPTH, MAX_BASE_PASTE_DELAY_SECS, PREVIEW_LENGTH_UNLIMITED,
};

pub use types::{Config, HotkeyConfig};

pub use loader::{default_config_path, load_config, load_config_from};

/// Shared configuration handle.
///
/// Owned by the application root and handed to the engine at construction.
/// Readers take the lock only for the duration of a single operation, so
/// values may change between restores.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Wrap a config in a shared handle.
pub fn shared(config: Config) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
