//! Configuration loading from file system
//!
//! Handles loading and parsing ~/.stackclip/config.json.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;

/// Default config path with `~` expanded
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from ~/.stackclip/config.json
///
/// Returns Config::default() if the file is missing or invalid.
pub fn load_config() -> Config {
    load_config_from(&default_config_path())
}

/// Load configuration from an explicit path.
///
/// This function:
/// 1. Checks if the config file exists
/// 2. Reads it as UTF-8
/// 3. Parses the JSON into a Config struct (every field has a default)
///
/// Returns Config::default() if any step fails.
#[instrument(name = "load_config")]
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                path = %config_path.display(),
                error = %e,
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(contents.trim()) {
        Ok(config) => {
            info!(
                path = %config_path.display(),
                max_stack_depth = config.max_stack_depth,
                base_paste_delay = config.base_paste_delay,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            // Provide helpful error message for common config mistakes
            let error_hint = if e.to_string().contains("missing field `modifiers`")
                || e.to_string().contains("missing field `key`")
            {
                "\n\nHint: hotkeys require 'modifiers' (array) and 'key' (string). Example:\n\
                \"popHotkey\": {\n\
                  \"modifiers\": [\"meta\", \"alt\"],  // \"meta\", \"ctrl\", \"alt\", \"shift\"\n\
                  \"key\": \"KeyV\"\n\
                }"
            } else {
                ""
            };

            warn!(
                error = %e,
                path = %config_path.display(),
                hint = %error_hint,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
