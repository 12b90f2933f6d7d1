use async_channel::Sender;
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use crate::clipboard_stack::{EngineEvent, HotkeyAction};
use crate::config::{Config, HotkeyConfig};
use crate::error::StackClipError;
use crate::logging;

// =============================================================================
// Parsing
// =============================================================================

/// Convert a config key name (W3C `Code` naming, e.g. "KeyV") to a `Code`.
pub fn parse_key_code(key: &str) -> Option<Code> {
    let code = match key {
        "KeyA" => Code::KeyA,
        "KeyB" => Code::KeyB,
        "KeyC" => Code::KeyC,
        "KeyD" => Code::KeyD,
        "KeyE" => Code::KeyE,
        "KeyF" => Code::KeyF,
        "KeyG" => Code::KeyG,
        "KeyH" => Code::KeyH,
        "KeyI" => Code::KeyI,
        "KeyJ" => Code::KeyJ,
        "KeyK" => Code::KeyK,
        "KeyL" => Code::KeyL,
        "KeyM" => Code::KeyM,
        "KeyN" => Code::KeyN,
        "KeyO" => Code::KeyO,
        "KeyP" => Code::KeyP,
        "KeyQ" => Code::KeyQ,
        "KeyR" => Code::KeyR,
        "KeyS" => Code::KeyS,
        "KeyT" => Code::KeyT,
        "KeyU" => Code::KeyU,
        "KeyV" => Code::KeyV,
        "KeyW" => Code::KeyW,
        "KeyX" => Code::KeyX,
        "KeyY" => Code::KeyY,
        "KeyZ" => Code::KeyZ,
        "Digit0" => Code::Digit0,
        "Digit1" => Code::Digit1,
        "Digit2" => Code::Digit2,
        "Digit3" => Code::Digit3,
        "Digit4" => Code::Digit4,
        "Digit5" => Code::Digit5,
        "Digit6" => Code::Digit6,
        "Digit7" => Code::Digit7,
        "Digit8" => Code::Digit8,
        "Digit9" => Code::Digit9,
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,
        "Space" => Code::Space,
        "Enter" => Code::Enter,
        "Tab" => Code::Tab,
        "Escape" => Code::Escape,
        "Backspace" => Code::Backspace,
        "Semicolon" => Code::Semicolon,
        "Quote" => Code::Quote,
        "Comma" => Code::Comma,
        "Period" => Code::Period,
        "Slash" => Code::Slash,
        "Backslash" => Code::Backslash,
        "BracketLeft" => Code::BracketLeft,
        "BracketRight" => Code::BracketRight,
        "Minus" => Code::Minus,
        "Equal" => Code::Equal,
        "Backquote" => Code::Backquote,
        "ArrowUp" => Code::ArrowUp,
        "ArrowDown" => Code::ArrowDown,
        "ArrowLeft" => Code::ArrowLeft,
        "ArrowRight" => Code::ArrowRight,
        _ => return None,
    };
    Some(code)
}

/// Convert config modifier names to `Modifiers` flags.
pub fn parse_modifiers(modifiers: &[String]) -> Result<Modifiers, String> {
    let mut flags = Modifiers::empty();
    for modifier in modifiers {
        match modifier.as_str() {
            "meta" | "cmd" | "command" => flags |= Modifiers::META,
            "ctrl" | "control" => flags |= Modifiers::CONTROL,
            "alt" | "option" => flags |= Modifiers::ALT,
            "shift" => flags |= Modifiers::SHIFT,
            other => return Err(format!("unknown modifier '{}'", other)),
        }
    }
    Ok(flags)
}

/// Build a `HotKey` from its config form.
pub fn hotkey_from_config(config: &HotkeyConfig) -> Result<HotKey, StackClipError> {
    let invalid = |reason: String| StackClipError::Hotkey {
        shortcut: config.to_shortcut_string(),
        reason,
    };
    let modifiers = parse_modifiers(&config.modifiers).map_err(invalid)?;
    let code = parse_key_code(&config.key).ok_or_else(|| {
        invalid(format!(
            "unknown key '{}'. Valid keys: KeyA-KeyZ, Digit0-Digit9, F1-F12, Space, Enter, Tab, punctuation, arrows",
            config.key
        ))
    })?;
    let modifiers = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Ok(HotKey::new(modifiers, code))
}

/// Configured bindings as (action, hotkey config) pairs. Pop is always bound.
pub fn configured_bindings(config: &Config) -> Vec<(HotkeyAction, HotkeyConfig)> {
    let mut bindings = vec![(HotkeyAction::PopPaste, config.get_pop_hotkey())];
    if let Some(peek) = config.get_peek_hotkey() {
        bindings.push((HotkeyAction::PeekPaste, peek));
    }
    if let Some(clear) = config.get_clear_hotkey() {
        bindings.push((HotkeyAction::ClearStack, clear));
    }
    bindings
}

/// Format a hotkey registration error with helpful context
fn format_hotkey_error(e: &HotkeyError, shortcut_display: &str) -> String {
    match e {
        HotkeyError::AlreadyRegistered(hk) => {
            format!(
                "Hotkey '{}' is already registered by another application (ID: {}). \
                 Try a different shortcut or close the conflicting app.",
                shortcut_display,
                hk.id()
            )
        }
        HotkeyError::FailedToRegister(msg) => {
            format!(
                "System rejected hotkey '{}': {}. This shortcut may be reserved by macOS.",
                shortcut_display, msg
            )
        }
        HotkeyError::OsError(os_err) => {
            format!(
                "OS error registering '{}': {}. Check system hotkey settings.",
                shortcut_display, os_err
            )
        }
        other => format!("Failed to register hotkey '{}': {}", shortcut_display, other),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registered global hotkeys and the action each one triggers.
///
/// Must be created on the main thread and kept alive for as long as the
/// hotkeys should stay registered.
pub struct HotkeyBindings {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
    /// Hotkey ID -> (action, display string)
    actions: HashMap<u32, (HotkeyAction, String)>,
}

impl HotkeyBindings {
    /// Register every configured binding.
    ///
    /// A binding that fails to parse or register is logged and skipped;
    /// only failing to create the manager is an error.
    pub fn register(config: &Config) -> anyhow::Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow::anyhow!("Failed to create hotkey manager: {}", e))?;
        let mut bindings = Self {
            manager,
            registered: Vec::new(),
            actions: HashMap::new(),
        };

        for (action, hotkey_config) in configured_bindings(config) {
            let shortcut = hotkey_config.to_shortcut_string();
            let hotkey = match hotkey_from_config(&hotkey_config) {
                Ok(hotkey) => hotkey,
                Err(e) => {
                    logging::log_error("HOTKEY", &e.to_string(), Some(action.as_str()));
                    continue;
                }
            };
            if let Err(e) = bindings.manager.register(hotkey) {
                logging::log_error(
                    "HOTKEY",
                    &format_hotkey_error(&e, &shortcut),
                    Some(action.as_str()),
                );
                continue;
            }
            info!(
                shortcut = %shortcut,
                action = action.as_str(),
                hotkey_id = hotkey.id(),
                "Registered hotkey"
            );
            bindings.actions.insert(hotkey.id(), (action, shortcut));
            bindings.registered.push(hotkey);
        }
        Ok(bindings)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Spawn a thread forwarding key-up events of registered hotkeys into
    /// the engine inbox. Exits when the inbox closes.
    pub fn start_forwarder(&self, sender: Sender<EngineEvent>) -> std::io::Result<JoinHandle<()>> {
        let actions = self.actions.clone();
        thread::Builder::new()
            .name("stack-clip-hotkeys".into())
            .spawn(move || forward_hotkey_events(actions, sender))
    }
}

impl Drop for HotkeyBindings {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister_all(&self.registered) {
            debug!(error = %e, "Failed to unregister hotkeys on drop");
        }
    }
}

fn forward_hotkey_events(
    actions: HashMap<u32, (HotkeyAction, String)>,
    sender: Sender<EngineEvent>,
) {
    let receiver = GlobalHotKeyEvent::receiver();
    while let Ok(event) = receiver.recv() {
        // Fire on key-up so the user's modifiers are released before the
        // synthetic Cmd+V is posted
        if event.state != HotKeyState::Released {
            continue;
        }
        let Some((action, shortcut)) = actions.get(&event.id) else {
            debug!(hotkey_id = event.id, "Ignoring unknown hotkey id");
            continue;
        };
        logging::log_hotkey_event(shortcut, action.as_str());
        if sender
            .send_blocking(EngineEvent::Hotkey(*action))
            .is_err()
        {
            info!("Engine inbox closed, hotkey forwarder exiting");
            break;
        }
    }
}
