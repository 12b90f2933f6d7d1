use super::*;
use std::io::Write;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.base_paste_delay, DEFAULT_BASE_PASTE_DELAY_SECS);
    assert_eq!(config.max_stack_depth, DEFAULT_MAX_STACK_DEPTH);
    assert_eq!(config.max_preview_length, DEFAULT_MAX_PREVIEW_LENGTH);
    assert!(!config.show_dock_icon);
    assert_eq!(config.pop_hotkey, None);
    assert_eq!(config.peek_hotkey, None);
    assert_eq!(config.clear_hotkey, None);
}

#[test]
fn test_default_pop_hotkey_is_cmd_option_v() {
    let hotkey = Config::default().get_pop_hotkey();
    assert_eq!(hotkey.modifiers, vec!["meta", "alt"]);
    assert_eq!(hotkey.key, "KeyV");
    assert_eq!(hotkey.to_shortcut_string(), "alt+cmd+v");
}

#[test]
fn test_empty_json_uses_all_defaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_camel_case_keys() {
    let json = r#"{
        "basePasteDelay": 0.2,
        "maxStackDepth": 2,
        "maxPreviewLength": 10,
        "showDockIcon": true,
        "peekHotkey": { "modifiers": ["meta", "alt", "shift"], "key": "KeyV" }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.base_paste_delay, 0.2);
    assert_eq!(config.max_stack_depth, 2);
    assert_eq!(config.max_preview_length, 10);
    assert!(config.show_dock_icon);
    assert_eq!(
        config.get_peek_hotkey().map(|h| h.to_shortcut_string()),
        Some("alt+cmd+shift+v".to_string())
    );
}

#[test]
fn test_serialization_skips_unset_hotkeys() {
    let json = serde_json::to_string(&Config::default()).unwrap();
    assert!(!json.contains("null"));
    assert!(!json.contains("popHotkey"));
    assert!(json.contains("maxStackDepth"));
}

#[test]
fn test_base_paste_delay_sanitized() {
    let mut config = Config::default();
    config.base_paste_delay = 0.2;
    assert_eq!(config.get_base_paste_delay(), Duration::from_millis(200));

    config.base_paste_delay = 0.0;
    assert_eq!(
        config.get_base_paste_delay(),
        Duration::from_secs_f64(DEFAULT_BASE_PASTE_DELAY_SECS)
    );

    config.base_paste_delay = f64::NAN;
    assert_eq!(
        config.get_base_paste_delay(),
        Duration::from_secs_f64(DEFAULT_BASE_PASTE_DELAY_SECS)
    );
}

#[test]
fn test_huge_base_paste_delay_is_clamped() {
    let max = Duration::from_secs_f64(MAX_BASE_PASTE_DELAY_SECS);
    let mut config = Config::default();
    for secs in [MAX_BASE_PASTE_DELAY_SECS + 1.0, 1.0e19, 1.0e30, f64::MAX] {
        config.base_paste_delay = secs;
        assert_eq!(config.get_base_paste_delay(), max, "{secs}");
    }

    config.base_paste_delay = MAX_BASE_PASTE_DELAY_SECS;
    assert_eq!(config.get_base_paste_delay(), max);
}

#[test]
fn test_max_stack_depth_never_zero() {
    let mut config = Config::default();
    config.max_stack_depth = 0;
    assert_eq!(config.get_max_stack_depth(), 1);
}

#[test]
fn test_preview_limit_ceiling_means_unlimited() {
    let mut config = Config::default();
    config.max_preview_length = 0;
    assert_eq!(config.get_preview_limit(), Some(0));

    config.max_preview_length = PREVIEW_LENGTH_UNLIMITED - 1;
    assert_eq!(config.get_preview_limit(), Some(PREVIEW_LENGTH_UNLIMITED - 1));

    config.max_preview_length = PREVIEW_LENGTH_UNLIMITED;
    assert_eq!(config.get_preview_limit(), None);

    config.max_preview_length = usize::MAX;
    assert_eq!(config.get_preview_limit(), None);
}

#[test]
fn test_apply_overrides() {
    let mut config = Config::default();
    config.apply_overrides(Some(5), None);
    assert_eq!(config.max_stack_depth, 5);
    assert_eq!(config.base_paste_delay, DEFAULT_BASE_PASTE_DELAY_SECS);

    config.apply_overrides(None, Some(0.1));
    assert_eq!(config.max_stack_depth, 5);
    assert_eq!(config.base_paste_delay, 0.1);
}

#[test]
fn test_to_shortcut_string_normalizes_keys() {
    let digit = HotkeyConfig {
        modifiers: vec!["ctrl".to_string()],
        key: "Digit0".to_string(),
    };
    assert_eq!(digit.to_shortcut_string(), "ctrl+0");

    let named = HotkeyConfig {
        modifiers: vec!["shift".to_string(), "option".to_string()],
        key: "Space".to_string(),
    };
    assert_eq!(named.to_shortcut_string(), "alt+shift+space");
}

#[test]
fn test_load_config_missing_file_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("config.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"{{ "maxStackDepth": 7, "basePasteDelay": 0.4 }}"#).unwrap();

    let config = load_config_from(&path);
    assert_eq!(config.max_stack_depth, 7);
    assert_eq!(config.base_paste_delay, 0.4);
    assert_eq!(config.max_preview_length, DEFAULT_MAX_PREVIEW_LENGTH);
}

#[test]
fn test_load_config_invalid_json_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert_eq!(load_config_from(&path), Config::default());
}

#[test]
fn test_load_config_hotkey_missing_key_returns_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "popHotkey": { "modifiers": ["meta"] } }"#).unwrap();

    assert_eq!(load_config_from(&path), Config::default());
}

#[test]
fn test_shared_handle_sees_updates() {
    let handle = shared(Config::default());
    let reader = handle.clone();
    handle.write().max_stack_depth = 3;
    assert_eq!(reader.read().get_max_stack_depth(), 3);
}

#[test]
fn test_default_config_path_is_expanded() {
    let path = default_config_path();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with(".stackclip/config.json"));
}
