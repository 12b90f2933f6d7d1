use super::*;
use crate::clipboard_stack::flavor::{HTML, PLAIN_TEXT, RICH_TEXT, TIFF};
use crate::config::{self, Config};
use crate::platform::MemoryClipboard;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn config_with(max_depth: usize, base_delay: f64) -> Config {
    Config {
        max_stack_depth: max_depth,
        base_paste_delay: base_delay,
        ..Config::default()
    }
}

fn engine_with(config: Config) -> (ClipboardEngine, MemoryClipboard) {
    let clipboard = MemoryClipboard::new();
    let engine = ClipboardEngine::new(config::shared(config), Box::new(clipboard.clone()));
    (engine, clipboard)
}

fn previews(engine: &ClipboardEngine) -> Vec<String> {
    engine.entries().into_iter().map(|e| e.preview).collect()
}

fn copy_and_tick(engine: &mut ClipboardEngine, clipboard: &MemoryClipboard, text: &str) {
    clipboard.copy_text(text);
    engine.handle(EngineEvent::Tick);
}

fn scheduled(effects: &[Effect]) -> &PendingPaste {
    match effects {
        [Effect::SchedulePaste(paste)] => paste,
        other => panic!("expected one SchedulePaste effect, got {:?}", other),
    }
}

#[test]
fn test_startup_contents_are_not_captured() {
    let clipboard = MemoryClipboard::new();
    clipboard.copy_text("already there");
    let mut engine = ClipboardEngine::new(
        config::shared(Config::default()),
        Box::new(clipboard.clone()),
    );

    engine.handle(EngineEvent::Tick);
    assert!(engine.stack().is_empty());
}

#[test]
fn test_tick_captures_new_copy_once() {
    let (mut engine, clipboard) = engine_with(Config::default());
    clipboard.copy_text("hello");

    engine.handle(EngineEvent::Tick);
    engine.handle(EngineEvent::Tick);
    assert_eq!(previews(&engine), vec!["hello"]);
}

#[test]
fn test_copying_same_content_twice_is_deduplicated() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "same");
    copy_and_tick(&mut engine, &clipboard, "same");
    assert_eq!(engine.stack().len(), 1);
}

#[test]
fn test_unreadable_only_change_records_nothing() {
    let (mut engine, clipboard) = engine_with(Config::default());
    clipboard.copy(std::iter::empty::<(&str, &[u8])>());
    clipboard.advertise_unreadable("com.example.file-promise");

    engine.handle(EngineEvent::Tick);
    assert!(engine.stack().is_empty());
}

#[test]
fn test_multi_flavor_copy_keeps_every_readable_flavor() {
    let (mut engine, clipboard) = engine_with(Config::default());
    clipboard.copy([
        (PLAIN_TEXT, &b"bold"[..]),
        (HTML, &b"<b>bold</b>"[..]),
    ]);
    clipboard.advertise_unreadable("com.example.private");

    engine.handle(EngineEvent::Tick);
    let entries = engine.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].flavors, vec![HTML.to_string(), PLAIN_TEXT.to_string()]);
}

#[test]
fn test_restore_does_not_record_its_own_write() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "a");
    copy_and_tick(&mut engine, &clipboard, "b");

    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(effects.len(), 1);
    assert_eq!(engine.detector_state(), DetectorState::Suppressing);

    engine.handle(EngineEvent::Tick);
    engine.handle(EngineEvent::Tick);
    assert_eq!(previews(&engine), vec!["b", "a"]);
    assert_eq!(engine.detector_state(), DetectorState::Idle);
}

#[test]
fn test_pop_removes_top_immediately_and_paste_still_fires() {
    let (mut engine, clipboard) = engine_with(Config::default());
    for text in ["c", "b", "a"] {
        copy_and_tick(&mut engine, &clipboard, text);
    }
    assert_eq!(previews(&engine), vec!["a", "b", "c"]);

    let effects = engine.handle(EngineEvent::Hotkey(HotkeyAction::PopPaste));
    let paste = scheduled(&effects).clone();
    assert_eq!(previews(&engine), vec!["b", "c"]);
    assert_eq!(clipboard.text().as_deref(), Some("a"));

    // Further mutation before the paste is due does not cancel it
    engine.handle(EngineEvent::Clear);
    let effects = engine.handle(EngineEvent::PasteDue(paste.clone()));
    assert!(matches!(
        effects.as_slice(),
        [Effect::SimulatePaste(p)] if p.id == paste.id
    ));
}

#[test]
fn test_peek_keeps_top() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "keep me");

    let effects = engine.handle(EngineEvent::Hotkey(HotkeyAction::PeekPaste));
    assert_eq!(effects.len(), 1);
    assert_eq!(previews(&engine), vec!["keep me"]);
}

#[test]
fn test_restore_on_empty_stack_is_noop() {
    let (mut engine, clipboard) = engine_with(Config::default());
    let before = clipboard.current_change_count();

    assert!(engine.handle(EngineEvent::Restore { pop: true }).is_empty());
    assert_eq!(clipboard.current_change_count(), before);
    assert_eq!(clipboard.write_count(), 0);
    assert_eq!(engine.detector_state(), DetectorState::Idle);
}

#[test]
fn test_overlapping_restores_schedule_two_pastes() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "one");
    copy_and_tick(&mut engine, &clipboard, "two");

    let first = scheduled(&engine.handle(EngineEvent::Restore { pop: true })).clone();
    let second = scheduled(&engine.handle(EngineEvent::Restore { pop: true })).clone();
    assert_ne!(first.id, second.id);
    assert_eq!(engine.handle(EngineEvent::PasteDue(first)).len(), 1);
    assert_eq!(engine.handle(EngineEvent::PasteDue(second)).len(), 1);
    assert!(engine.stack().is_empty());
}

#[test]
fn test_cancelled_paste_is_dropped() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "x");

    let paste = scheduled(&engine.handle(EngineEvent::Restore { pop: false })).clone();
    paste.cancel();
    assert!(engine.handle(EngineEvent::PasteDue(paste)).is_empty());
}

#[test]
fn test_clear_is_idempotent() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "a");

    engine.handle(EngineEvent::Hotkey(HotkeyAction::ClearStack));
    assert!(engine.stack().is_empty());
    engine.handle(EngineEvent::Clear);
    assert!(engine.stack().is_empty());
}

#[test]
fn test_end_to_end_depth_two() {
    let (mut engine, clipboard) = engine_with(config_with(2, 0.2));
    copy_and_tick(&mut engine, &clipboard, "hello");
    copy_and_tick(&mut engine, &clipboard, "world");
    copy_and_tick(&mut engine, &clipboard, "foo");
    assert_eq!(previews(&engine), vec!["foo", "world"]);

    let effects = engine.handle(EngineEvent::Restore { pop: true });
    let paste = scheduled(&effects);
    assert_eq!(paste.delay, Duration::from_millis(100));
    assert_eq!(clipboard.text().as_deref(), Some("foo"));
    assert_eq!(previews(&engine), vec!["world"]);

    engine.handle(EngineEvent::Tick);
    assert_eq!(previews(&engine), vec!["world"]);
}

#[test]
fn test_restore_delay_follows_flavor_mix() {
    let (mut engine, clipboard) = engine_with(config_with(5, 0.2));
    clipboard.copy([
        (PLAIN_TEXT, &b"x"[..]),
        (RICH_TEXT, &br"{\rtf1 x}"[..]),
        (HTML, &b"<p>x</p>"[..]),
    ]);
    engine.handle(EngineEvent::Tick);
    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(scheduled(&effects).delay, Duration::from_millis(400));
    // Consume the echo of the restore
    engine.handle(EngineEvent::Tick);

    clipboard.copy([(RICH_TEXT, &br"{\rtf1 y}"[..]), (TIFF, &b"II*"[..])]);
    engine.handle(EngineEvent::Tick);
    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(scheduled(&effects).delay, Duration::from_millis(200));
}

#[test]
fn test_huge_base_delay_still_schedules_paste() {
    let (mut engine, clipboard) = engine_with(config_with(5, 1.0e19));
    clipboard.copy([("com.example.other", &b"x"[..])]);
    engine.handle(EngineEvent::Tick);

    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(
        scheduled(&effects).delay,
        Duration::from_secs_f64(config::MAX_BASE_PASTE_DELAY_SECS * 2.0)
    );
    assert_eq!(engine.stack().len(), 1);
}

#[test]
fn test_restore_reads_base_delay_at_time_of_use() {
    let shared = config::shared(config_with(5, 0.2));
    let clipboard = MemoryClipboard::new();
    let mut engine = ClipboardEngine::new(shared.clone(), Box::new(clipboard.clone()));
    copy_and_tick(&mut engine, &clipboard, "x");

    shared.write().base_paste_delay = 1.0;
    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(scheduled(&effects).delay, Duration::from_millis(500));
}

#[test]
fn test_write_failure_keeps_suppression_armed() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "a");
    clipboard.fail_writes(true);

    let effects = engine.handle(EngineEvent::Restore { pop: false });
    assert_eq!(effects.len(), 1);
    assert_eq!(engine.detector_state(), DetectorState::Suppressing);

    // Next tick resynchronizes without capturing
    engine.handle(EngineEvent::Tick);
    assert_eq!(engine.detector_state(), DetectorState::Idle);
    assert_eq!(previews(&engine), vec!["a"]);
}

#[test]
fn test_copy_to_clipboard_is_recorded_as_new_top() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "old");
    copy_and_tick(&mut engine, &clipboard, "new");

    engine.handle(EngineEvent::CopyToClipboard { index: 1 });
    assert_eq!(clipboard.text().as_deref(), Some("old"));
    assert_eq!(engine.detector_state(), DetectorState::Idle);

    engine.handle(EngineEvent::Tick);
    assert_eq!(previews(&engine), vec!["old", "new", "old"]);
}

#[test]
fn test_copy_to_clipboard_out_of_range_is_noop() {
    let (mut engine, clipboard) = engine_with(Config::default());
    copy_and_tick(&mut engine, &clipboard, "only");

    assert!(!engine.copy_to_clipboard(5));
    assert_eq!(clipboard.write_count(), 0);
}

#[test]
fn test_config_change_rebounds_stack() {
    let (mut engine, clipboard) = engine_with(config_with(5, 0.25));
    for text in ["1", "2", "3", "4"] {
        copy_and_tick(&mut engine, &clipboard, text);
    }

    engine.handle(EngineEvent::ConfigChanged(config_with(2, 0.25)));
    assert_eq!(previews(&engine), vec!["4", "3"]);

    copy_and_tick(&mut engine, &clipboard, "5");
    assert_eq!(previews(&engine), vec!["5", "4"]);
}

#[test]
fn test_entries_use_preview_limit() {
    let config = Config {
        max_preview_length: 5,
        ..Config::default()
    };
    let (mut engine, clipboard) = engine_with(config);
    copy_and_tick(&mut engine, &clipboard, "truncated preview");
    assert_eq!(previews(&engine), vec!["trunc"]);

    let unlimited = Config {
        max_preview_length: 100,
        ..Config::default()
    };
    engine.handle(EngineEvent::ConfigChanged(unlimited));
    assert_eq!(previews(&engine), vec!["truncated preview"]);
}

#[test]
fn test_listener_sees_every_mutation() {
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let (engine, clipboard) = engine_with(Config::default());
    let mut engine = engine.with_listener(Box::new(move |entries: &[StackEntryView]| {
        sink.lock()
            .push(entries.iter().map(|e| e.preview.clone()).collect());
    }));

    copy_and_tick(&mut engine, &clipboard, "a");
    copy_and_tick(&mut engine, &clipboard, "a");
    copy_and_tick(&mut engine, &clipboard, "b");
    engine.handle(EngineEvent::Restore { pop: true });
    engine.handle(EngineEvent::Clear);
    engine.handle(EngineEvent::Clear);

    let seen = seen.lock();
    assert_eq!(
        *seen,
        vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "a".to_string()],
            vec!["a".to_string()],
            Vec::<String>::new(),
        ]
    );
}
