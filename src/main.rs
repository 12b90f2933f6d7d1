use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use stack_clip::clipboard_stack::{EngineHandle, EngineRuntime};
use stack_clip::config::{self, Config};
use stack_clip::error::ResultExt;
use stack_clip::hotkeys::HotkeyBindings;
use stack_clip::watcher::ConfigWatcher;
use stack_clip::{logging, platform};

/// Clipboard history stack: pop previous clipboard contents back with a hotkey.
#[derive(Parser, Debug)]
#[command(name = "stack-clip", version, about)]
struct Cli {
    /// Config file (default: ~/.stackclip/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override maxStackDepth
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Override basePasteDelay, in seconds
    #[arg(long, value_name = "SECONDS")]
    base_delay: Option<f64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);

    let (max_depth, base_delay) = (cli.max_depth, cli.base_delay);
    let load = move |path: &Path| -> Config {
        let mut config = config::load_config_from(path);
        config.apply_overrides(max_depth, base_delay);
        config
    };

    if cli.print_config {
        let effective = load(&config_path);
        println!("{}", serde_json::to_string_pretty(&effective)?);
        return Ok(());
    }

    let _logging_guard = logging::init();

    let initial = load(&config_path);
    let shared = config::shared(initial.clone());

    if !platform::has_accessibility_permission(true) {
        warn!("Accessibility permission not granted: entries will be restored to the clipboard without auto-paste");
    }

    let mut engine = EngineRuntime::new(shared)
        .on_stack_changed(|entries| {
            debug!(
                depth = entries.len(),
                bytes = entries.iter().map(|e| e.byte_len).sum::<usize>(),
                "Stack changed"
            );
        })
        .start(platform::system_clipboard, platform::system_paste_simulator())
        .context("Failed to start clipboard engine")?;

    // Hotkeys must be registered on the main thread
    let hotkeys = match HotkeyBindings::register(&initial) {
        Ok(bindings) => Some(bindings),
        Err(e) => {
            logging::log_error("HOTKEY", &format!("{:#}", e), Some("startup"));
            None
        }
    };
    if let Some(bindings) = &hotkeys {
        bindings.start_forwarder(engine.sender()).log_err();
    }
    if hotkeys.as_ref().map_or(true, HotkeyBindings::is_empty) {
        warn!("No hotkeys registered; the stack can only be used programmatically");
    }

    let mut watcher = ConfigWatcher::new(config_path);
    watcher.start(engine.sender(), load).warn_on_err();

    info!(
        hotkeys = hotkeys.as_ref().map_or(0, HotkeyBindings::len),
        "StackClip running"
    );
    run_event_loop(&mut engine, initial.show_dock_icon);

    watcher.stop();
    engine.shutdown();
    drop(hotkeys);
    Ok(())
}

/// Run the AppKit event loop, as an accessory app (no Dock icon) unless
/// `show_dock_icon` is set. Hotkey events are only delivered while this
/// loop runs.
#[cfg(target_os = "macos")]
fn run_event_loop(_engine: &mut EngineHandle, show_dock_icon: bool) {
    use cocoa::appkit::{NSApplication, NSApplicationActivationPolicy};
    use cocoa::base::nil;
    use cocoa::foundation::NSAutoreleasePool;

    unsafe {
        let _pool = NSAutoreleasePool::new(nil);
        let app = NSApplication::sharedApplication(nil);
        let policy = if show_dock_icon {
            NSApplicationActivationPolicy::NSApplicationActivationPolicyRegular
        } else {
            NSApplicationActivationPolicy::NSApplicationActivationPolicyAccessory
        };
        app.setActivationPolicy_(policy);
        app.run();
    }
}

#[cfg(not(target_os = "macos"))]
fn run_event_loop(engine: &mut EngineHandle, _show_dock_icon: bool) {
    info!("No native event loop on this platform, waiting on the engine thread");
    engine.wait();
}
