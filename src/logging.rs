//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.stackclip/logs/stack-clip.jsonl) - structured for tooling
//! - **Pretty to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use stack_clip::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "stack_event", depth = 3, "Snapshot pushed");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2025-06-04T10:30:45.123Z","level":"INFO","target":"stack_clip::clipboard_stack::engine","fields":{"message":"Snapshot pushed","event_type":"stack_event","depth":3}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::time::Duration;

use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "stack-clip.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Dropping the guard will flush remaining logs and close the file.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_path();

    eprintln!("========================================");
    eprintln!("[STACK-CLIP] JSONL log: {}", log_path.display());
    eprintln!("[STACK-CLIP] Pretty logs: stderr");
    eprintln!("========================================");

    // Open log file with append mode; fall back to a sink so logging never
    // takes the process down.
    let (non_blocking_file, file_guard) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    };

    // Environment filter - default to info, allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,notify=warn"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::new(Rfc3339))
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Application logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.stackclip/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".stackclip").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("stack-clip-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a stack mutation with structured fields
pub fn log_stack_event(action: &str, depth: usize, digest: Option<&str>) {
    tracing::info!(
        event_type = "stack_event",
        action = action,
        depth = depth,
        digest = digest,
        "Stack {} (depth={})",
        action,
        depth
    );
}

/// Log a restore with the computed settle delay
pub fn log_restore_event(pop: bool, flavor_count: usize, delay: Duration, digest: &str) {
    tracing::info!(
        event_type = "restore_event",
        pop = pop,
        flavor_count = flavor_count,
        delay_ms = delay.as_millis() as u64,
        digest = digest,
        "Restored snapshot {} ({} flavor(s), paste in {}ms)",
        digest,
        flavor_count,
        delay.as_millis()
    );
}

/// Log a hotkey event with structured fields
pub fn log_hotkey_event(shortcut: &str, action: &str) {
    tracing::debug!(
        event_type = "hotkey_event",
        shortcut = shortcut,
        action = action,
        "Hotkey {} -> {}",
        shortcut,
        action
    );
}

/// Log an error with structured fields and context
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    let msg = match context {
        Some(ctx) => format!("{}: {} (context: {})", category, error, ctx),
        None => format!("{}: {}", category, error),
    };

    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "{}",
        msg
    );
}
