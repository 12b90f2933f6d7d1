use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for StackClip
#[derive(Error, Debug)]
pub enum StackClipError {
    #[error("Clipboard access failed: {0}")]
    Clipboard(String),

    #[error("Clipboard write failed for {flavor_count} flavor(s): {message}")]
    ClipboardWrite {
        message: String,
        flavor_count: usize,
    },

    #[error("Synthetic paste failed: {0}")]
    Paste(String),

    #[error("Synthetic paste is not supported on this platform")]
    PasteUnsupported,

    #[error("Accessibility permission is required to post keyboard events")]
    AccessibilityDenied,

    #[error("Invalid hotkey '{shortcut}': {reason}")]
    Hotkey { shortcut: String, reason: String },

}

impl StackClipError {
    /// Whether the failure leaves the engine fully functional.
    ///
    /// Paste failures only lose the auto-paste; the clipboard content has
    /// already been placed.
    pub fn is_degraded_mode(&self) -> bool {
        matches!(
            self,
            Self::Paste(_) | Self::PasteUnsupported | Self::AccessibilityDenied
        )
    }
}

pub type Result<T> = std::result::Result<T, StackClipError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use stack_clip::error::ResultExt;
///
/// // Log and keep going if the clipboard refuses the write
/// clipboard.write_item(&item).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
