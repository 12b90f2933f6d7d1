//! Clipboard stack
//!
//! Records every clipboard change as a multi-flavor snapshot on a bounded
//! stack and restores entries on demand, followed by a synthetic paste.
//!
//! ## Module Structure
//! - `flavor`: flavor identifiers and classification
//! - `snapshot`: immutable multi-flavor captures and previews
//! - `rtf`: RTF to plain text for previews
//! - `stack`: bounded, de-duplicating stack
//! - `change_detection`: change counter tracking and self-write suppression
//! - `paste_delay`: adaptive settle delay before pasting
//! - `restore`: pending paste handles
//! - `engine`: event handling over all of the above
//! - `runtime`: engine thread, poll ticker and paste timers

pub mod change_detection;
pub mod engine;
pub mod flavor;
pub mod paste_delay;
pub mod restore;
mod rtf;
pub mod runtime;
pub mod snapshot;
pub mod stack;

pub use change_detection::{ChangeDetector, DetectorState, Observation};
pub use engine::{ClipboardEngine, Effect, EngineEvent, HotkeyAction, StackListener};
pub use flavor::{FlavorKind, FlavorMap};
pub use paste_delay::{paste_delay, DelayTier};
pub use restore::PendingPaste;
pub use runtime::{EngineHandle, EngineRuntime, POLL_INTERVAL};
pub use snapshot::{ContentSnapshot, NO_PREVIEW};
pub use stack::{ClipboardStack, PushOutcome, StackEntryView};
