//! Adaptive settle delay between a clipboard write and the synthetic paste.
//!
//! Receiving apps pick up simple text almost immediately but can take longer
//! to see rich or multi-flavor items. The delay scales the configured base by
//! the snapshot's flavor mix; the first matching tier wins.

use std::time::Duration;

use super::flavor::FlavorKind;
use super::snapshot::ContentSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayTier {
    /// Only plain text: base / 2
    PlainOnly,
    /// Rich text, HTML, or image with at most two flavors: base
    Heavy,
    /// More than two flavors: base * 2
    Mixed,
    /// Anything else (e.g. one unknown flavor): base * 2
    Fallback,
}

impl DelayTier {
    pub fn classify(snapshot: &ContentSnapshot) -> Self {
        let kinds: Vec<FlavorKind> = snapshot.flavors().map(FlavorKind::of).collect();

        if kinds == [FlavorKind::PlainText] {
            DelayTier::PlainOnly
        } else if kinds.iter().any(|kind| kind.is_heavy()) && kinds.len() <= 2 {
            DelayTier::Heavy
        } else if kinds.len() > 2 {
            DelayTier::Mixed
        } else {
            DelayTier::Fallback
        }
    }

    pub fn apply(self, base: Duration) -> Duration {
        match self {
            DelayTier::PlainOnly => base / 2,
            DelayTier::Heavy => base,
            DelayTier::Mixed | DelayTier::Fallback => base.saturating_mul(2),
        }
    }
}

/// Delay before pasting `snapshot` given the configured base delay.
pub fn paste_delay(snapshot: &ContentSnapshot, base: Duration) -> Duration {
    DelayTier::classify(snapshot).apply(base)
}
