//! Deferred paste handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// A synthetic paste scheduled after a restore.
///
/// Clones share the cancellation token. Nothing in the engine cancels a
/// pending paste on its own: two quick restores queue two keystrokes.
#[derive(Debug, Clone)]
pub struct PendingPaste {
    pub id: Uuid,
    /// Digest of the restored snapshot, for logs.
    pub digest: String,
    pub delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl PendingPaste {
    pub fn new(digest: String, delay: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            digest,
            delay,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let paste = PendingPaste::new("abc".into(), Duration::from_millis(10));
        let handle = paste.clone();
        assert!(!paste.is_cancelled());
        handle.cancel();
        assert!(paste.is_cancelled());
        assert_eq!(paste.id, handle.id);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = PendingPaste::new("a".into(), Duration::ZERO);
        let b = PendingPaste::new("a".into(), Duration::ZERO);
        assert_ne!(a.id, b.id);
    }
}
