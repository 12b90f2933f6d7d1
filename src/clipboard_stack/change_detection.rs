//! Change counter tracking with one-shot self-write suppression.

/// Detector state between poll ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    /// The next tick is an echo of our own write and must be ignored.
    Suppressing,
}

/// What one poll tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Unchanged,
    /// Counter moved and the change came from someone else: capture it.
    Changed,
    /// Tick consumed by suppression; counter resynchronized.
    SuppressedEcho,
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    last_change_count: i64,
    state: DetectorState,
}

impl ChangeDetector {
    /// Start tracking from `initial_change_count`; content already on the
    /// clipboard at that point is never reported.
    pub fn new(initial_change_count: i64) -> Self {
        Self {
            last_change_count: initial_change_count,
            state: DetectorState::Idle,
        }
    }

    /// Arm suppression. Must be called before writing to the clipboard.
    pub fn expect_self_write(&mut self) {
        self.state = DetectorState::Suppressing;
    }

    /// Process one poll tick with the platform's current counter.
    ///
    /// Suppression is consumed on the first tick after arming, whether or not
    /// the counter moved.
    pub fn observe(&mut self, current_change_count: i64) -> Observation {
        let changed = current_change_count != self.last_change_count;
        self.last_change_count = current_change_count;

        match self.state {
            DetectorState::Suppressing => {
                self.state = DetectorState::Idle;
                Observation::SuppressedEcho
            }
            DetectorState::Idle if changed => Observation::Changed,
            DetectorState::Idle => Observation::Unchanged,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn last_change_count(&self) -> i64 {
        self.last_change_count
    }
}
