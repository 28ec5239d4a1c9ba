//! Debounced "geometry is changing" tracking.

use std::time::Duration;

use framepump::{FrameTime, TimerHandle, TimerQueue};

use crate::geometry::Sample;

/// Tracks the previous sample and owns the debounce timer for the scrolling flag.
#[derive(Debug)]
pub struct ActivityTracker {
    previous: Option<Sample>,
    debounce: Option<TimerHandle>,
    quiet_period: Duration,
}

impl ActivityTracker {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            previous: None,
            debounce: None,
            quiet_period,
        }
    }

    /// Record `sample`. Returns true if it differs from the previous one.
    ///
    /// The first sample always counts as a change.
    pub fn observe(&mut self, sample: Sample) -> bool {
        if self.previous == Some(sample) {
            return false;
        }
        self.previous = Some(sample);
        true
    }

    /// Cancel any pending debounce and start a new one ending `quiet_period` after `now`.
    pub fn restart<F>(&mut self, timers: &TimerQueue, now: FrameTime, on_quiet: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        self.debounce = Some(timers.schedule(self.quiet_period, now, on_quiet));
    }

    /// Cancel the pending debounce, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
    }
}
