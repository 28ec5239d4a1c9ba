//! Tokio-driven refresh loop for hosts without a display refresh callback.
//!
//! Each tick fires due timers, then pumps the scheduler if it requested a
//! frame. The scheduler is single-threaded, so run this on a current-thread
//! runtime (a plain `#[tokio::main(flavor = "current_thread")]` or `LocalSet`).

use std::rc::Rc;
use std::time::Duration;

use log::{debug, trace};
use tokio::time::{Instant, MissedTickBehavior, interval};

use crate::FrameTime;
use crate::driver::ManualDriver;
use crate::scheduler::FrameScheduler;
use crate::timer::TimerQueue;

/// Default refresh period (roughly 60 Hz).
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(16);

/// Drives a [`FrameScheduler`] and a [`TimerQueue`] from a fixed-period interval.
#[derive(Debug)]
pub struct Ticker {
    scheduler: FrameScheduler,
    driver: Rc<ManualDriver>,
    timers: TimerQueue,
    period: Duration,
    origin: Instant,
}

impl Ticker {
    /// Create a ticker. `driver` must be the driver `scheduler` was built with.
    pub fn new(scheduler: FrameScheduler, driver: Rc<ManualDriver>, timers: TimerQueue) -> Self {
        Self {
            scheduler,
            driver,
            timers,
            period: DEFAULT_PERIOD,
            origin: Instant::now(),
        }
    }

    /// Set the refresh period.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Frame time now, measured from when the ticker was created.
    pub fn now(&self) -> FrameTime {
        self.origin.elapsed()
    }

    /// Run one refresh: fire due timers, then pump if a frame was requested.
    ///
    /// Returns true if the scheduler was pumped.
    pub fn tick(&self) -> bool {
        let now = self.now();
        self.timers.fire_due(now);
        if self.driver.fire().is_some() {
            let report = self.scheduler.pump(now);
            trace!("[ticker] {:?}", report);
            true
        } else {
            false
        }
    }

    /// Tick until no frame is requested and no timer is pending.
    ///
    /// Returns the number of frames pumped.
    pub async fn run_until_idle(&self) -> u64 {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = 0;
        loop {
            ticks.tick().await;
            if self.tick() {
                frames += 1;
            } else if self.timers.is_empty() {
                break;
            }
        }
        debug!("[ticker] Idle after {} frames", frames);
        frames
    }

    /// Tick exactly `count` times, regardless of idleness.
    ///
    /// Returns the number of frames pumped.
    pub async fn run_ticks(&self, count: usize) -> u64 {
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut frames = 0;
        for _ in 0..count {
            ticks.tick().await;
            if self.tick() {
                frames += 1;
            }
        }
        frames
    }
}
