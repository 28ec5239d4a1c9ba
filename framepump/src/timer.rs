//! Cancellable one-shot timers on the frame clock.
//!
//! The host advances the queue with [`TimerQueue::fire_due`]; callbacks whose
//! deadline has passed run in deadline order. Handles cancel idempotently, so a
//! debounce can always "cancel whatever is pending, then schedule again".

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{error, trace};

use crate::FrameTime;
use crate::error::{PumpError, extract_panic_message};

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct TimerEntry {
    id: TimerId,
    deadline: FrameTime,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct TimerState {
    next_id: u64,
    entries: Vec<TimerEntry>,
    error_handler: Option<Rc<dyn Fn(&PumpError)>>,
}

impl TimerState {
    /// Remove and return the earliest entry due at `now`, ignoring timers
    /// scheduled at or after `limit` (those wait for the next call).
    fn take_due(&mut self, now: FrameTime, limit: u64) -> Option<TimerEntry> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now && e.id.0 < limit)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;
        Some(self.entries.remove(index))
    }
}

/// Shared queue of pending timers.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<TimerState>>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for panicking callbacks.
    ///
    /// Shared by every clone of the queue. A later call replaces the previous handler.
    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(&PumpError) + 'static,
    {
        self.inner.borrow_mut().error_handler = Some(Rc::new(handler));
        self
    }

    /// Run `callback` once `delay` has elapsed after `now`.
    pub fn schedule<F>(&self, delay: Duration, now: FrameTime, callback: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let mut state = self.inner.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let deadline = now + delay;
        state.entries.push(TimerEntry {
            id,
            deadline,
            callback: Box::new(callback),
        });
        trace!("[timer] Scheduled {} for {:?}", id, deadline);

        TimerHandle {
            id,
            queue: Rc::downgrade(&self.inner),
        }
    }

    /// Fire every timer due at `now`. Returns how many callbacks ran.
    ///
    /// Timers scheduled by a callback during this call are left for the next one.
    pub fn fire_due(&self, now: FrameTime) -> usize {
        let limit = self.inner.borrow().next_id + 1;
        let mut fired = 0;

        loop {
            let Some(entry) = self.inner.borrow_mut().take_due(now, limit) else {
                break;
            };
            trace!("[timer] Firing {} at {:?}", entry.id, now);
            fired += 1;

            let TimerEntry { id, callback, .. } = entry;
            if let Err(panic) = catch_unwind(AssertUnwindSafe(callback)) {
                let err = PumpError::TimerPanic {
                    id,
                    message: extract_panic_message(&panic),
                };
                error!("[timer] {}", err);
                let handler = self.inner.borrow().error_handler.clone();
                if let Some(handler) = handler {
                    handler(&err);
                }
            }
        }

        fired
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<FrameTime> {
        self.inner.borrow().entries.iter().map(|e| e.deadline).min()
    }
}

impl std::fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("pending", &self.pending())
            .field("next_deadline", &self.next_deadline())
            .finish()
    }
}

/// Handle to a scheduled timer.
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<TimerState>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// True while the timer has neither fired nor been cancelled.
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().entries.iter().any(|e| e.id == self.id))
    }

    /// Cancel the timer. Returns whether it was still pending.
    ///
    /// Cancelling a fired or already cancelled timer is a no-op.
    pub fn cancel(&self) -> bool {
        let Some(queue) = self.queue.upgrade() else {
            return false;
        };
        let mut state = queue.borrow_mut();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != self.id);
        let cancelled = state.entries.len() != before;
        if cancelled {
            trace!("[timer] Cancelled {}", self.id);
        }
        cancelled
    }
}
