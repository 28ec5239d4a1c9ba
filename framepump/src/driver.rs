//! Frame request plumbing between the scheduler and its host.
//!
//! The scheduler never waits for a display refresh itself. It asks a
//! [`FrameDriver`] for "one more frame" and the host calls
//! [`FrameScheduler::pump`](crate::FrameScheduler::pump) when that frame fires.

use std::cell::Cell;

/// Token identifying an outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Create a request token from a raw host id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw host id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Host facility that fires a requested frame once per display refresh.
pub trait FrameDriver {
    /// Ask for the scheduler to be pumped on the next refresh.
    fn request_frame(&self) -> FrameRequest;

    /// Withdraw a request that has not fired yet.
    fn cancel_frame(&self, request: FrameRequest);
}

/// A driver that only records requests.
///
/// Hosts that pump frames themselves (tests, the tokio [`Ticker`](crate::Ticker))
/// use this and consult [`ManualDriver::pending`] to see whether a frame is wanted.
#[derive(Debug, Default)]
pub struct ManualDriver {
    next_id: Cell<u64>,
    pending: Cell<Option<FrameRequest>>,
    requests: Cell<usize>,
    cancellations: Cell<usize>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending.get()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Consume the outstanding request, as a display refresh would.
    ///
    /// Returns `None` when no frame was requested; the host must not pump then.
    pub fn fire(&self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Total number of frames requested so far.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Total number of cancelled requests.
    pub fn cancellations(&self) -> usize {
        self.cancellations.get()
    }
}

impl FrameDriver for ManualDriver {
    fn request_frame(&self) -> FrameRequest {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.requests.set(self.requests.get() + 1);

        let request = FrameRequest(id);
        self.pending.set(Some(request));
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        if self.pending.get() == Some(request) {
            self.pending.set(None);
            self.cancellations.set(self.cancellations.get() + 1);
        }
    }
}
