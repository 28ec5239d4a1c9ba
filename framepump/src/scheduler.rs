//! Frame-batched observer scheduler.
//!
//! Consumers register a `(measure, react)` pair. Once per frame the scheduler
//! runs every `measure` first, then every `react` with the sample its own
//! `measure` produced. No react ever runs before the last measure of the same
//! pass, so one consumer's writes cannot invalidate another consumer's reads.
//!
//! The scheduler is an explicit service: construct one per application (or per
//! test) and hand clones of it to every widget.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use log::{debug, error, trace, warn};
use uuid::Uuid;

use crate::FrameTime;
use crate::driver::{FrameDriver, FrameRequest};
use crate::error::{PumpError, extract_panic_message};

/// Unique identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    /// Create a new unique observer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened during one pump pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// 1-based index of the pass.
    pub frame: u64,
    /// Observers whose measure completed.
    pub measured: usize,
    /// Observers whose react completed.
    pub reacted: usize,
    /// Observers unregistered after measuring and before reacting.
    pub skipped: usize,
    /// Observers whose measure or react panicked.
    pub failed: usize,
}

/// A react call bound to the sample its measure produced.
type PendingReact = Box<dyn FnOnce(FrameTime) -> ReactOutcome>;

enum ReactOutcome {
    Reacted,
    Retired,
}

/// Type-erased observer pair.
trait AnyObserver {
    /// Run the measure half and bind its sample to the react half.
    fn measure(self: Rc<Self>) -> PendingReact;

    /// Mark the observer as unregistered. Pending reacts become no-ops.
    fn retire(&self);
}

struct Observer<T, M, R> {
    measure: RefCell<M>,
    react: RefCell<R>,
    retired: Cell<bool>,
    _sample: PhantomData<fn() -> T>,
}

impl<T, M, R> AnyObserver for Observer<T, M, R>
where
    T: 'static,
    M: FnMut() -> T + 'static,
    R: FnMut(T, FrameTime) + 'static,
{
    fn measure(self: Rc<Self>) -> PendingReact {
        let sample = {
            let mut measure = self.measure.borrow_mut();
            (*measure)()
        };
        Box::new(move |time| {
            if self.retired.get() {
                return ReactOutcome::Retired;
            }
            let mut react = self.react.borrow_mut();
            (*react)(sample, time);
            ReactOutcome::Reacted
        })
    }

    fn retire(&self) {
        self.retired.set(true);
    }
}

struct Registry {
    /// Active observers in registration order.
    observers: Vec<(ObserverId, Rc<dyn AnyObserver>)>,
    /// Frame requested from the driver and not yet fired.
    pending_frame: Option<FrameRequest>,
    /// Set while a pass is running.
    pumping: bool,
    frames_pumped: u64,
}

struct Inner {
    registry: RefCell<Registry>,
    driver: Rc<dyn FrameDriver>,
    error_handler: RefCell<Option<Rc<dyn Fn(&PumpError)>>>,
}

impl Inner {
    fn remove(&self, id: ObserverId) {
        let cancel = {
            let mut registry = self.registry.borrow_mut();
            let Some(index) = registry.observers.iter().position(|(oid, _)| *oid == id) else {
                return;
            };
            let (_, observer) = registry.observers.remove(index);
            observer.retire();
            debug!(
                "[framepump] Unregistered observer {} ({} remaining)",
                id,
                registry.observers.len()
            );

            if registry.observers.is_empty() {
                registry.pending_frame.take()
            } else {
                None
            }
        };

        if let Some(request) = cancel {
            debug!("[framepump] Last observer gone, cancelling frame {:?}", request);
            self.driver.cancel_frame(request);
        }
    }

    fn request_frame(&self) {
        let request = self.driver.request_frame();
        trace!("[framepump] Requested frame {:?}", request);
        self.registry.borrow_mut().pending_frame = Some(request);
    }

    fn report(&self, err: PumpError) {
        error!("[framepump] {}", err);
        let handler = self.error_handler.borrow().clone();
        if let Some(handler) = handler {
            handler(&err);
        }
    }
}

/// Shared handle to a frame scheduler.
///
/// Cloning is cheap; every clone drives the same registry.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

impl FrameScheduler {
    /// Create a scheduler that asks `driver` for frames.
    pub fn new(driver: Rc<dyn FrameDriver>) -> Self {
        Self {
            inner: Rc::new(Inner {
                registry: RefCell::new(Registry {
                    observers: Vec::new(),
                    pending_frame: None,
                    pumping: false,
                    frames_pumped: 0,
                }),
                driver,
                error_handler: RefCell::new(None),
            }),
        }
    }

    /// Set the handler for panicking observers.
    ///
    /// Every clone shares the handler, so it may be set after the scheduler
    /// has been handed out. A later call replaces the previous handler.
    pub fn on_error<F>(self, handler: F) -> Self
    where
        F: Fn(&PumpError) + 'static,
    {
        *self.inner.error_handler.borrow_mut() = Some(Rc::new(handler));
        self
    }

    /// Register a `(measure, react)` pair.
    ///
    /// The observer joins starting with the next pass. Registering the first
    /// observer of an idle scheduler requests a frame from the driver.
    pub fn register<T, M, R>(&self, measure: M, react: R) -> Registration
    where
        T: 'static,
        M: FnMut() -> T + 'static,
        R: FnMut(T, FrameTime) + 'static,
    {
        let id = ObserverId::new();
        let observer: Rc<dyn AnyObserver> = Rc::new(Observer {
            measure: RefCell::new(measure),
            react: RefCell::new(react),
            retired: Cell::new(false),
            _sample: PhantomData,
        });

        let start = {
            let mut registry = self.inner.registry.borrow_mut();
            registry.observers.push((id, observer));
            debug!(
                "[framepump] Registered observer {} ({} active)",
                id,
                registry.observers.len()
            );
            registry.pending_frame.is_none() && !registry.pumping
        };

        if start {
            self.inner.request_frame();
        }

        Registration {
            id,
            scheduler: Rc::downgrade(&self.inner),
            active: Cell::new(true),
        }
    }

    /// Run one pass: measure everything, then react to everything.
    ///
    /// Called by the host when the requested frame fires. Requests the next
    /// frame afterwards as long as any observer remains.
    pub fn pump(&self, time: FrameTime) -> PumpReport {
        let (snapshot, frame) = {
            let mut registry = self.inner.registry.borrow_mut();
            if registry.pumping {
                warn!("[framepump] Re-entrant pump ignored");
                return PumpReport::default();
            }
            registry.pumping = true;
            registry.pending_frame = None;
            registry.frames_pumped += 1;
            (registry.observers.clone(), registry.frames_pumped)
        };

        let mut report = PumpReport {
            frame,
            ..Default::default()
        };
        trace!(
            "[framepump] Frame {} at {:?}: {} observers",
            frame,
            time,
            snapshot.len()
        );

        let mut queue: VecDeque<(ObserverId, PendingReact)> = VecDeque::with_capacity(snapshot.len());
        for (id, observer) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| observer.measure())) {
                Ok(pending) => {
                    report.measured += 1;
                    queue.push_back((id, pending));
                }
                Err(panic) => {
                    report.failed += 1;
                    self.inner.report(PumpError::MeasurePanic {
                        id,
                        message: extract_panic_message(&panic),
                    });
                }
            }
        }

        while let Some((id, pending)) = queue.pop_front() {
            match catch_unwind(AssertUnwindSafe(move || pending(time))) {
                Ok(ReactOutcome::Reacted) => report.reacted += 1,
                Ok(ReactOutcome::Retired) => report.skipped += 1,
                Err(panic) => {
                    report.failed += 1;
                    self.inner.report(PumpError::ReactPanic {
                        id,
                        message: extract_panic_message(&panic),
                    });
                }
            }
        }

        let request_next = {
            let mut registry = self.inner.registry.borrow_mut();
            registry.pumping = false;
            !registry.observers.is_empty() && registry.pending_frame.is_none()
        };
        if request_next {
            self.inner.request_frame();
        }

        report
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.registry.borrow().observers.len()
    }

    /// True when a frame has been requested and has not fired yet.
    pub fn has_pending_frame(&self) -> bool {
        self.inner.registry.borrow().pending_frame.is_some()
    }

    /// True when the scheduler holds no frame request and no observers.
    pub fn is_idle(&self) -> bool {
        let registry = self.inner.registry.borrow();
        registry.pending_frame.is_none() && registry.observers.is_empty()
    }

    /// Number of passes run so far.
    pub fn frames_pumped(&self) -> u64 {
        self.inner.registry.borrow().frames_pumped
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.registry.borrow();
        f.debug_struct("FrameScheduler")
            .field("observers", &registry.observers.len())
            .field("pending_frame", &registry.pending_frame)
            .field("frames_pumped", &registry.frames_pumped)
            .finish()
    }
}

/// Handle returned by [`FrameScheduler::register`].
///
/// Unregistering is idempotent. Dropping the handle unregisters too, so an
/// observer can never outlive its owner.
#[derive(Debug)]
pub struct Registration {
    id: ObserverId,
    scheduler: Weak<Inner>,
    active: Cell<bool>,
}

impl Registration {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Whether this registration is still in the scheduler.
    pub fn is_active(&self) -> bool {
        self.active.get() && self.scheduler.strong_count() > 0
    }

    /// Remove this observer. Calling it again does nothing.
    ///
    /// Safe to call from inside a react callback: the pass already in flight
    /// keeps its snapshot, and this observer's react is skipped if it has not
    /// run yet.
    pub fn unregister(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(inner) = self.scheduler.upgrade() {
            inner.remove(self.id);
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.unregister();
    }
}
