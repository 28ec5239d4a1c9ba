//! The scrollbar controller: one observer pair per mounted widget.
//!
//! Measure reads the container's geometry. React derives the thumb placement,
//! updates the presentation flags and restarts the scrolling debounce.
//! Pointer handlers run between frames and only touch the drag state and the
//! container's scroll offset.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use framepump::{FrameScheduler, FrameTime, ObserverId, Registration, TimerQueue};
use log::{debug, trace};

use crate::activity::ActivityTracker;
use crate::config::{ConfigError, ScrollbarConfig};
use crate::drag::{DragState, EventResult};
use crate::geometry::{Sample, ThumbGeometry};
use crate::gutter::{self, HiderLayout};
use crate::host::{Flag, ScrollContainer, ScrollbarSurface};

/// Per-widget state shared by the react callback, the debounce timer and
/// the pointer handlers.
#[derive(Debug)]
struct ControllerState {
    drag: DragState,
    /// Scale from the latest valid geometry. Read by the drag handler.
    scale: f64,
    /// Geometry last written to the surface.
    applied: Option<ThumbGeometry>,
    scrolling: bool,
    hidden: Option<bool>,
    activity: ActivityTracker,
}

impl ControllerState {
    fn new(config: &ScrollbarConfig) -> Self {
        Self {
            drag: DragState::Idle,
            scale: 1.0,
            applied: None,
            scrolling: false,
            hidden: None,
            activity: ActivityTracker::new(config.quiet_period),
        }
    }

    fn set_hidden(&mut self, surface: &dyn ScrollbarSurface, hidden: bool) {
        if self.hidden != Some(hidden) {
            self.hidden = Some(hidden);
            surface.set_flag(Flag::Hidden, hidden);
        }
    }
}

/// Controller for one mounted scrollbar.
///
/// Unmounts on drop.
pub struct ScrollbarController {
    state: Rc<RefCell<ControllerState>>,
    container: Rc<dyn ScrollContainer>,
    surface: Rc<dyn ScrollbarSurface>,
    registration: Registration,
    mounted: Cell<bool>,
}

impl ScrollbarController {
    /// Mount a scrollbar over `container`, writing to `surface`.
    ///
    /// Applies the root class and the native scrollbar hider layout once,
    /// then registers with `scheduler`. The first frame after mounting
    /// measures the container's real geometry.
    pub fn mount(
        scheduler: &FrameScheduler,
        timers: &TimerQueue,
        container: Rc<dyn ScrollContainer>,
        surface: Rc<dyn ScrollbarSurface>,
        config: ScrollbarConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        surface.set_class(&config.class_name());
        let native_width = gutter::native_scrollbar_width(&*container);
        surface.set_hider_layout(HiderLayout::new(native_width, config.gutter_width));

        let state = Rc::new(RefCell::new(ControllerState::new(&config)));

        let measure = {
            let container = container.clone();
            move || Sample::read(&*container)
        };
        let react = {
            let state = state.clone();
            let surface = surface.clone();
            let timers = timers.clone();
            move |sample: Sample, now: FrameTime| apply_sample(&state, &surface, &timers, sample, now)
        };
        let registration = scheduler.register(measure, react);

        debug!(
            "[scrolly] Mounted scrollbar {} (native scrollbar {}px, dark={})",
            registration.id(),
            native_width,
            config.dark
        );

        Ok(Self {
            state,
            container,
            surface,
            registration,
            mounted: Cell::new(true),
        })
    }

    /// The scheduler registration id of this widget.
    pub fn id(&self) -> ObserverId {
        self.registration.id()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Pointer pressed on the thumb.
    ///
    /// Anchors the drag to the live scroll offset, not the last sample.
    pub fn pointer_down(&self, pointer_y: f64) -> EventResult {
        if !self.is_mounted() {
            return EventResult::Ignored;
        }

        let scroll_offset = self.container.scroll_offset();
        self.state.borrow_mut().drag = DragState::grab(pointer_y, scroll_offset);
        self.surface.set_flag(Flag::Moving, true);
        debug!(
            "[scrolly] Drag start at y={} (scroll offset {})",
            pointer_y, scroll_offset
        );
        EventResult::StartDrag
    }

    /// Pointer moved anywhere.
    pub fn pointer_move(&self, pointer_y: f64) -> EventResult {
        let target = {
            let state = self.state.borrow();
            state.drag.target_offset(pointer_y, state.scale)
        };
        match target {
            Some(offset) => {
                trace!("[scrolly] Drag to y={} -> scroll offset {}", pointer_y, offset);
                self.container.set_scroll_offset(offset);
                EventResult::Consumed
            }
            None => EventResult::Ignored,
        }
    }

    /// Pointer released anywhere.
    pub fn pointer_up(&self) -> EventResult {
        {
            let mut state = self.state.borrow_mut();
            if !state.drag.is_dragging() {
                return EventResult::Ignored;
            }
            state.drag = DragState::Idle;
        }
        self.surface.set_flag(Flag::Moving, false);
        debug!("[scrolly] Drag end");
        EventResult::Consumed
    }

    /// Stop observing. Idempotent.
    ///
    /// Cancels the scrolling debounce and drops any drag in progress.
    pub fn unmount(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        self.registration.unregister();

        let mut state = self.state.borrow_mut();
        state.activity.cancel();
        state.drag = DragState::Idle;
        debug!("[scrolly] Unmounted scrollbar {}", self.registration.id());
    }

    pub fn drag_state(&self) -> DragState {
        self.state.borrow().drag
    }

    /// Scale used by the drag handler (1 until the first valid frame).
    pub fn scale(&self) -> f64 {
        self.state.borrow().scale
    }

    pub fn is_scrolling(&self) -> bool {
        self.state.borrow().scrolling
    }

    /// Hidden state as last written; `None` before the first frame.
    pub fn is_hidden(&self) -> Option<bool> {
        self.state.borrow().hidden
    }

    pub fn is_moving(&self) -> bool {
        self.state.borrow().drag.is_dragging()
    }
}

impl Drop for ScrollbarController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ScrollbarController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollbarController")
            .field("id", &self.registration.id())
            .field("mounted", &self.mounted.get())
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// React half of the observer pair.
fn apply_sample(
    shared: &Rc<RefCell<ControllerState>>,
    surface: &Rc<dyn ScrollbarSurface>,
    timers: &TimerQueue,
    sample: Sample,
    now: FrameTime,
) {
    let mut state = shared.borrow_mut();

    if state.activity.observe(sample) {
        trace!("[scrolly] Geometry changed: {:?}", sample);
        let on_quiet = {
            let shared = Rc::downgrade(shared);
            let surface = surface.clone();
            move || {
                if let Some(shared) = shared.upgrade() {
                    shared.borrow_mut().scrolling = false;
                }
                surface.set_flag(Flag::Scrolling, false);
            }
        };
        state.activity.restart(timers, now, on_quiet);

        if !state.scrolling {
            state.scrolling = true;
            surface.set_flag(Flag::Scrolling, true);
        }
    }

    let Some(geometry) = ThumbGeometry::from_sample(&sample) else {
        state.applied = None;
        state.set_hidden(surface.as_ref(), true);
        return;
    };

    let previous = state.applied;
    if previous != Some(geometry) {
        surface.set_thumb_transform(geometry.thumb_transform());
    }
    if previous.map(|p| p.scale) != Some(geometry.scale) {
        surface.set_cap_transform(geometry.cap_transform());
    }
    state.set_hidden(surface.as_ref(), !geometry.is_overflowing());

    state.scale = geometry.scale;
    state.applied = Some(geometry);
}
