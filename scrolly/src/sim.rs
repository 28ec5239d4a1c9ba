//! In-memory host elements for headless use.
//!
//! [`SimContainer`] behaves like a scrolling element: it clamps its scroll
//! offset to the scrollable range. [`RecordingSurface`] keeps the latest
//! value of every write and counts writes, so callers can check what reached
//! the styling layer.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::geometry::{CapTransform, ThumbTransform};
use crate::gutter::HiderLayout;
use crate::host::{Flag, ScrollContainer, ScrollbarSurface};

/// A scroll container backed by plain numbers.
#[derive(Debug)]
pub struct SimContainer {
    scroll_offset: Cell<f64>,
    content_extent: Cell<f64>,
    viewport_extent: Cell<f64>,
    outer_width: f64,
    inner_width: f64,
}

impl SimContainer {
    pub fn new(content_extent: f64, viewport_extent: f64) -> Self {
        Self {
            scroll_offset: Cell::new(0.0),
            content_extent: Cell::new(content_extent),
            viewport_extent: Cell::new(viewport_extent),
            outer_width: 0.0,
            inner_width: 0.0,
        }
    }

    /// Give the container a native scrollbar: `outer - inner` wide.
    pub fn with_widths(mut self, outer: f64, inner: f64) -> Self {
        self.outer_width = outer;
        self.inner_width = inner;
        self
    }

    /// Resize the content without any event, as a reflow would.
    pub fn set_content_extent(&self, extent: f64) {
        self.content_extent.set(extent);
        self.clamp();
    }

    pub fn set_viewport_extent(&self, extent: f64) {
        self.viewport_extent.set(extent);
        self.clamp();
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll_offset(&self) -> f64 {
        (self.content_extent.get() - self.viewport_extent.get()).max(0.0)
    }

    fn clamp(&self) {
        let clamped = self.scroll_offset.get().clamp(0.0, self.max_scroll_offset());
        self.scroll_offset.set(clamped);
    }
}

impl ScrollContainer for SimContainer {
    fn scroll_offset(&self) -> f64 {
        self.scroll_offset.get()
    }

    fn scroll_extent(&self) -> f64 {
        self.content_extent.get()
    }

    fn viewport_extent(&self) -> f64 {
        self.viewport_extent.get()
    }

    fn set_scroll_offset(&self, offset: f64) {
        self.scroll_offset.set(offset);
        self.clamp();
    }

    fn outer_width(&self) -> f64 {
        self.outer_width
    }

    fn inner_width(&self) -> f64 {
        self.inner_width
    }
}

/// A surface that remembers what was written to it.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    thumb: Cell<Option<ThumbTransform>>,
    caps: Cell<Option<CapTransform>>,
    flags: RefCell<HashSet<Flag>>,
    class: RefCell<String>,
    hider: Cell<Option<HiderLayout>>,
    thumb_writes: Cell<usize>,
    cap_writes: Cell<usize>,
    flag_writes: Cell<usize>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thumb(&self) -> Option<ThumbTransform> {
        self.thumb.get()
    }

    pub fn caps(&self) -> Option<CapTransform> {
        self.caps.get()
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.flags.borrow().contains(&flag)
    }

    pub fn class(&self) -> String {
        self.class.borrow().clone()
    }

    pub fn hider(&self) -> Option<HiderLayout> {
        self.hider.get()
    }

    pub fn thumb_writes(&self) -> usize {
        self.thumb_writes.get()
    }

    pub fn cap_writes(&self) -> usize {
        self.cap_writes.get()
    }

    pub fn flag_writes(&self) -> usize {
        self.flag_writes.get()
    }

    /// Data attributes currently set, in a stable order.
    pub fn attributes(&self) -> Vec<&'static str> {
        let flags = self.flags.borrow();
        Flag::ALL
            .iter()
            .filter(|f| flags.contains(*f))
            .map(Flag::attribute)
            .collect()
    }
}

impl ScrollbarSurface for RecordingSurface {
    fn set_thumb_transform(&self, transform: ThumbTransform) {
        self.thumb.set(Some(transform));
        self.thumb_writes.set(self.thumb_writes.get() + 1);
    }

    fn set_cap_transform(&self, transform: CapTransform) {
        self.caps.set(Some(transform));
        self.cap_writes.set(self.cap_writes.get() + 1);
    }

    fn set_flag(&self, flag: Flag, on: bool) {
        let mut flags = self.flags.borrow_mut();
        if on {
            flags.insert(flag);
        } else {
            flags.remove(&flag);
        }
        self.flag_writes.set(self.flag_writes.get() + 1);
    }

    fn set_class(&self, class: &str) {
        *self.class.borrow_mut() = class.to_string();
    }

    fn set_hider_layout(&self, layout: HiderLayout) {
        self.hider.set(Some(layout));
    }
}
