//! Mount-time layout that hides the native scrollbar.
//!
//! The scroll container is widened by a fixed gutter and shifted right so its
//! native scrollbar falls outside the visible area. Padding compensates for
//! the native scrollbar width so content keeps its original width.

use crate::host::ScrollContainer;

/// Default gutter width.
pub const GUTTER_WIDTH: f64 = 40.0;

/// Offsets for the scrollbar-hiding element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiderLayout {
    /// Right edge offset (negative pushes the element past the viewport).
    pub right: f64,
    /// Right padding keeping content clear of the hidden gutter.
    pub padding_right: f64,
}

impl HiderLayout {
    /// Layout for a native scrollbar of `native_width` inside a `gutter` wide gutter.
    pub fn new(native_width: f64, gutter: f64) -> Self {
        Self {
            right: -gutter,
            padding_right: (gutter - native_width.max(0.0)).max(0.0),
        }
    }
}

/// Width taken by the container's native scrollbar. Never negative.
pub fn native_scrollbar_width<C: ScrollContainer + ?Sized>(container: &C) -> f64 {
    let width = container.outer_width() - container.inner_width();
    if width.is_finite() { width.max(0.0) } else { 0.0 }
}
