//! Boundary traits between the controller and the host's elements.
//!
//! Both traits take `&self`, like element handles: implementations use
//! interior mutability for whatever they write.

use crate::geometry::{CapTransform, ThumbTransform};
use crate::gutter::HiderLayout;

/// The externally owned scrolling element.
pub trait ScrollContainer {
    // -------------------------------------------------------------------------
    // Per-frame measurements
    // -------------------------------------------------------------------------

    /// Current scroll offset.
    fn scroll_offset(&self) -> f64;

    /// Total scrollable extent of the content.
    fn scroll_extent(&self) -> f64;

    /// Visible extent of the viewport.
    fn viewport_extent(&self) -> f64;

    /// Write a new scroll offset. The container may clamp it.
    fn set_scroll_offset(&self, offset: f64);

    // -------------------------------------------------------------------------
    // Mount-time measurements
    // -------------------------------------------------------------------------

    /// Horizontal extent including the native scrollbar.
    fn outer_width(&self) -> f64;

    /// Horizontal extent excluding the native scrollbar.
    fn inner_width(&self) -> f64;
}

/// Presentation flags exposed to the styling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Geometry changed within the quiet period.
    Scrolling,
    /// No scrollable overflow.
    Hidden,
    /// The thumb is being dragged.
    Moving,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Scrolling, Flag::Hidden, Flag::Moving];

    /// Data attribute the styling layer keys off.
    pub fn attribute(&self) -> &'static str {
        match self {
            Flag::Scrolling => "data-scrolling",
            Flag::Hidden => "data-hidden",
            Flag::Moving => "data-moving",
        }
    }
}

/// The elements the controller writes to.
pub trait ScrollbarSurface {
    /// Position and size the thumb.
    fn set_thumb_transform(&self, transform: ThumbTransform);

    /// Counter-scale the thumb's end caps.
    fn set_cap_transform(&self, transform: CapTransform);

    /// Set or clear a presentation flag on the root element.
    fn set_flag(&self, flag: Flag, on: bool);

    /// Set the root element's class list.
    fn set_class(&self, class: &str);

    /// Lay out the element that pushes the native scrollbar out of view.
    fn set_hider_layout(&self, layout: HiderLayout);
}
