//! Overlay scrollbar control logic on top of `framepump`.
//!
//! A mounted [`ScrollbarController`] registers one observer pair with a shared
//! [`framepump::FrameScheduler`]: measure pulls the container's geometry, react
//! positions the thumb and sets the `scrolling`/`hidden` flags. Pointer
//! handlers drive the drag state machine between frames.

pub mod activity;
pub mod config;
pub mod controller;
pub mod drag;
pub mod geometry;
pub mod gutter;
pub mod host;
pub mod sim;

pub use config::{ConfigError, ScrollbarConfig};
pub use controller::ScrollbarController;
pub use drag::{DragState, EventResult};
pub use geometry::{CapTransform, Sample, ThumbGeometry, ThumbTransform};
pub use gutter::HiderLayout;
pub use host::{Flag, ScrollContainer, ScrollbarSurface};
