//! Drag-to-scroll state machine.
//!
//! Pointer events arrive outside the frame pump. A drag only ever writes the
//! container's scroll offset; the next measure pass picks that up and moves
//! the thumb.

/// Thumb drag state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// Thumb is held. Anchors are captured at pointer-down.
    Dragging {
        /// Pointer position when the thumb was grabbed.
        anchor_pointer_y: f64,
        /// Live scroll offset when the thumb was grabbed.
        anchor_scroll_offset: f64,
    },
}

impl DragState {
    /// Start a drag from the given pointer position and scroll offset.
    pub fn grab(pointer_y: f64, scroll_offset: f64) -> Self {
        DragState::Dragging {
            anchor_pointer_y: pointer_y,
            anchor_scroll_offset: scroll_offset,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Scroll offset for the pointer at `pointer_y`, given the current thumb scale.
    ///
    /// Pointer travel is divided by `scale`: a short thumb moves the content
    /// further per pixel. Returns `None` when idle or when `scale` is not a
    /// positive finite number.
    pub fn target_offset(&self, pointer_y: f64, scale: f64) -> Option<f64> {
        let DragState::Dragging {
            anchor_pointer_y,
            anchor_scroll_offset,
        } = *self
        else {
            return None;
        };
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        let target = anchor_scroll_offset + (pointer_y - anchor_pointer_y) / scale;
        target.is_finite().then_some(target)
    }
}

/// Result of handling a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
    /// Event started a drag. The host should suppress the default action so
    /// surrounding overlays don't treat it as an outside click.
    StartDrag,
}

impl EventResult {
    /// Check if the event was handled (consumed or started drag).
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }

    /// Whether the host must prevent the event's default behavior.
    pub fn prevents_default(&self) -> bool {
        matches!(self, EventResult::StartDrag)
    }
}
