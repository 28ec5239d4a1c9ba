//! Scroll geometry: raw samples and the thumb placement derived from them.

use crate::host::ScrollContainer;

/// Raw measurements along the scroll axis, taken in a measure phase.
///
/// Compared bit for bit: any difference, however small, counts as movement,
/// and a reading that stays NaN compares equal to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sample {
    /// Current scroll offset.
    pub scroll_offset: f64,
    /// Total scrollable extent of the content.
    pub content_extent: f64,
    /// Visible extent of the viewport.
    pub viewport_extent: f64,
}

impl Sample {
    pub fn new(scroll_offset: f64, content_extent: f64, viewport_extent: f64) -> Self {
        Self {
            scroll_offset,
            content_extent,
            viewport_extent,
        }
    }

    /// Read the three measurements from a live container.
    pub fn read<C: ScrollContainer + ?Sized>(container: &C) -> Self {
        Self {
            scroll_offset: container.scroll_offset(),
            content_extent: container.scroll_extent(),
            viewport_extent: container.viewport_extent(),
        }
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.scroll_offset.to_bits() == other.scroll_offset.to_bits()
            && self.content_extent.to_bits() == other.content_extent.to_bits()
            && self.viewport_extent.to_bits() == other.viewport_extent.to_bits()
    }
}

impl Eq for Sample {}

/// Thumb placement derived from a [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbGeometry {
    /// Thumb position along the track, as a percentage of the thumb's own length.
    pub offset_percent: f64,
    /// Ratio of visible to total extent. `>= 1` means nothing overflows.
    pub scale: f64,
}

impl ThumbGeometry {
    /// Derive the thumb placement, or `None` for degenerate geometry.
    ///
    /// Degenerate means a non-positive content or viewport extent, or any
    /// non-finite measurement. Callers treat it as "hidden, leave the thumb alone".
    pub fn from_sample(sample: &Sample) -> Option<Self> {
        let Sample {
            scroll_offset,
            content_extent,
            viewport_extent,
        } = *sample;

        if !scroll_offset.is_finite() || !content_extent.is_finite() || !viewport_extent.is_finite() {
            return None;
        }
        if content_extent <= 0.0 || viewport_extent <= 0.0 {
            return None;
        }

        Some(Self {
            offset_percent: 100.0 * scroll_offset / content_extent,
            scale: viewport_extent / content_extent,
        })
    }

    /// True when the content is taller than the viewport.
    pub fn is_overflowing(&self) -> bool {
        self.scale < 1.0
    }

    pub fn thumb_transform(&self) -> ThumbTransform {
        ThumbTransform {
            translate_percent: self.offset_percent,
            scale: self.scale,
        }
    }

    /// Counter-scale for the thumb's end caps so rounded corners keep their shape.
    pub fn cap_transform(&self) -> CapTransform {
        CapTransform {
            scale: 1.0 / self.scale,
        }
    }
}

/// Transform applied to the thumb element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbTransform {
    pub translate_percent: f64,
    pub scale: f64,
}

impl std::fmt::Display for ThumbTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "translateY({}%) scaleY({})",
            self.translate_percent, self.scale
        )
    }
}

/// Transform applied to each end cap inside the thumb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapTransform {
    pub scale: f64,
}

impl std::fmt::Display for CapTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scaleY({})", self.scale)
    }
}
