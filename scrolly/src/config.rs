//! Scrollbar configuration.

use std::time::Duration;

use thiserror::Error;

use crate::gutter::GUTTER_WIDTH;

/// How long geometry must stay still before the scrolling flag clears.
pub const QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Class applied to the widget root.
pub const ROOT_CLASS: &str = "scroll-y";

/// Per-widget configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarConfig {
    /// Dark thumb variant (for light backgrounds).
    pub dark: bool,

    /// Debounce for the scrolling flag.
    pub quiet_period: Duration,

    /// Width of the gutter the native scrollbar is pushed into.
    pub gutter_width: f64,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            dark: false,
            quiet_period: QUIET_PERIOD,
            gutter_width: GUTTER_WIDTH,
        }
    }
}

impl ScrollbarConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the light or dark variant.
    pub fn dark(mut self, dark: bool) -> Self {
        self.dark = dark;
        self
    }

    /// Set the scrolling flag debounce.
    pub fn quiet_period(mut self, period: Duration) -> Self {
        self.quiet_period = period;
        self
    }

    /// Set the native scrollbar gutter width.
    pub fn gutter_width(mut self, width: f64) -> Self {
        self.gutter_width = width;
        self
    }

    /// Class list for the widget root.
    pub fn class_name(&self) -> String {
        if self.dark {
            format!("{ROOT_CLASS} dark")
        } else {
            ROOT_CLASS.to_string()
        }
    }

    /// Check the configuration before mounting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quiet_period.is_zero() {
            return Err(ConfigError::ZeroQuietPeriod);
        }
        if !self.gutter_width.is_finite() || self.gutter_width < 0.0 {
            return Err(ConfigError::InvalidGutterWidth(self.gutter_width));
        }
        Ok(())
    }
}

/// Errors that can occur when mounting a scrollbar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The scrolling flag would clear on the same frame it was set.
    #[error("quiet period must be longer than zero")]
    ZeroQuietPeriod,

    /// The gutter width is negative or not a number.
    #[error("invalid gutter width: {0}")]
    InvalidGutterWidth(f64),
}
