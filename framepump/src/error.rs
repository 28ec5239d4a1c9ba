//! Error types for isolated observer and timer failures.

use std::any::Any;

use thiserror::Error;

use crate::scheduler::ObserverId;
use crate::timer::TimerId;

/// A callback driven by the pump panicked.
///
/// The pump catches the panic, logs it, hands it to the scheduler's error
/// handler (if any) and carries on with the remaining observers.
#[derive(Debug, Clone, Error)]
pub enum PumpError {
    /// An observer's measure callback panicked. Its react is skipped for the pass.
    #[error("observer {id} panicked while measuring: {message}")]
    MeasurePanic {
        /// The failing observer.
        id: ObserverId,
        /// Panic message extracted from the panic payload.
        message: String,
    },

    /// An observer's react callback panicked.
    #[error("observer {id} panicked while reacting: {message}")]
    ReactPanic {
        /// The failing observer.
        id: ObserverId,
        /// Panic message extracted from the panic payload.
        message: String,
    },

    /// A scheduled timer callback panicked.
    #[error("timer {id} callback panicked: {message}")]
    TimerPanic {
        /// The failing timer.
        id: TimerId,
        /// Panic message extracted from the panic payload.
        message: String,
    },
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can carry either `&str` or `String` payloads. Anything else
/// falls back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
