pub mod driver;
pub mod error;
pub mod scheduler;
pub mod ticker;
pub mod timer;

pub use driver::{FrameDriver, FrameRequest, ManualDriver};
pub use error::{PumpError, extract_panic_message};
pub use scheduler::{FrameScheduler, ObserverId, PumpReport, Registration};
pub use ticker::Ticker;
pub use timer::{TimerHandle, TimerId, TimerQueue};

/// Time of a frame, measured from the host clock's origin.
pub type FrameTime = std::time::Duration;
