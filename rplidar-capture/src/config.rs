use std::time::Duration;

/// RPLidar A1 UART speed.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// How long a single `next_frame` poll may block. The A1 rotates at
/// roughly 5.5 Hz, so a full second without a frame already means trouble.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_millis(1000);
/// Consecutive timed-out polls tolerated before the session fails.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Explicit connection settings for a live device session.
///
/// Always constructed from CLI arguments and passed in; there is no
/// process-wide default port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Serial port name, e.g. `/dev/ttyUSB0` or `COM5`.
    pub port: String,
    pub baud_rate: u32,
    /// Upper bound on a single frame poll.
    pub frame_timeout: Duration,
    /// Consecutive timeouts tolerated before giving up.
    pub retry_budget: u32,
}

impl CaptureConfig {
    pub fn new(port: impl Into<String>) -> Self {
        CaptureConfig {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}
