use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn sleep_ms(duration_ms: u64) {
    std::thread::sleep(std::time::Duration::from_millis(duration_ms));
}

/// Current Unix time in seconds, as recorded in frame timestamps.
pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
