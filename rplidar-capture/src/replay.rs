use crate::capture_file::read_capture;
use crate::error::CaptureError;
use crate::source::{FramePoll, SampleSource};
use rplidar_data::ScanFrame;
use std::path::Path;
use std::time::Duration;

/// Fallback inter-frame pause when the recording carries no usable
/// timing, roughly the A1 rotation period.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(180);
/// Recorded gaps above this are capped so a replay never stalls.
const MAX_FRAME_INTERVAL: Duration = Duration::from_secs(1);

/// Replays a previously recorded capture file.
///
/// The whole file is validated at open, so format problems surface
/// before the session starts streaming. A single handle is forward-only;
/// reopening the same path restarts the identical sequence.
pub struct FileReplay {
    frames: std::vec::IntoIter<ScanFrame>,
    animate: bool,
    frame_interval: Duration,
    previous_timestamp: Option<f64>,
}

impl FileReplay {
    /// Opens a capture for replay at full speed.
    pub fn open(path: impl AsRef<Path>) -> Result<FileReplay, CaptureError> {
        let frames = read_capture(path)?;
        Ok(FileReplay {
            frames: frames.into_iter(),
            animate: false,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            previous_timestamp: None,
        })
    }

    /// Enables animate mode: frames are yielded at the recorded
    /// inter-frame interval (capped at one second), emulating live timing.
    pub fn animate(mut self) -> FileReplay {
        self.animate = true;
        self
    }

    /// Overrides the pause used when the recording has no usable timing.
    pub fn with_frame_interval(mut self, interval: Duration) -> FileReplay {
        self.frame_interval = interval;
        self
    }

    fn pacing_delay(&mut self, timestamp: f64) -> Duration {
        let delay = match self.previous_timestamp {
            Some(previous) if timestamp > previous => {
                Duration::from_secs_f64(timestamp - previous).min(MAX_FRAME_INTERVAL)
            }
            Some(_) => self.frame_interval,
            None => Duration::ZERO, // first frame comes out immediately
        };
        self.previous_timestamp = Some(timestamp);
        delay
    }
}

impl SampleSource for FileReplay {
    fn next_frame(&mut self) -> Result<FramePoll, CaptureError> {
        match self.frames.next() {
            Some(frame) => {
                if self.animate {
                    let delay = self.pacing_delay(frame.timestamp);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                Ok(FramePoll::Frame(frame))
            }
            None => Ok(FramePoll::EndOfStream),
        }
    }
}
