use crate::error::CaptureError;
use rplidar_data::ScanFrame;

/// Outcome of a single frame poll.
#[derive(Clone, Debug, PartialEq)]
pub enum FramePoll {
    /// A complete rotation was obtained.
    Frame(ScanFrame),
    /// Nothing arrived within the timeout. Transient; the caller may retry.
    TimedOut,
    /// The source has no more frames. Terminal.
    EndOfStream,
}

/// Something that yields scan frames: a live device or a recorded file.
///
/// `next_frame` never blocks past the source's configured timeout.
pub trait SampleSource {
    fn next_frame(&mut self) -> Result<FramePoll, CaptureError>;
}
