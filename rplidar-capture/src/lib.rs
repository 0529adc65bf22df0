//! Capture and replay pipeline for RPLidar A1 scans.
//!
//! Frames flow from a [`SampleSource`] (a live serial device or a
//! recorded capture file) into a [`Sink`] (a live view or a recorder),
//! driven by a [`Session`] that owns the run's lifecycle.

pub mod capture_file;
pub mod config;
pub mod error;
pub mod live;
pub mod render;
pub mod replay;
pub mod report;
pub mod session;
pub mod sink;
pub mod source;

mod driver;
mod packet;
mod serial;
mod time;

pub use crate::config::CaptureConfig;
pub use crate::error::CaptureError;
pub use crate::live::LiveDevice;
pub use crate::replay::FileReplay;
pub use crate::session::{Session, SessionState, SessionSummary, StopHandle};
pub use crate::sink::{LiveView, Recorder, Sink};
pub use crate::source::{FramePoll, SampleSource};

use crate::report::ReportFiles;
use rplidar_data::FilterLimits;
use std::path::{Path, PathBuf};

/// Name of the re-recorded capture produced by [`record_from_csv`].
pub const CAPTURE_OUTPUT_FILE: &str = "capture.csv";

/// Outputs of a CSV-to-CSV recording run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRecordOutput {
    pub capture: PathBuf,
    pub report: ReportFiles,
    pub summary: SessionSummary,
}

/// Replays `csv_path` and re-records it into `out_dir`, alongside the
/// filtered point cloud and the markdown report.
///
/// The re-recorded capture is unfiltered, so replaying a recorder-written
/// file and re-recording it reproduces the file.
pub fn record_from_csv(
    csv_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
) -> Result<CsvRecordOutput, CaptureError> {
    let csv_path = csv_path.as_ref();
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let frames = capture_file::read_capture(csv_path)?;
    let limits = FilterLimits::default();

    let mut source = FileReplay::open(csv_path)?;
    let capture = out_dir.join(CAPTURE_OUTPUT_FILE);
    let mut recorder = Recorder::create(&capture)?;
    let mut session = Session::new(None, config::DEFAULT_RETRY_BUDGET);
    let summary = session.run(&mut source, &mut recorder)?;

    let report = report::write_report(out_dir, &csv_path.display().to_string(), &frames, &limits)?;
    Ok(CsvRecordOutput {
        capture,
        report,
        summary,
    })
}
