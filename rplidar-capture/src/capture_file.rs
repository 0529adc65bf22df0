//! On-disk capture format: one sample per row, grouped by frame.
//!
//! ```text
//! frame_seq,angle_degrees,distance_mm,quality,timestamp
//! ```
//!
//! The header row is always written but is optional on replay. A capture
//! is exclusively owned by the session writing it and read-only afterwards.

use crate::error::CaptureError;
use rplidar_data::{Sample, ScanFrame};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

pub(crate) const CAPTURE_HEADER: [&str; 5] = [
    "frame_seq",
    "angle_degrees",
    "distance_mm",
    "quality",
    "timestamp",
];

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CaptureRow {
    pub frame_seq: u64,
    pub angle_degrees: f64,
    pub distance_mm: f64,
    pub quality: u8,
    pub timestamp: f64,
}

/// Append-only writer for a capture file.
///
/// Each frame is flushed to disk before the next one is requested, so an
/// interrupted session leaves a valid, truncated, replayable file.
pub struct CaptureWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: u64,
}

impl CaptureWriter {
    /// Creates the file and writes the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<CaptureWriter, CaptureError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(CAPTURE_HEADER)?;
        Ok(CaptureWriter {
            path,
            writer,
            rows_written: 0,
        })
    }

    /// Appends every sample of the frame and flushes.
    pub fn append_frame(&mut self, frame: &ScanFrame) -> Result<(), CaptureError> {
        for sample in &frame.samples {
            self.writer.serialize(CaptureRow {
                frame_seq: frame.seq,
                angle_degrees: sample.angle_degrees,
                distance_mm: sample.distance_mm,
                quality: sample.quality,
                timestamp: frame.timestamp,
            })?;
        }
        self.writer.flush()?;
        self.rows_written += frame.samples.len() as u64;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final durable flush.
    pub fn finish(&mut self) -> Result<(), CaptureError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Reads a whole capture into frames, in file order.
///
/// Rows with the same consecutive `frame_seq` form one frame; the frame
/// timestamp is taken from its first row. A leading header row is skipped
/// when present.
pub fn read_capture(path: impl AsRef<Path>) -> Result<Vec<ScanFrame>, CaptureError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CaptureError::NotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut frames: Vec<ScanFrame> = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row_number = (index + 1) as u64;
        if index == 0 && record.get(0) == Some(CAPTURE_HEADER[0]) {
            continue;
        }
        let row: CaptureRow = record
            .deserialize(None)
            .map_err(|e| CaptureError::Format(row_number, e.to_string()))?;

        let start_new_frame = match frames.last() {
            Some(frame) => frame.seq != row.frame_seq,
            None => true,
        };
        if start_new_frame {
            frames.push(ScanFrame::new(row.frame_seq, row.timestamp));
        }
        if let Some(frame) = frames.last_mut() {
            frame
                .samples
                .push(Sample::new(row.angle_degrees, row.distance_mm, row.quality));
        }
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_frames() -> Vec<ScanFrame> {
        let mut first = ScanFrame::new(0, 100.5);
        first.samples.push(Sample::new(0.0, 1200.0, 47));
        first.samples.push(Sample::new(0.5, 0.0, 0));
        let mut second = ScanFrame::new(1, 100.7);
        second.samples.push(Sample::new(0.25, 1190.0, 46));
        vec![first, second]
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.csv");

        let mut writer = CaptureWriter::create(&path).unwrap();
        for frame in sample_frames() {
            writer.append_frame(&frame).unwrap();
        }
        writer.finish().unwrap();
        assert_eq!(writer.rows_written(), 3);

        let frames = read_capture(&path).unwrap();
        assert_eq!(frames, sample_frames());
    }

    #[test]
    fn test_read_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("headerless.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "0,10.5,1500.0,47,99.25").unwrap();
        writeln!(file, "0,11.0,0.0,0,99.25").unwrap();
        writeln!(file, "1,10.75,1498.0,47,99.45").unwrap();
        drop(file);

        let frames = read_capture(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 2);
        assert_eq!(frames[0].timestamp, 99.25);
        assert!(frames[0].samples[1].is_no_return());
        assert_eq!(frames[1].seq, 1);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_capture("/nonexistent/scan.csv"),
            Err(CaptureError::NotFound(_))
        ));
    }

    #[test]
    fn test_read_malformed_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "frame_seq,angle_degrees,distance_mm,quality,timestamp").unwrap();
        writeln!(file, "0,not-an-angle,1500.0,47,99.25").unwrap();
        drop(file);

        assert!(matches!(
            read_capture(&path),
            Err(CaptureError::Format(2, _))
        ));
    }

    #[test]
    fn test_reopening_yields_identical_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.csv");
        let mut writer = CaptureWriter::create(&path).unwrap();
        for frame in sample_frames() {
            writer.append_frame(&frame).unwrap();
        }
        writer.finish().unwrap();

        assert_eq!(read_capture(&path).unwrap(), read_capture(&path).unwrap());
    }
}
