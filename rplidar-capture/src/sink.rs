use crate::capture_file::CaptureWriter;
use crate::error::CaptureError;
use crate::render::Renderer;
use rplidar_data::ScanFrame;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Consumes the frames a session pulls from its source.
pub trait Sink {
    fn accept(&mut self, frame: &ScanFrame) -> Result<(), CaptureError>;
    /// Final flush. A frame accepted earlier must be durable once this
    /// returns `Ok`.
    fn finish(&mut self) -> Result<(), CaptureError>;
}

/// Persists frames to a capture file, flushing after every frame.
pub struct Recorder {
    writer: CaptureWriter,
    /// Keep 1 of every N samples. 1 = keep everything.
    decimation: u64,
    raw_samples_seen: u64,
}

impl Recorder {
    pub fn create(path: impl AsRef<Path>) -> Result<Recorder, CaptureError> {
        Recorder::with_decimation(path, 1)
    }

    /// `decimation` must be >= 1.
    pub fn with_decimation(path: impl AsRef<Path>, decimation: u64) -> Result<Recorder, CaptureError> {
        assert!(decimation >= 1, "decimation factor must be >= 1");
        Ok(Recorder {
            writer: CaptureWriter::create(path)?,
            decimation,
            raw_samples_seen: 0,
        })
    }

    pub fn rows_written(&self) -> u64 {
        self.writer.rows_written()
    }

    fn decimate(&mut self, frame: &ScanFrame) -> ScanFrame {
        let mut kept = ScanFrame::new(frame.seq, frame.timestamp);
        for sample in &frame.samples {
            self.raw_samples_seen += 1;
            if self.raw_samples_seen % self.decimation == 0 {
                kept.samples.push(*sample);
            }
        }
        kept
    }
}

impl Sink for Recorder {
    fn accept(&mut self, frame: &ScanFrame) -> Result<(), CaptureError> {
        if self.decimation == 1 {
            self.writer.append_frame(frame)
        } else {
            let kept = self.decimate(frame);
            self.writer.append_frame(&kept)
        }
    }

    fn finish(&mut self) -> Result<(), CaptureError> {
        self.writer.finish()?;
        info!(
            "capture written: {} ({} rows)",
            self.writer.path().display(),
            self.writer.rows_written()
        );
        Ok(())
    }
}

/// Renders frames without persisting them.
///
/// Keep-latest drop policy: when frames arrive faster than the minimum
/// redraw interval, the pending unrendered frame is replaced instead of
/// blocking the source.
pub struct LiveView {
    renderer: Box<dyn Renderer>,
    min_redraw: Duration,
    last_draw: Option<Instant>,
    pending: Option<ScanFrame>,
    dropped: u64,
}

impl LiveView {
    pub fn new(renderer: Box<dyn Renderer>) -> LiveView {
        LiveView::with_min_redraw(renderer, Duration::from_millis(50))
    }

    pub fn with_min_redraw(renderer: Box<dyn Renderer>, min_redraw: Duration) -> LiveView {
        LiveView {
            renderer,
            min_redraw,
            last_draw: None,
            pending: None,
            dropped: 0,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn due(&self) -> bool {
        match self.last_draw {
            Some(at) => at.elapsed() >= self.min_redraw,
            None => true,
        }
    }
}

impl Sink for LiveView {
    fn accept(&mut self, frame: &ScanFrame) -> Result<(), CaptureError> {
        if self.pending.replace(frame.clone()).is_some() {
            self.dropped += 1;
        }
        if self.due() {
            if let Some(frame) = self.pending.take() {
                self.renderer.render(&frame)?;
                self.last_draw = Some(Instant::now());
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CaptureError> {
        if let Some(frame) = self.pending.take() {
            self.renderer.render(&frame)?;
        }
        if self.dropped > 0 {
            debug!("{} frames arrived too fast to draw", self.dropped);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_file::read_capture;
    use rplidar_data::Sample;

    fn frame_with(seq: u64, n: usize) -> ScanFrame {
        let mut frame = ScanFrame::new(seq, 50.0 + seq as f64);
        for i in 0..n {
            frame
                .samples
                .push(Sample::new(i as f64, 1000.0 + i as f64, 47));
        }
        frame
    }

    #[test]
    fn test_recorder_persists_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.csv");

        let mut recorder = Recorder::create(&path).unwrap();
        recorder.accept(&frame_with(0, 5)).unwrap();
        recorder.accept(&frame_with(1, 4)).unwrap();
        recorder.finish().unwrap();
        assert_eq!(recorder.rows_written(), 9);

        let frames = read_capture(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frame_with(0, 5));
    }

    #[test]
    fn test_recorder_decimation_counts_across_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decimated.csv");

        // 5 + 5 raw samples, keep every 3rd: samples 3, 6, 9
        let mut recorder = Recorder::with_decimation(&path, 3).unwrap();
        recorder.accept(&frame_with(0, 5)).unwrap();
        recorder.accept(&frame_with(1, 5)).unwrap();
        recorder.finish().unwrap();
        assert_eq!(recorder.rows_written(), 3);

        let frames = read_capture(&path).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 1);
        assert_eq!(frames[1].len(), 2);
    }

    struct CountingRenderer {
        log: std::rc::Rc<std::cell::RefCell<Vec<u64>>>,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, frame: &ScanFrame) -> Result<(), CaptureError> {
            self.log.borrow_mut().push(frame.seq);
            Ok(())
        }
    }

    #[test]
    fn test_live_view_keeps_latest_frame() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        // redraw interval so long that only the first frame is drawn eagerly
        let mut view = LiveView::with_min_redraw(
            Box::new(CountingRenderer { log: log.clone() }),
            Duration::from_secs(3600),
        );

        for seq in 0..5 {
            view.accept(&frame_with(seq, 1)).unwrap();
        }
        view.finish().unwrap();

        // first frame drawn immediately, latest pending one on finish,
        // the ones in between replaced
        assert_eq!(*log.borrow(), vec![0, 4]);
        assert_eq!(view.dropped(), 3);
    }

    #[test]
    fn test_live_view_draws_everything_when_fast_enough() {
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut view = LiveView::with_min_redraw(
            Box::new(CountingRenderer { log: log.clone() }),
            Duration::ZERO,
        );
        for seq in 0..3 {
            view.accept(&frame_with(seq, 1)).unwrap();
        }
        view.finish().unwrap();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(view.dropped(), 0);
    }
}
