use crate::error::CaptureError;
use rplidar_data::{filter_and_project, FilterLimits, ScanFrame};

/// Opaque drawing capability behind the live view.
pub trait Renderer {
    fn render(&mut self, frame: &ScanFrame) -> Result<(), CaptureError>;
}

/// Prints one status line per rendered frame.
///
/// Good enough for a headless terminal; a graphical renderer plugs into
/// the same trait (see the `plot_capture` example).
pub struct TextRenderer {
    limits: FilterLimits,
}

impl TextRenderer {
    pub fn new(limits: FilterLimits) -> TextRenderer {
        TextRenderer { limits }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        TextRenderer::new(FilterLimits::default())
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, frame: &ScanFrame) -> Result<(), CaptureError> {
        let points = filter_and_project(frame, &self.limits);
        let nearest = points
            .iter()
            .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

        match nearest {
            Some(point) => println!(
                "frame {:>5} | {:>4} samples, {:>4} valid | nearest {:.2} m at {:.1} deg",
                frame.seq,
                frame.len(),
                points.len(),
                point.distance_m,
                point.angle_degrees,
            ),
            None => println!(
                "frame {:>5} | {:>4} samples, none valid",
                frame.seq,
                frame.len(),
            ),
        }
        Ok(())
    }
}
