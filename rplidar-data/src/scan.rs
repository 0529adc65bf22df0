#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single LIDAR measurement.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Scan angle in degrees, in `[0, 360)`.
    pub angle_degrees: f64,
    /// Distance to an object in millimeters. Zero means "no return" and
    /// must be carried through the pipeline, not dropped.
    pub distance_mm: f64,
    /// Return strength of the laser pulse.
    pub quality: u8,
}

impl Sample {
    pub fn new(angle_degrees: f64, distance_mm: f64, quality: u8) -> Self {
        Sample {
            angle_degrees,
            distance_mm,
            quality,
        }
    }

    /// True when the sensor reported no return for this direction.
    pub fn is_no_return(&self) -> bool {
        self.distance_mm == 0.0
    }
}

/// One full rotation's worth of samples.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanFrame {
    /// Monotonically increasing frame number, unique within a session.
    pub seq: u64,
    /// Unix timestamp (seconds) at which the frame was completed.
    pub timestamp: f64,
    /// Samples of the rotation. Not necessarily sorted by angle.
    pub samples: Vec<Sample>,
}

impl ScanFrame {
    pub fn new(seq: u64, timestamp: f64) -> Self {
        ScanFrame {
            seq,
            timestamp,
            samples: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_return_sample() {
        assert!(Sample::new(12.5, 0.0, 47).is_no_return());
        assert!(!Sample::new(12.5, 350.0, 47).is_no_return());
    }

    #[test]
    fn test_frame_len() {
        let mut frame = ScanFrame::new(3, 1700000000.0);
        assert!(frame.is_empty());
        frame.samples.push(Sample::new(0.0, 1200.0, 30));
        frame.samples.push(Sample::new(0.5, 1180.0, 31));
        assert_eq!(frame.len(), 2);
    }
}
