//! Shared filtering and projection helpers for scan samples.
//!
//! The thresholds below were calibrated against the RPLidar A1 sensor and
//! are shared by the recorder and the viewers so they agree on what a
//! valid point is.

use crate::scan::{Sample, ScanFrame};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Validity thresholds applied before projecting a sample.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterLimits {
    /// Minimum acceptable pulse quality, `[0, 255]`.
    pub quality_min: u8,
    /// Minimum valid distance in meters (sensor dead zone below this).
    pub dist_min_m: f64,
    /// Maximum valid distance in meters.
    pub dist_max_m: f64,
}

impl Default for FilterLimits {
    fn default() -> Self {
        FilterLimits {
            quality_min: 20,
            dist_min_m: 0.20,
            dist_max_m: 10.0,
        }
    }
}

/// A valid sample projected onto the sensor plane.
///
/// The sensor sits at the origin, the X axis points at 0 degrees and the
/// Y axis at 90 degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectedPoint {
    pub x_m: f64,
    pub y_m: f64,
    pub quality: u8,
    pub angle_degrees: f64,
    pub distance_m: f64,
}

/// Why a sample failed validation.
///
/// Each discarded sample gets exactly one reason, checked in the same
/// order as [`is_valid`], so the per-reason counts add up to the total
/// number of discarded samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    LowQuality,
    NoReturn,
    TooNear,
    TooFar,
}

/// Classifies a sample against the thresholds.
///
/// Returns `None` exactly when [`is_valid`] returns `true`.
pub fn discard_reason(sample: &Sample, limits: &FilterLimits) -> Option<DiscardReason> {
    if sample.quality < limits.quality_min {
        return Some(DiscardReason::LowQuality);
    }
    if sample.is_no_return() {
        return Some(DiscardReason::NoReturn);
    }
    let distance_m = sample.distance_mm / 1000.;
    if distance_m <= limits.dist_min_m {
        Some(DiscardReason::TooNear)
    } else if distance_m > limits.dist_max_m {
        Some(DiscardReason::TooFar)
    } else {
        None
    }
}

/// Whether a sample passes the quality and distance thresholds.
pub fn is_valid(sample: &Sample, limits: &FilterLimits) -> bool {
    if sample.quality < limits.quality_min {
        return false;
    }
    let distance_m = sample.distance_mm / 1000.;
    limits.dist_min_m < distance_m && distance_m <= limits.dist_max_m
}

/// Converts a polar sample to cartesian coordinates in meters.
pub fn polar_to_xy(sample: &Sample) -> (f64, f64) {
    let r = sample.distance_mm / 1000.;
    let theta = sample.angle_degrees * std::f64::consts::PI / 180.;
    (r * theta.cos(), r * theta.sin())
}

/// Filters a frame and projects the surviving samples to XY.
pub fn filter_and_project(frame: &ScanFrame, limits: &FilterLimits) -> Vec<ProjectedPoint> {
    frame
        .samples
        .iter()
        .filter(|s| is_valid(s, limits))
        .map(|s| {
            let (x_m, y_m) = polar_to_xy(s);
            ProjectedPoint {
                x_m,
                y_m,
                quality: s.quality,
                angle_degrees: s.angle_degrees,
                distance_m: s.distance_mm / 1000.,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid() {
        let limits = FilterLimits::default();
        assert!(is_valid(&Sample::new(10.0, 1500.0, 40), &limits));
        // below quality threshold
        assert!(!is_valid(&Sample::new(10.0, 1500.0, 5), &limits));
        // inside the dead zone
        assert!(!is_valid(&Sample::new(10.0, 120.0, 40), &limits));
        // beyond the maximum range
        assert!(!is_valid(&Sample::new(10.0, 11000.0, 40), &limits));
        // no return
        assert!(!is_valid(&Sample::new(10.0, 0.0, 40), &limits));
    }

    #[test]
    fn test_discard_reason_matches_is_valid() {
        let limits = FilterLimits::default();
        let cases = [
            (Sample::new(10.0, 1500.0, 40), None),
            (Sample::new(10.0, 1500.0, 5), Some(DiscardReason::LowQuality)),
            (Sample::new(10.0, 0.0, 40), Some(DiscardReason::NoReturn)),
            (Sample::new(10.0, 120.0, 40), Some(DiscardReason::TooNear)),
            (Sample::new(10.0, 11000.0, 40), Some(DiscardReason::TooFar)),
        ];
        for (sample, expected) in cases {
            assert_eq!(discard_reason(&sample, &limits), expected);
            assert_eq!(is_valid(&sample, &limits), expected.is_none());
        }
    }

    #[test]
    fn test_polar_to_xy_axes() {
        let (x, y) = polar_to_xy(&Sample::new(0.0, 1000.0, 40));
        assert!((x - 1.0).abs() < 1e-12);
        assert!(y.abs() < 1e-12);

        let (x, y) = polar_to_xy(&Sample::new(90.0, 2000.0, 40));
        assert!(x.abs() < 1e-12);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_filter_and_project() {
        let mut frame = ScanFrame::new(0, 0.0);
        frame.samples.push(Sample::new(0.0, 1000.0, 40));
        frame.samples.push(Sample::new(45.0, 0.0, 40));
        frame.samples.push(Sample::new(90.0, 3000.0, 3));
        let pts = filter_and_project(&frame, &FilterLimits::default());
        assert_eq!(pts.len(), 1);
        assert_eq!(pts[0].angle_degrees, 0.0);
        assert!((pts[0].distance_m - 1.0).abs() < 1e-12);
    }
}
