use crate::scan::Sample;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregate statistics over a set of samples.
///
/// The replay-side analogue of the device health query: it lets a viewer
/// sanity-check a recorded dataset before drawing it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetHealth {
    pub count: usize,
    pub no_return_count: usize,
    pub quality_min: u8,
    pub quality_max: u8,
    pub distance_min_mm: f64,
    pub distance_max_mm: f64,
    pub distance_mean_mm: f64,
    pub angle_min_degrees: f64,
    pub angle_max_degrees: f64,
}

impl DatasetHealth {
    /// Computes statistics over the given samples.
    /// "No return" samples count toward `count` but are excluded from the
    /// distance statistics.
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let mut health = DatasetHealth {
            quality_min: u8::MAX,
            distance_min_mm: f64::INFINITY,
            angle_min_degrees: f64::INFINITY,
            angle_max_degrees: f64::NEG_INFINITY,
            ..Default::default()
        };
        let mut distance_sum = 0.0;
        let mut returns = 0usize;

        for sample in samples {
            health.count += 1;
            health.quality_min = health.quality_min.min(sample.quality);
            health.quality_max = health.quality_max.max(sample.quality);
            health.angle_min_degrees = health.angle_min_degrees.min(sample.angle_degrees);
            health.angle_max_degrees = health.angle_max_degrees.max(sample.angle_degrees);
            if sample.is_no_return() {
                health.no_return_count += 1;
            } else {
                returns += 1;
                distance_sum += sample.distance_mm;
                health.distance_min_mm = health.distance_min_mm.min(sample.distance_mm);
                health.distance_max_mm = health.distance_max_mm.max(sample.distance_mm);
            }
        }

        if health.count == 0 {
            return DatasetHealth::default();
        }
        if returns > 0 {
            health.distance_mean_mm = distance_sum / (returns as f64);
        } else {
            health.distance_min_mm = 0.0;
            health.distance_max_mm = 0.0;
        }
        health
    }
}
