pub mod health;
pub mod processing;
pub mod scan;

pub use health::DatasetHealth;
pub use processing::{
    discard_reason, filter_and_project, is_valid, polar_to_xy, DiscardReason, FilterLimits,
    ProjectedPoint,
};
pub use scan::{Sample, ScanFrame};
