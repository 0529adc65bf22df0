//! Post-processing outputs for a replayed capture: the filtered XY point
//! cloud and a short markdown report.

use crate::error::CaptureError;
use rplidar_data::{
    discard_reason, filter_and_project, DatasetHealth, DiscardReason, FilterLimits, ScanFrame,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub const FILTERED_POINTS_FILE: &str = "filtered_points.csv";
pub const REPORT_FILE: &str = "report_scan.md";

/// Where the processing outputs landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFiles {
    pub filtered_points: PathBuf,
    pub report: PathBuf,
}

/// Writes `filtered_points.csv` and `report_scan.md` into `out_dir`.
pub fn write_report(
    out_dir: impl AsRef<Path>,
    input: &str,
    frames: &[ScanFrame],
    limits: &FilterLimits,
) -> Result<ReportFiles, CaptureError> {
    let out_dir = out_dir.as_ref();
    std::fs::create_dir_all(out_dir)?;

    let total: usize = frames.iter().map(ScanFrame::len).sum();
    // each discarded sample lands in exactly one bucket
    let mut low_quality = 0usize;
    let mut no_return = 0usize;
    let mut too_near = 0usize;
    let mut too_far = 0usize;
    for sample in frames.iter().flat_map(|f| f.samples.iter()) {
        match discard_reason(sample, limits) {
            Some(DiscardReason::LowQuality) => low_quality += 1,
            Some(DiscardReason::NoReturn) => no_return += 1,
            Some(DiscardReason::TooNear) => too_near += 1,
            Some(DiscardReason::TooFar) => too_far += 1,
            None => {}
        }
    }
    let invalid = low_quality + no_return + too_near + too_far;
    let valid = total - invalid;
    let health = DatasetHealth::from_samples(frames.iter().flat_map(|f| f.samples.iter()));

    let filtered_points = out_dir.join(FILTERED_POINTS_FILE);
    let mut writer = csv::Writer::from_path(&filtered_points)?;
    for frame in frames {
        for point in filter_and_project(frame, limits) {
            writer.serialize(point)?;
        }
    }
    writer.flush()?;

    let valid_ratio = if total > 0 {
        (valid as f64) / (total as f64)
    } else {
        0.0
    };
    let report = out_dir.join(REPORT_FILE);
    std::fs::write(
        &report,
        format!(
            "# Scan capture report\n\
             \n\
             **Input file:** `{input}`\n\
             **Frames:** {n_frames}\n\
             **Total samples:** {total}\n\
             **Valid after filtering:** {valid_pct:.2}% ({valid} samples)\n\
             **Discarded:** {invalid} samples\n\
             **No-return samples:** {total_no_return}\n\
             \n\
             ## Filter thresholds\n\
             \n\
             - quality >= {quality_min}\n\
             - {dist_min:.2} m < distance <= {dist_max:.2} m\n\
             \n\
             ## Discarded by reason\n\
             \n\
             - quality below {quality_min}: {low_quality}\n\
             - no return: {no_return}\n\
             - closer than {dist_min:.2} m: {too_near}\n\
             - farther than {dist_max:.2} m: {too_far}\n\
             \n\
             ## Generated files\n\
             \n\
             - `{filtered}`: valid points projected to XY\n",
            input = input,
            n_frames = frames.len(),
            total = total,
            valid_pct = valid_ratio * 100.,
            valid = valid,
            invalid = invalid,
            total_no_return = health.no_return_count,
            low_quality = low_quality,
            no_return = no_return,
            too_near = too_near,
            too_far = too_far,
            quality_min = limits.quality_min,
            dist_min = limits.dist_min_m,
            dist_max = limits.dist_max_m,
            filtered = FILTERED_POINTS_FILE,
        ),
    )?;

    info!(
        "report written: {} and {}",
        filtered_points.display(),
        report.display()
    );
    Ok(ReportFiles {
        filtered_points,
        report,
    })
}
