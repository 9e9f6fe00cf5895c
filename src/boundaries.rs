//! Scene-boundary scanning without clip output.
//!
//! Some callers only want to know *where* the cuts are — to feed an external
//! splitting tool, print a report, or drive a timeline UI. [`scan_frames`]
//! runs the same histogram-correlation detection as the split pass but
//! reports [`SceneBoundary`] values instead of writing files.

use std::time::Duration;

use image::RgbImage;

use crate::detector::BoundaryDetector;
use crate::error::SceneSplitError;
use crate::options::SplitOptions;
use crate::progress::{OperationType, ProgressTracker};
use crate::source::SourceInfo;

/// A detected scene boundary.
///
/// Marks the first frame of a new scene: the frame whose histogram
/// correlation with the immediately preceding frame fell below the
/// threshold.
#[derive(Debug, Clone)]
pub struct SceneBoundary {
    /// Frame number at which the new scene starts (0-based, decode order).
    pub frame_number: u64,
    /// Timestamp of that frame, derived from the nominal frame rate.
    pub timestamp: Duration,
    /// The similarity score that triggered the cut (below threshold).
    pub similarity: f64,
}

/// Convert a frame number to a timestamp using the nominal frame rate.
pub(crate) fn frame_timestamp(frame_number: u64, frames_per_second: f64) -> Duration {
    if frames_per_second > 0.0 {
        Duration::from_secs_f64(frame_number as f64 / frames_per_second)
    } else {
        Duration::ZERO
    }
}

/// Scan an ordered frame sequence for scene boundaries.
///
/// Consumes `(frame_number, frame)` pairs in source order and returns every
/// boundary where similarity dropped below the configured threshold. The
/// first frame never produces a boundary. An empty result means the source
/// had fewer than two frames or no similarity ever fell below threshold.
///
/// # Errors
///
/// - [`SceneSplitError::InvalidThreshold`] if the threshold is out of range.
/// - [`SceneSplitError::Cancelled`] if the cancellation token fires.
pub fn scan_frames<I>(
    frames: I,
    info: &SourceInfo,
    options: &SplitOptions,
) -> Result<Vec<SceneBoundary>, SceneSplitError>
where
    I: IntoIterator<Item = (u64, RgbImage)>,
{
    let threshold = options.validated_threshold()?;
    log::debug!("Scanning for scene boundaries (threshold={threshold})");

    let total = (info.frame_count > 0).then_some(info.frame_count);
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::BoundaryScan,
        total,
        options.batch_size,
    );

    let mut detector = BoundaryDetector::new(threshold);
    let mut boundaries = Vec::new();

    for (frame_number, frame) in frames {
        if options.is_cancelled() {
            return Err(SceneSplitError::Cancelled);
        }

        if let Some(similarity) = detector.observe(&frame)
            && detector.is_boundary(similarity)
        {
            log::debug!("Scene boundary at frame {frame_number} (similarity {similarity:.3})");
            boundaries.push(SceneBoundary {
                frame_number,
                timestamp: frame_timestamp(frame_number, info.frames_per_second),
                similarity,
            });
        }

        tracker.advance(Some(frame_number));
    }

    tracker.finish();
    log::info!("Scan complete: {} scene boundaries", boundaries.len());
    Ok(boundaries)
}
