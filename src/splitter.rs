//! The split pass — one stateful, strictly sequential walk over the frame
//! stream.
//!
//! For each consecutive frame pair the pass computes a histogram-correlation
//! similarity score; when the score drops below the threshold it closes the
//! current clip and opens the next, writing every incoming frame to whichever
//! clip is open. [`split_frames`] is the sans-I/O core: a pure function of
//! (frame source, source info, clip sink, options) with no ambient state.
//! [`SceneSplitter`] wires it to a real [`VideoSource`] and an encoding
//! [`ClipDirectory`] sink.
//!
//! # Example
//!
//! ```no_run
//! use scenesplit::{SceneSplitError, SceneSplitter, SplitOptions, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! let splitter = SceneSplitter::new(SplitOptions::new().with_threshold(0.6));
//! let summary = splitter.split(&mut source, "clips")?;
//!
//! if summary.clips_written == 0 {
//!     println!("no clips produced");
//! } else {
//!     println!("split into {} clips", summary.clips_written);
//! }
//! # Ok::<(), SceneSplitError>(())
//! ```

use std::path::Path;

use image::RgbImage;

use crate::boundaries::{SceneBoundary, frame_timestamp, scan_frames};
use crate::detector::BoundaryDetector;
use crate::error::SceneSplitError;
use crate::options::{LeadInPolicy, SplitOptions};
use crate::progress::{OperationType, ProgressTracker};
use crate::sink::{ClipDirectory, ClipSink};
use crate::source::{SourceInfo, VideoSource};

/// Outcome of a completed split pass.
///
/// A pass that produced zero clips is a successful outcome, distinct from
/// any error: it means the source had fewer than two frames or no
/// consecutive-frame similarity ever dropped below the threshold (under the
/// legacy lead-in policy).
#[derive(Debug, Clone)]
#[must_use]
pub struct SplitSummary {
    /// Number of clips written (the final clip counter value).
    pub clips_written: u32,
    /// Total frames read from the source.
    pub frames_read: u64,
    /// Total frames written across all clips.
    pub frames_written: u64,
    /// Every detected scene boundary, in source order.
    pub boundaries: Vec<SceneBoundary>,
}

/// Splits a frame stream into clips at detected scene boundaries.
///
/// Create with [`SceneSplitter::new`], then call
/// [`split`](SceneSplitter::split) or [`scan`](SceneSplitter::scan). The
/// splitter itself is cheap and reusable; all per-pass state lives inside the
/// pass.
#[derive(Debug, Clone, Default)]
pub struct SceneSplitter {
    options: SplitOptions,
}

impl SceneSplitter {
    /// Create a splitter with the given options.
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    /// Split `source` into clips under `output_dir`.
    ///
    /// Creates the output directory if needed, decodes every frame, and
    /// writes `clip_001.<ext>`, `clip_002.<ext>`, … files. Colliding names
    /// from earlier runs are overwritten without warning.
    ///
    /// The call blocks for the duration of the pass; run it on a worker
    /// thread and use the progress callback and cancellation token from
    /// [`SplitOptions`] to keep a UI responsive.
    ///
    /// # Errors
    ///
    /// - [`SceneSplitError::OutputDirectory`] if the directory is unusable.
    /// - [`SceneSplitError::InvalidThreshold`] for thresholds outside (0, 1].
    /// - Clip creation/write errors abort the whole pass; clips completed
    ///   before the failure remain on disk.
    /// - [`SceneSplitError::Cancelled`] if the cancellation token fires; the
    ///   open clip is closed cleanly first.
    pub fn split<P: AsRef<Path>>(
        &self,
        source: &mut VideoSource,
        output_dir: P,
    ) -> Result<SplitSummary, SceneSplitError> {
        let info = source.info().clone();
        let mut sink = ClipDirectory::new(
            output_dir,
            &self.options.extension,
            info.frames_per_second,
            self.options.encoder.clone(),
        )?;
        let frames = source.frames()?;
        split_frames(frames, &info, &mut sink, &self.options)
    }

    /// Detect scene boundaries in `source` without writing any clips.
    ///
    /// # Errors
    ///
    /// Same as [`split`](SceneSplitter::split), minus the output-side errors.
    pub fn scan(&self, source: &mut VideoSource) -> Result<Vec<SceneBoundary>, SceneSplitError> {
        let info = source.info().clone();
        let frames = source.frames()?;
        scan_frames(frames, &info, &self.options)
    }
}

/// Split an ordered frame sequence into clips via `sink`.
///
/// This is the core single-pass routine. It consumes `(frame_number, frame)`
/// pairs in source order, detects boundaries, drives the sink's clip
/// lifecycle, and reports progress. The sink is finished (its open clip
/// closed) on **every** exit path, including cancellation and write errors.
///
/// Lead-in behavior follows [`SplitOptions::with_lead_in_policy`]: by default
/// clip #1 opens on the first frame; under the legacy policy frames before
/// the first detected boundary are dropped. The first frame never triggers a
/// boundary under either policy.
///
/// # Errors
///
/// - [`SceneSplitError::InvalidThreshold`] if the threshold is out of range.
/// - Any sink error, which aborts the pass.
/// - [`SceneSplitError::Cancelled`] if the cancellation token fires.
pub fn split_frames<I, S>(
    frames: I,
    info: &SourceInfo,
    sink: &mut S,
    options: &SplitOptions,
) -> Result<SplitSummary, SceneSplitError>
where
    I: IntoIterator<Item = (u64, RgbImage)>,
    S: ClipSink,
{
    let result = run_split_pass(frames, info, sink, options);
    let finish_result = sink.finish();

    // A pass error takes precedence over a close failure on the way out.
    let summary = result?;
    finish_result?;

    log::info!(
        "Split complete: {} clips, {} of {} frames written",
        summary.clips_written,
        summary.frames_written,
        summary.frames_read,
    );
    Ok(summary)
}

fn run_split_pass<I, S>(
    frames: I,
    info: &SourceInfo,
    sink: &mut S,
    options: &SplitOptions,
) -> Result<SplitSummary, SceneSplitError>
where
    I: IntoIterator<Item = (u64, RgbImage)>,
    S: ClipSink,
{
    let threshold = options.validated_threshold()?;
    log::debug!(
        "Splitting at threshold {threshold} (lead-in: {:?})",
        options.lead_in,
    );

    let total = (info.frame_count > 0).then_some(info.frame_count);
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::SceneSplit,
        total,
        options.batch_size,
    );

    let mut detector = BoundaryDetector::new(threshold);
    let mut clip_count: u32 = 0;
    let mut clip_open = false;
    let mut frames_read: u64 = 0;
    let mut frames_written: u64 = 0;
    let mut boundaries = Vec::new();

    for (frame_number, frame) in frames {
        if options.is_cancelled() {
            return Err(SceneSplitError::Cancelled);
        }

        let similarity = detector.observe(&frame);

        match similarity {
            Some(similarity) if detector.is_boundary(similarity) => {
                // This frame starts a new scene: rotate clips.
                log::debug!(
                    "Scene boundary at frame {frame_number} (similarity {similarity:.3})"
                );
                boundaries.push(SceneBoundary {
                    frame_number,
                    timestamp: frame_timestamp(frame_number, info.frames_per_second),
                    similarity,
                });

                if clip_open {
                    sink.close_clip()?;
                }
                clip_count += 1;
                sink.open_clip(clip_count, frame.width(), frame.height())?;
                clip_open = true;
            }
            None if options.lead_in == LeadInPolicy::OpenOnFirstFrame => {
                // First frame, corrected policy: clip #1 starts here.
                clip_count += 1;
                sink.open_clip(clip_count, frame.width(), frame.height())?;
                clip_open = true;
            }
            _ => {}
        }

        if clip_open {
            sink.write_frame(&frame)?;
            frames_written += 1;
        }

        frames_read += 1;
        tracker.advance(Some(frame_number));
    }

    tracker.finish();

    Ok(SplitSummary {
        clips_written: clip_count,
        frames_read,
        frames_written,
        boundaries,
    })
}
