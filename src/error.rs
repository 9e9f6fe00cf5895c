//! Error types for the `scenesplit` crate.
//!
//! This module defines [`SceneSplitError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context to
//! diagnose the problem without additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `scenesplit` operations.
///
/// Every public method that can fail returns `Result<T, SceneSplitError>`.
///
/// Note that a pass that produces zero clips is **not** an error — it is
/// reported as a successful [`SplitSummary`](crate::SplitSummary) with
/// `clips_written == 0`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SceneSplitError {
    /// The source video could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame decoder could not be set up.
    ///
    /// Mid-stream decode failures do not produce this error — they are
    /// treated as end-of-stream and the pass returns a partial result.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A clip output file could not be created.
    #[error("Failed to create clip file at {path}: {reason}")]
    ClipCreate {
        /// Path of the clip file that could not be created.
        path: PathBuf,
        /// Underlying reason the create failed.
        reason: String,
    },

    /// A frame could not be written to the currently open clip.
    #[error("Clip write error: {0}")]
    ClipWrite(String),

    /// The video encoder for a clip could not be opened or fed.
    #[error("Clip encoding error: {0}")]
    ClipEncode(String),

    /// The output directory does not exist and could not be created, or is
    /// not writable.
    #[error("Output directory {path} is unusable: {reason}")]
    OutputDirectory {
        /// The offending directory path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The similarity threshold is outside the valid range (0, 1].
    #[error("Invalid similarity threshold {0} (must be in (0, 1])")]
    InvalidThreshold(f64),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for SceneSplitError {
    fn from(error: FfmpegError) -> Self {
        SceneSplitError::Ffmpeg(error.to_string())
    }
}
