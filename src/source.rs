//! Video source — open a file and describe its video stream.
//!
//! [`VideoSource`] is the entry point for reading a video. It opens the
//! container, locates the best video stream, and caches [`SourceInfo`]
//! (dimensions, frame rate, estimated frame count). Call
//! [`frames`](VideoSource::frames) to obtain the lazy decoded-frame iterator
//! the split pass consumes.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::error::SceneSplitError;
use crate::frame_iter::FrameIterator;

/// Cached description of a source's video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct SourceInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frames per second (may be approximate for variable-frame-rate
    /// content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame
    /// rate. Zero when the container does not report a usable duration.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Total duration of the media file.
    pub duration: Duration,
    /// Container format name (e.g. `"mp4"`, `"matroska"`).
    pub format: String,
}

/// An opened video file, ready to be split.
///
/// Created via [`VideoSource::open`]. Holds the demuxer context and cached
/// stream metadata; the frame sequence it produces is finite, forward-only,
/// and not restartable (re-open the source to read it again).
///
/// # Example
///
/// ```no_run
/// use scenesplit::{SceneSplitError, VideoSource};
///
/// let source = VideoSource::open("input.mp4")?;
/// let info = source.info();
/// println!("{}x{} @ {:.2} fps", info.width, info.height, info.frames_per_second);
/// # Ok::<(), SceneSplitError>(())
/// ```
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached video stream description.
    pub(crate) info: SourceInfo,
    /// Index of the best video stream.
    pub(crate) video_stream_index: usize,
    /// Path to the opened file (kept for error messages).
    pub(crate) file_path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// - [`SceneSplitError::FileOpen`] if the file cannot be opened or its
    ///   codec parameters cannot be read.
    /// - [`SceneSplitError::NoVideoStream`] if no video stream exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SceneSplitError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| SceneSplitError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SceneSplitError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(SceneSplitError::NoVideoStream)?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let format = input_context.format().name().to_string();

        let stream = input_context
            .stream(video_stream_index)
            .ok_or(SceneSplitError::NoVideoStream)?;

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| SceneSplitError::FileOpen {
                path: file_path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            },
        )?;
        let video_decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| SceneSplitError::FileOpen {
                    path: file_path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let width = video_decoder.width();
        let height = video_decoder.height();

        // Nominal frame rate from the stream's average rate, falling back to
        // the raw rate field.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = SourceInfo {
            width,
            height,
            frames_per_second,
            frame_count,
            codec,
            duration,
            format,
        };

        log::info!(
            "Opened video: {} (format={}, {}x{} @ {:.2} fps, ~{} frames, codec={})",
            file_path.display(),
            info.format,
            info.width,
            info.height,
            info.frames_per_second,
            info.frame_count,
            info.codec,
        );

        drop(stream);

        Ok(Self {
            input_context,
            info,
            video_stream_index,
            file_path,
        })
    }

    /// Get a reference to the cached video stream description.
    ///
    /// Metadata is extracted once during [`open`](VideoSource::open) and does
    /// not require additional decoding.
    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    /// Create a lazy iterator over all decoded frames in source order.
    ///
    /// The iterator borrows this source mutably and consumes the underlying
    /// stream; it cannot be restarted.
    ///
    /// # Errors
    ///
    /// [`SceneSplitError::VideoDecodeError`] if the decoder cannot be set up.
    pub fn frames(&mut self) -> Result<FrameIterator<'_>, SceneSplitError> {
        FrameIterator::new(self)
    }

    /// Validate the source and return a report.
    ///
    /// Inspects cached metadata for issues such as zero dimensions or an
    /// unusable frame rate. Does not re-read the file.
    pub fn validate(&self) -> crate::validation::ValidationReport {
        crate::validation::validate_source(&self.info)
    }
}
