//! # scenesplit
//!
//! Split video files into separate clips at detected scene-change
//! boundaries.
//!
//! `scenesplit` decodes a video's frames in order, reduces each frame to a
//! 256-bin grayscale intensity histogram, and computes the Pearson
//! correlation between consecutive histograms. When the correlation drops
//! below a configurable threshold (default 0.6), the current clip is closed
//! and a new one opens — every frame is written to whichever clip is open.
//! Decoding and encoding are powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Split a Video
//!
//! ```no_run
//! use scenesplit::{SceneSplitter, SplitOptions, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4").unwrap();
//! let splitter = SceneSplitter::new(SplitOptions::new().with_threshold(0.6));
//! let summary = splitter.split(&mut source, "clips").unwrap();
//! println!("Video split into {} clips.", summary.clips_written);
//! ```
//!
//! ### Scan for Boundaries Only
//!
//! ```no_run
//! use scenesplit::{SceneSplitter, SplitOptions, VideoSource};
//!
//! let mut source = VideoSource::open("input.mp4").unwrap();
//! let boundaries = SceneSplitter::new(SplitOptions::new())
//!     .scan(&mut source)
//!     .unwrap();
//! for boundary in &boundaries {
//!     println!(
//!         "cut at {:.3}s (frame {}, similarity {:.2})",
//!         boundary.timestamp.as_secs_f64(),
//!         boundary.frame_number,
//!         boundary.similarity,
//!     );
//! }
//! ```
//!
//! ## Features
//!
//! - **Histogram-correlation detection** — grayscale 256-bin histograms,
//!   L1-normalized, scored with the Pearson correlation coefficient
//! - **Streaming clip writing** — clips are encoded frame-by-frame as
//!   boundaries are discovered; exactly one clip is open at a time
//! - **Deterministic output** — `clip_001.mp4`, `clip_002.mp4`, … in the
//!   output directory; same source and threshold produce the same file set
//! - **Lead-in policy** — open clip #1 on the first frame (default) or only
//!   at the first detected cut (legacy-compatible)
//! - **Progress & cancellation** — cooperative callbacks and a
//!   [`CancellationToken`] so the blocking pass can run on a worker thread
//!   behind a responsive UI
//! - **Scan-only mode** — report boundary timestamps and scores without
//!   writing any files
//! - **Pre-flight validation** — inspect a source and output directory for
//!   problems before committing to a long pass
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod boundaries;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod ffmpeg;
mod frame_iter;
pub mod histogram;
pub mod options;
pub mod progress;
pub mod sink;
pub mod source;
pub mod splitter;
pub mod validation;

pub use boundaries::{SceneBoundary, scan_frames};
pub use detector::BoundaryDetector;
pub use encoder::{ClipEncoder, ClipEncoderOptions, VideoCodec};
pub use error::SceneSplitError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use frame_iter::FrameIterator;
pub use histogram::{GrayHistogram, HISTOGRAM_BINS};
pub use options::{DEFAULT_THRESHOLD, LeadInPolicy, SplitOptions};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use sink::{ClipDirectory, ClipSink};
pub use source::{SourceInfo, VideoSource};
pub use splitter::{SceneSplitter, SplitSummary, split_frames};
pub use validation::{ValidationReport, validate_run};
