//! Clip output sinks.
//!
//! The split pass does not write files itself — it talks to a [`ClipSink`],
//! which owns the lifecycle of the one clip that may be open at any time.
//! [`ClipDirectory`] is the production sink: it encodes clips into
//! sequentially numbered files in an output directory. Tests drive the pass
//! with in-memory sinks instead.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::encoder::{ClipEncoder, ClipEncoderOptions};
use crate::error::SceneSplitError;

/// Receives clip-boundary decisions and frames from the split pass.
///
/// The pass guarantees the call sequence is well formed: `open_clip` is never
/// called while a clip is open, `write_frame` only while one is, and
/// [`finish`](ClipSink::finish) exactly once at the end of the pass — on
/// every exit path, including cancellation and mid-stream source failures.
pub trait ClipSink {
    /// Start clip number `clip_number` (1-based), sized to the given frame
    /// dimensions.
    fn open_clip(
        &mut self,
        clip_number: u32,
        width: u32,
        height: u32,
    ) -> Result<(), SceneSplitError>;

    /// Append a frame to the currently open clip.
    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), SceneSplitError>;

    /// Close the currently open clip, if any.
    fn close_clip(&mut self) -> Result<(), SceneSplitError>;

    /// Close any open clip and release resources.
    fn finish(&mut self) -> Result<(), SceneSplitError> {
        self.close_clip()
    }
}

/// Production sink that encodes clips into numbered files in a directory.
///
/// Files are named `clip_001.<ext>`, `clip_002.<ext>`, … — zero-padded to
/// three digits, counting from 1. Existing files with colliding names are
/// overwritten without warning, so re-running with the same source and
/// threshold deterministically reproduces the same file set. The counter is
/// not guarded past 999; names simply grow a digit.
pub struct ClipDirectory {
    directory: PathBuf,
    extension: String,
    fps: f64,
    encoder_options: ClipEncoderOptions,
    current: Option<ClipEncoder>,
}

impl ClipDirectory {
    /// Create a sink writing into `directory`, creating it if needed.
    ///
    /// `fps` is the source's nominal frame rate, inherited by every clip.
    ///
    /// # Errors
    ///
    /// [`SceneSplitError::OutputDirectory`] if the directory cannot be
    /// created or is not a directory.
    pub fn new<P: AsRef<Path>>(
        directory: P,
        extension: &str,
        fps: f64,
        encoder_options: ClipEncoderOptions,
    ) -> Result<Self, SceneSplitError> {
        let directory = directory.as_ref().to_path_buf();

        fs::create_dir_all(&directory).map_err(|e| SceneSplitError::OutputDirectory {
            path: directory.clone(),
            reason: e.to_string(),
        })?;

        if !directory.is_dir() {
            return Err(SceneSplitError::OutputDirectory {
                path: directory,
                reason: "not a directory".to_string(),
            });
        }

        Ok(Self {
            directory,
            extension: extension.trim_start_matches('.').to_string(),
            fps,
            encoder_options,
            current: None,
        })
    }

    /// The path a given clip number maps to.
    pub fn clip_path(&self, clip_number: u32) -> PathBuf {
        self.directory
            .join(format!("clip_{clip_number:03}.{}", self.extension))
    }
}

impl ClipSink for ClipDirectory {
    fn open_clip(
        &mut self,
        clip_number: u32,
        width: u32,
        height: u32,
    ) -> Result<(), SceneSplitError> {
        self.close_clip()?;

        let path = self.clip_path(clip_number);
        log::info!("Starting new clip: {}", path.display());

        let encoder = ClipEncoder::create(&path, width, height, self.fps, &self.encoder_options)?;
        self.current = Some(encoder);
        Ok(())
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), SceneSplitError> {
        match self.current.as_mut() {
            Some(encoder) => encoder.write_frame(frame),
            None => Err(SceneSplitError::ClipWrite(
                "no clip is currently open".to_string(),
            )),
        }
    }

    fn close_clip(&mut self) -> Result<(), SceneSplitError> {
        if let Some(encoder) = self.current.take() {
            log::debug!("Closing clip after {} frames", encoder.frames_written());
            encoder.finish()?;
        }
        Ok(())
    }
}
