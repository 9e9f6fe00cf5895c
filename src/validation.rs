//! Pre-flight validation.
//!
//! Provides [`VideoSource::validate`](crate::VideoSource::validate) and
//! [`validate_run`], which inspect a source's metadata (and optionally the
//! intended output directory and threshold) before a long split pass starts,
//! returning a [`ValidationReport`] describing any potential issues.
//!
//! # Example
//!
//! ```no_run
//! use scenesplit::VideoSource;
//!
//! let source = VideoSource::open("input.mp4")?;
//! let report = source.validate();
//! if report.is_valid() {
//!     println!("File is splittable");
//! } else {
//!     for error in &report.errors {
//!         println!("Error: {error}");
//!     }
//! }
//! # Ok::<(), scenesplit::SceneSplitError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::Duration;

use crate::source::SourceInfo;

/// Summary of pre-flight validation.
///
/// Contains lists of informational notices, warnings, and errors found
/// before a split pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may affect split quality.
    pub warnings: Vec<String>,
    /// Fatal issues that will prevent splitting.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found.
    ///
    /// Warnings do not affect this result — only errors make the report
    /// invalid.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of issues (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run validation checks on a source's cached metadata.
pub(crate) fn validate_source(info: &SourceInfo) -> ValidationReport {
    let mut report = ValidationReport::default();

    if info.width == 0 || info.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}×{}",
            info.width, info.height,
        ));
    }

    if info.duration == Duration::ZERO {
        report
            .warnings
            .push("Media duration is zero — progress percentages will be unavailable".to_string());
    }

    if info.frames_per_second <= 0.0 {
        report.warnings.push(
            "Video frame rate is zero or negative — clip timing will be unreliable".to_string(),
        );
    } else if info.frames_per_second > 240.0 {
        report.warnings.push(format!(
            "Unusually high frame rate ({:.1} fps) — splitting may be slow",
            info.frames_per_second,
        ));
    }

    if info.frame_count == 0 && info.duration > Duration::ZERO {
        report
            .warnings
            .push("Estimated frame count is zero despite non-zero duration".to_string());
    } else if info.frame_count < 2 {
        report
            .warnings
            .push("Source has fewer than two frames — no boundary can ever be detected".to_string());
    }

    report.info.push(format!(
        "Video: {} {}×{} @ {:.2} fps, ~{} frames",
        info.codec, info.width, info.height, info.frames_per_second, info.frame_count,
    ));

    report
}

/// Validate a full run: source metadata, threshold, and output directory.
///
/// The output directory check verifies the path either is a writable
/// directory or does not yet exist (it will be created by the pass); a path
/// that exists but is not a directory is an error.
pub fn validate_run(info: &SourceInfo, threshold: f64, output_dir: &Path) -> ValidationReport {
    let mut report = validate_source(info);

    if !(threshold > 0.0 && threshold <= 1.0) {
        report.errors.push(format!(
            "Similarity threshold {threshold} is outside (0, 1]",
        ));
    }

    if output_dir.exists() {
        if !output_dir.is_dir() {
            report.errors.push(format!(
                "Output path {} exists but is not a directory",
                output_dir.display(),
            ));
        } else {
            report.info.push(format!(
                "Output directory {} exists; colliding clip files will be overwritten",
                output_dir.display(),
            ));
        }
    } else {
        report.info.push(format!(
            "Output directory {} will be created",
            output_dir.display(),
        ));
    }

    report
}
