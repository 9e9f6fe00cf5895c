//! Split configuration.
//!
//! [`SplitOptions`] is a builder that threads the similarity threshold,
//! lead-in policy, encoder settings, progress callbacks, and cancellation
//! tokens through the split pass without polluting every function signature.
//!
//! # Example
//!
//! ```
//! use scenesplit::{CancellationToken, LeadInPolicy, SplitOptions};
//!
//! let token = CancellationToken::new();
//! let options = SplitOptions::new()
//!     .with_threshold(0.7)
//!     .with_lead_in_policy(LeadInPolicy::OpenOnFirstCut)
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::encoder::ClipEncoderOptions;
use crate::error::SceneSplitError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Recommended similarity threshold: consecutive frames whose histogram
/// correlation falls below this start a new clip.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// What to do with frames read before the first detected scene boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadInPolicy {
    /// Open clip #1 as soon as the first frame is read, so every frame is
    /// written to some clip. This is the default.
    #[default]
    OpenOnFirstFrame,
    /// Only open a clip when a boundary is detected. Frames before the first
    /// boundary (including the first frame) are silently dropped.
    ///
    /// This reproduces the historical behavior of reactive clip opening and
    /// exists for output-compatible runs.
    OpenOnFirstCut,
}

/// Configuration for a split or scan pass.
///
/// Carries the detection threshold plus optional progress-, cancellation-,
/// and encoder-related settings. All fields have sensible defaults — a
/// default-constructed value splits with the recommended threshold of 0.6
/// and writes H.264 MP4 clips.
#[derive(Clone)]
pub struct SplitOptions {
    /// Similarity threshold in (0, 1].
    pub(crate) threshold: f64,
    /// Lead-in handling policy.
    pub(crate) lead_in: LeadInPolicy,
    /// Container extension for clip files (without the dot).
    pub(crate) extension: String,
    /// Encoder settings for output clips.
    pub(crate) encoder: ClipEncoderOptions,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames).
    pub(crate) batch_size: u64,
}

impl Debug for SplitOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SplitOptions")
            .field("threshold", &self.threshold)
            .field("lead_in", &self.lead_in)
            .field("extension", &self.extension)
            .field("encoder", &self.encoder)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitOptions {
    /// Create a new configuration with default settings.
    ///
    /// Defaults: threshold 0.6, [`LeadInPolicy::OpenOnFirstFrame`], `.mp4`
    /// clips, default encoder settings, no progress callback, no
    /// cancellation, batch size 1.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            lead_in: LeadInPolicy::default(),
            extension: "mp4".to_string(),
            encoder: ClipEncoderOptions::default(),
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Set the similarity threshold.
    ///
    /// The value is validated when the pass starts; values outside (0, 1]
    /// produce [`SceneSplitError::InvalidThreshold`].
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the lead-in policy.
    #[must_use]
    pub fn with_lead_in_policy(mut self, policy: LeadInPolicy) -> Self {
        self.lead_in = policy;
        self
    }

    /// Set the container extension for clip files (e.g. `"mp4"`, `"mkv"`).
    ///
    /// A leading dot is stripped.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the encoder options used for output clips.
    #[must_use]
    pub fn with_encoder(mut self, encoder: ClipEncoderOptions) -> Self {
        self.encoder = encoder;
        self
    }

    /// Attach a progress callback.
    ///
    /// The callback is invoked every
    /// [`batch_size`](SplitOptions::with_batch_size) frames during the pass,
    /// plus once when the pass finishes.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the pass closes any open clip and
    /// returns [`SceneSplitError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every frame; 10 means every 10th frame. Clamped to
    /// a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured similarity threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The configured lead-in policy.
    pub fn lead_in_policy(&self) -> LeadInPolicy {
        self.lead_in
    }

    /// The configured clip file extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Validate the threshold, returning it if in range.
    pub(crate) fn validated_threshold(&self) -> Result<f64, SceneSplitError> {
        if self.threshold > 0.0 && self.threshold <= 1.0 {
            Ok(self.threshold)
        } else {
            Err(SceneSplitError::InvalidThreshold(self.threshold))
        }
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
