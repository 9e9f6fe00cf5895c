//! Per-frame scene-boundary decision state.
//!
//! [`BoundaryDetector`] holds the one piece of state the detection algorithm
//! needs between frames: the previous frame's histogram. Feeding it frames in
//! source order yields a similarity score for every frame after the first;
//! a score below the configured threshold marks the frame as the start of a
//! new scene.

use image::RgbImage;

use crate::histogram::GrayHistogram;

/// Stateful scene-boundary detector over an ordered frame sequence.
///
/// The first observed frame never triggers a cut — there is no previous
/// histogram to compare against.
#[derive(Debug)]
pub struct BoundaryDetector {
    threshold: f64,
    previous: Option<GrayHistogram>,
}

impl BoundaryDetector {
    /// Create a detector with the given similarity threshold in (0, 1].
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }

    /// The configured similarity threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Observe the next frame in source order.
    ///
    /// Returns the Pearson correlation between this frame's histogram and the
    /// previous frame's, or `None` for the very first frame. The frame's
    /// histogram replaces the stored one either way.
    pub fn observe(&mut self, frame: &RgbImage) -> Option<f64> {
        let histogram = GrayHistogram::from_rgb(frame);
        let similarity = self
            .previous
            .as_ref()
            .map(|previous| previous.correlation(&histogram));
        self.previous = Some(histogram);
        similarity
    }

    /// Whether a similarity score marks a scene boundary.
    pub fn is_boundary(&self, similarity: f64) -> bool {
        similarity < self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb(rgb))
    }

    #[test]
    fn first_frame_yields_no_score() {
        let mut detector = BoundaryDetector::new(0.6);
        assert!(detector.observe(&solid([50, 50, 50])).is_none());
    }

    #[test]
    fn identical_frames_are_not_boundaries() {
        let mut detector = BoundaryDetector::new(0.6);
        detector.observe(&solid([50, 50, 50]));
        let similarity = detector.observe(&solid([50, 50, 50])).unwrap();
        assert!(!detector.is_boundary(similarity));
    }

    #[test]
    fn dissimilar_frames_are_boundaries() {
        let mut detector = BoundaryDetector::new(0.6);
        detector.observe(&solid([10, 10, 10]));
        let similarity = detector.observe(&solid([240, 240, 240])).unwrap();
        assert!(detector.is_boundary(similarity));
    }

    #[test]
    fn comparison_is_against_immediately_preceding_frame() {
        let mut detector = BoundaryDetector::new(0.6);
        detector.observe(&solid([10, 10, 10]));
        detector.observe(&solid([240, 240, 240]));
        // Back to back identical bright frames: high similarity again.
        let similarity = detector.observe(&solid([240, 240, 240])).unwrap();
        assert!(!detector.is_boundary(similarity));
    }
}
