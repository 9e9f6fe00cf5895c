//! Grayscale intensity histograms and their correlation.
//!
//! Each decoded frame is reduced to a [`GrayHistogram`]: a 256-bucket,
//! L1-normalized distribution of grayscale intensity values. Two consecutive
//! frames are compared with the Pearson correlation coefficient of their
//! histograms; a low correlation means the visual content changed enough to
//! be a scene boundary.
//!
//! Only the histogram is retained between frames — the frame's pixel buffer
//! is released as soon as its histogram has been computed.

use image::RgbImage;

/// Number of intensity buckets. One per 8-bit grayscale level.
pub const HISTOGRAM_BINS: usize = 256;

/// A normalized grayscale intensity histogram of one video frame.
///
/// Buckets are non-negative and sum to 1.0 for any non-empty frame.
/// Normalization makes histograms of differently sized frames comparable;
/// the Pearson correlation used for scoring is additionally invariant to any
/// positive affine rescaling of the buckets.
#[derive(Debug, Clone)]
pub struct GrayHistogram {
    buckets: [f64; HISTOGRAM_BINS],
}

impl GrayHistogram {
    /// Compute the histogram of an RGB frame.
    ///
    /// Pixels are converted to grayscale with the BT.601 luma weights
    /// (0.299 R + 0.587 G + 0.114 B), matching the conversion used by the
    /// `image` crate.
    pub fn from_rgb(frame: &RgbImage) -> Self {
        let mut counts = [0u64; HISTOGRAM_BINS];

        for pixel in frame.pixels() {
            let [r, g, b] = pixel.0;
            let luma = (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
                .round() as usize;
            counts[luma.min(HISTOGRAM_BINS - 1)] += 1;
        }

        Self::from_counts(&counts)
    }

    /// Build a normalized histogram from raw bucket counts.
    pub fn from_counts(counts: &[u64; HISTOGRAM_BINS]) -> Self {
        let total: u64 = counts.iter().sum();
        let mut buckets = [0.0; HISTOGRAM_BINS];

        if total > 0 {
            let total = total as f64;
            for (bucket, &count) in buckets.iter_mut().zip(counts.iter()) {
                *bucket = count as f64 / total;
            }
        }

        Self { buckets }
    }

    /// The normalized bucket values.
    pub fn buckets(&self) -> &[f64; HISTOGRAM_BINS] {
        &self.buckets
    }

    /// Pearson correlation coefficient between two histograms, in [-1, 1].
    ///
    /// Higher means more similar; identical histograms score 1.0. If both
    /// histograms have zero variance (perfectly uniform) the score is 1.0;
    /// if only one does, 0.0.
    pub fn correlation(&self, other: &GrayHistogram) -> f64 {
        let n = HISTOGRAM_BINS as f64;
        let mean_a: f64 = self.buckets.iter().sum::<f64>() / n;
        let mean_b: f64 = other.buckets.iter().sum::<f64>() / n;

        let mut covariance = 0.0;
        let mut variance_a = 0.0;
        let mut variance_b = 0.0;

        for (&a, &b) in self.buckets.iter().zip(other.buckets.iter()) {
            let da = a - mean_a;
            let db = b - mean_b;
            covariance += da * db;
            variance_a += da * da;
            variance_b += db * db;
        }

        match (variance_a == 0.0, variance_b == 0.0) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.0,
            (false, false) => covariance / (variance_a * variance_b).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    #[test]
    fn buckets_sum_to_one() {
        let frame = solid_frame(8, 8, [200, 40, 90]);
        let histogram = GrayHistogram::from_rgb(&frame);
        let sum: f64 = histogram.buckets().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn buckets_are_non_negative() {
        let frame = solid_frame(4, 4, [1, 2, 3]);
        let histogram = GrayHistogram::from_rgb(&frame);
        assert!(histogram.buckets().iter().all(|&b| b >= 0.0));
    }

    #[test]
    fn solid_frame_fills_single_bucket() {
        // 0.299*100 + 0.587*100 + 0.114*100 = 100
        let frame = solid_frame(4, 4, [100, 100, 100]);
        let histogram = GrayHistogram::from_rgb(&frame);
        assert!((histogram.buckets()[100] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalization_is_size_invariant() {
        let small = GrayHistogram::from_rgb(&solid_frame(2, 2, [50, 50, 50]));
        let large = GrayHistogram::from_rgb(&solid_frame(64, 64, [50, 50, 50]));
        assert!((small.correlation(&large) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn identical_histograms_correlate_perfectly() {
        let frame = solid_frame(8, 8, [10, 200, 30]);
        let a = GrayHistogram::from_rgb(&frame);
        let b = GrayHistogram::from_rgb(&frame);
        assert!((a.correlation(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_histograms_correlate_poorly() {
        let dark = GrayHistogram::from_rgb(&solid_frame(8, 8, [10, 10, 10]));
        let bright = GrayHistogram::from_rgb(&solid_frame(8, 8, [240, 240, 240]));
        // Two single-spike histograms at different buckets: correlation is
        // slightly negative (each spike sits at the other's below-mean level).
        assert!(dark.correlation(&bright) < 0.1);
    }

    #[test]
    fn correlation_is_symmetric() {
        let a = GrayHistogram::from_rgb(&solid_frame(8, 8, [30, 60, 90]));
        let b = GrayHistogram::from_rgb(&solid_frame(8, 8, [90, 60, 30]));
        assert!((a.correlation(&b) - b.correlation(&a)).abs() < 1e-12);
    }

    #[test]
    fn correlation_stays_in_range() {
        let mut counts_a = [0u64; HISTOGRAM_BINS];
        let mut counts_b = [0u64; HISTOGRAM_BINS];
        for i in 0..HISTOGRAM_BINS {
            counts_a[i] = (i as u64) % 7;
            counts_b[i] = (HISTOGRAM_BINS as u64 - i as u64) % 11;
        }
        let a = GrayHistogram::from_counts(&counts_a);
        let b = GrayHistogram::from_counts(&counts_b);
        let score = a.correlation(&b);
        assert!((-1.0..=1.0).contains(&score));
    }

    #[test]
    fn uniform_histograms_are_degenerate_but_equal() {
        let counts = [3u64; HISTOGRAM_BINS];
        let a = GrayHistogram::from_counts(&counts);
        let b = GrayHistogram::from_counts(&counts);
        assert_eq!(a.correlation(&b), 1.0);
    }

    #[test]
    fn uniform_vs_peaked_is_zero() {
        let uniform = GrayHistogram::from_counts(&[1u64; HISTOGRAM_BINS]);
        let mut counts = [0u64; HISTOGRAM_BINS];
        counts[42] = 100;
        let peaked = GrayHistogram::from_counts(&counts);
        assert_eq!(uniform.correlation(&peaked), 0.0);
    }
}
