//! Split-pass behavior tests driven by in-memory frame streams and sinks.
//!
//! No media files are involved: frames are synthesized `RgbImage`s and the
//! sink records the clip lifecycle instead of encoding anything.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::RgbImage;
use scenesplit::{
    CancellationToken, ClipSink, LeadInPolicy, ProgressCallback, ProgressInfo, SceneSplitError,
    SourceInfo, SplitOptions, scan_frames, split_frames,
};

/// A solid frame whose every pixel has luma `value`.
fn solid_frame(value: u8) -> RgbImage {
    RgbImage::from_pixel(8, 8, image::Rgb([value, value, value]))
}

/// Number the frames 0..n in source order.
fn numbered(values: &[u8]) -> Vec<(u64, RgbImage)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as u64, solid_frame(v)))
        .collect()
}

fn test_info(frame_count: u64) -> SourceInfo {
    SourceInfo {
        width: 8,
        height: 8,
        frames_per_second: 10.0,
        frame_count,
        codec: "h264".to_string(),
        duration: Duration::from_secs_f64(frame_count as f64 / 10.0),
        format: "mp4".to_string(),
    }
}

/// Records every sink call; frames are identified by their top-left luma.
#[derive(Default)]
struct RecordingSink {
    /// Closed clips: (clip_number, luma of each written frame).
    clips: Vec<(u32, Vec<u8>)>,
    open: Option<(u32, Vec<u8>)>,
    finish_calls: u32,
    fail_writes: bool,
}

impl ClipSink for RecordingSink {
    fn open_clip(&mut self, clip_number: u32, _w: u32, _h: u32) -> Result<(), SceneSplitError> {
        assert!(self.open.is_none(), "clip {clip_number} opened over an open clip");
        self.open = Some((clip_number, Vec::new()));
        Ok(())
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), SceneSplitError> {
        if self.fail_writes {
            return Err(SceneSplitError::ClipWrite("injected failure".to_string()));
        }
        let (_, frames) = self.open.as_mut().expect("write without open clip");
        frames.push(frame.get_pixel(0, 0)[0]);
        Ok(())
    }

    fn close_clip(&mut self) -> Result<(), SceneSplitError> {
        if let Some(clip) = self.open.take() {
            self.clips.push(clip);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SceneSplitError> {
        self.finish_calls += 1;
        self.close_clip()
    }
}

#[test]
fn uniform_stream_yields_single_clip_by_default() {
    let frames = numbered(&[50; 12]);
    let mut sink = RecordingSink::default();

    let summary = split_frames(frames, &test_info(12), &mut sink, &SplitOptions::new())
        .expect("split should succeed");

    assert_eq!(summary.clips_written, 1);
    assert_eq!(summary.frames_read, 12);
    assert_eq!(summary.frames_written, 12);
    assert!(summary.boundaries.is_empty());
    assert_eq!(sink.clips.len(), 1);
    assert_eq!(sink.clips[0].0, 1);
    assert_eq!(sink.clips[0].1.len(), 12);
    assert_eq!(sink.finish_calls, 1);
}

#[test]
fn uniform_stream_yields_no_clips_under_legacy_policy() {
    let frames = numbered(&[50; 12]);
    let mut sink = RecordingSink::default();
    let options = SplitOptions::new().with_lead_in_policy(LeadInPolicy::OpenOnFirstCut);

    let summary = split_frames(frames, &test_info(12), &mut sink, &options)
        .expect("split should succeed");

    assert_eq!(summary.clips_written, 0);
    assert_eq!(summary.frames_read, 12);
    assert_eq!(summary.frames_written, 0);
    assert!(sink.clips.is_empty());
}

#[test]
fn boundaries_split_stream_at_color_changes() {
    // Three scenes: 4 dark, 4 mid, 4 bright frames.
    let frames = numbered(&[10, 10, 10, 10, 120, 120, 120, 120, 240, 240, 240, 240]);
    let mut sink = RecordingSink::default();

    let summary = split_frames(frames, &test_info(12), &mut sink, &SplitOptions::new())
        .expect("split should succeed");

    assert_eq!(summary.clips_written, 3);
    assert_eq!(summary.frames_written, 12);
    let cut_frames: Vec<u64> = summary.boundaries.iter().map(|b| b.frame_number).collect();
    assert_eq!(cut_frames, vec![4, 8]);

    assert_eq!(sink.clips.len(), 3);
    assert_eq!(sink.clips[0].1, vec![10, 10, 10, 10]);
    assert_eq!(sink.clips[1].1, vec![120, 120, 120, 120]);
    assert_eq!(sink.clips[2].1, vec![240, 240, 240, 240]);
}

#[test]
fn legacy_policy_drops_frames_before_first_cut() {
    // One color change at frame 5: legacy behavior keeps only frames 5..10.
    let frames = numbered(&[10, 10, 10, 10, 10, 200, 200, 200, 200, 200]);
    let mut sink = RecordingSink::default();
    let options = SplitOptions::new()
        .with_threshold(0.6)
        .with_lead_in_policy(LeadInPolicy::OpenOnFirstCut);

    let summary = split_frames(frames, &test_info(10), &mut sink, &options)
        .expect("split should succeed");

    assert_eq!(summary.clips_written, 1);
    assert_eq!(summary.frames_read, 10);
    assert_eq!(summary.frames_written, 5);
    assert_eq!(sink.clips.len(), 1);
    assert_eq!(sink.clips[0].0, 1);
    assert_eq!(sink.clips[0].1, vec![200, 200, 200, 200, 200]);
}

#[test]
fn frame_conservation_holds_under_both_policies() {
    let values = [10, 10, 200, 200, 30, 30, 30, 250];

    for policy in [LeadInPolicy::OpenOnFirstFrame, LeadInPolicy::OpenOnFirstCut] {
        let mut sink = RecordingSink::default();
        let options = SplitOptions::new().with_lead_in_policy(policy);
        let summary = split_frames(numbered(&values), &test_info(8), &mut sink, &options)
            .expect("split should succeed");

        let written: usize = sink.clips.iter().map(|(_, frames)| frames.len()).sum();
        assert_eq!(written as u64, summary.frames_written);
        assert!(summary.frames_written <= summary.frames_read);
        assert_eq!(summary.frames_read, 8);
    }
}

#[test]
fn single_frame_source() {
    // One frame can never trigger a boundary: corrected policy still writes
    // it as clip 1, legacy policy produces nothing.
    let mut sink = RecordingSink::default();
    let summary = split_frames(numbered(&[99]), &test_info(1), &mut sink, &SplitOptions::new())
        .expect("split should succeed");
    assert_eq!(summary.clips_written, 1);
    assert_eq!(summary.frames_written, 1);

    let mut sink = RecordingSink::default();
    let options = SplitOptions::new().with_lead_in_policy(LeadInPolicy::OpenOnFirstCut);
    let summary = split_frames(numbered(&[99]), &test_info(1), &mut sink, &options)
        .expect("split should succeed");
    assert_eq!(summary.clips_written, 0);
    assert_eq!(summary.frames_written, 0);
}

#[test]
fn empty_stream_is_a_successful_zero_clip_pass() {
    let mut sink = RecordingSink::default();
    let summary = split_frames(numbered(&[]), &test_info(0), &mut sink, &SplitOptions::new())
        .expect("split should succeed");
    assert_eq!(summary.clips_written, 0);
    assert_eq!(summary.frames_read, 0);
    assert_eq!(sink.finish_calls, 1);
}

#[test]
fn invalid_threshold_is_rejected() {
    for threshold in [0.0, -0.5, 1.5, f64::NAN] {
        let mut sink = RecordingSink::default();
        let options = SplitOptions::new().with_threshold(threshold);
        let result = split_frames(numbered(&[1, 2]), &test_info(2), &mut sink, &options);
        assert!(matches!(result, Err(SceneSplitError::InvalidThreshold(_))));
    }
}

#[test]
fn write_error_aborts_the_pass_but_still_finishes_the_sink() {
    let mut sink = RecordingSink {
        fail_writes: true,
        ..RecordingSink::default()
    };
    let result = split_frames(
        numbered(&[10, 10, 10]),
        &test_info(3),
        &mut sink,
        &SplitOptions::new(),
    );

    assert!(matches!(result, Err(SceneSplitError::ClipWrite(_))));
    assert_eq!(sink.finish_calls, 1);
    assert!(sink.open.is_none());
}

#[test]
fn cancellation_stops_the_pass_and_closes_the_open_clip() {
    let token = CancellationToken::new();
    let cancel_after = 5u64;

    let trigger = token.clone();
    let frames = numbered(&[42; 20]).into_iter().inspect(move |(n, _)| {
        if *n == cancel_after {
            trigger.cancel();
        }
    });

    let mut sink = RecordingSink::default();
    let options = SplitOptions::new().with_cancellation(token);
    let result = split_frames(frames, &test_info(20), &mut sink, &options);

    assert!(matches!(result, Err(SceneSplitError::Cancelled)));
    assert_eq!(sink.finish_calls, 1);
    assert!(sink.open.is_none());
    // Frames up to the cancellation point made it into the closed clip.
    assert_eq!(sink.clips.len(), 1);
    assert!(!sink.clips[0].1.is_empty());
}

#[test]
fn rerun_produces_identical_clip_numbering() {
    let values = [10, 10, 200, 200, 30, 30];

    let mut first = RecordingSink::default();
    split_frames(numbered(&values), &test_info(6), &mut first, &SplitOptions::new())
        .expect("split should succeed");
    let mut second = RecordingSink::default();
    split_frames(numbered(&values), &test_info(6), &mut second, &SplitOptions::new())
        .expect("split should succeed");

    let numbers_first: Vec<u32> = first.clips.iter().map(|(n, _)| *n).collect();
    let numbers_second: Vec<u32> = second.clips.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers_first, numbers_second);
    assert_eq!(numbers_first, vec![1, 2, 3]);
}

/// Collects progress snapshots for monotonicity checks.
#[derive(Default)]
struct CollectingProgress {
    snapshots: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for CollectingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.snapshots.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_is_monotonic_and_reaches_completion() {
    let progress = Arc::new(CollectingProgress::default());
    let options = SplitOptions::new()
        .with_progress(progress.clone())
        .with_batch_size(1);

    let mut sink = RecordingSink::default();
    split_frames(numbered(&[7; 10]), &test_info(10), &mut sink, &options)
        .expect("split should succeed");

    let snapshots = progress.snapshots.lock().unwrap();
    assert!(!snapshots.is_empty());
    for pair in snapshots.windows(2) {
        assert!(pair[1].current >= pair[0].current);
    }
    let last = snapshots.last().unwrap();
    assert_eq!(last.current, 10);
    assert_eq!(last.percentage, Some(100.0));
}

#[test]
fn scan_reports_boundaries_with_timestamps() {
    // Cuts at frames 3 and 6, 10 fps.
    let frames = numbered(&[10, 10, 10, 200, 200, 200, 30, 30]);
    let boundaries = scan_frames(frames, &test_info(8), &SplitOptions::new())
        .expect("scan should succeed");

    assert_eq!(boundaries.len(), 2);
    assert_eq!(boundaries[0].frame_number, 3);
    assert_eq!(boundaries[0].timestamp, Duration::from_millis(300));
    assert_eq!(boundaries[1].frame_number, 6);
    assert_eq!(boundaries[1].timestamp, Duration::from_millis(600));
    for boundary in &boundaries {
        assert!(boundary.similarity < 0.6);
    }
}

#[test]
fn scan_matches_split_boundaries() {
    let values = [10, 10, 200, 200, 30, 30, 30, 250];

    let scanned = scan_frames(numbered(&values), &test_info(8), &SplitOptions::new())
        .expect("scan should succeed");
    let mut sink = RecordingSink::default();
    let summary = split_frames(numbered(&values), &test_info(8), &mut sink, &SplitOptions::new())
        .expect("split should succeed");

    let scan_frames_at: Vec<u64> = scanned.iter().map(|b| b.frame_number).collect();
    let split_frames_at: Vec<u64> = summary.boundaries.iter().map(|b| b.frame_number).collect();
    assert_eq!(scan_frames_at, split_frames_at);
}
