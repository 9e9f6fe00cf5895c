//! Progress callback and cancellation token tests.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::RgbImage;
use scenesplit::{
    CancellationToken, OperationType, ProgressCallback, ProgressInfo, SceneSplitError, SourceInfo,
    SplitOptions, scan_frames,
};

fn frames(n: u64) -> Vec<(u64, RgbImage)> {
    (0..n)
        .map(|i| (i, RgbImage::from_pixel(4, 4, image::Rgb([128, 128, 128]))))
        .collect()
}

fn info(frame_count: u64) -> SourceInfo {
    SourceInfo {
        width: 4,
        height: 4,
        frames_per_second: 25.0,
        frame_count,
        codec: "h264".to_string(),
        duration: Duration::from_secs_f64(frame_count as f64 / 25.0),
        format: "mp4".to_string(),
    }
}

#[derive(Default)]
struct Recorder {
    snapshots: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for Recorder {
    fn on_progress(&self, info: &ProgressInfo) {
        self.snapshots.lock().unwrap().push(info.clone());
    }
}

#[test]
fn cancellation_token_is_shared_between_clones() {
    let token = CancellationToken::new();
    let clone = token.clone();

    assert!(!token.is_cancelled());
    assert!(!clone.is_cancelled());

    clone.cancel();
    assert!(token.is_cancelled());
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_is_visible_across_threads() {
    let token = CancellationToken::new();
    let worker_token = token.clone();

    let handle = thread::spawn(move || {
        while !worker_token.is_cancelled() {
            thread::yield_now();
        }
        true
    });

    token.cancel();
    assert!(handle.join().unwrap());
}

#[test]
fn scan_reports_operation_type_and_totals() {
    let recorder = Arc::new(Recorder::default());
    let options = SplitOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(1);

    scan_frames(frames(6), &info(6), &options).expect("scan should succeed");

    let snapshots = recorder.snapshots.lock().unwrap();
    assert!(!snapshots.is_empty());
    for snapshot in snapshots.iter() {
        assert_eq!(snapshot.operation, OperationType::BoundaryScan);
        assert_eq!(snapshot.total, Some(6));
        assert!(snapshot.current <= 6);
    }
    assert_eq!(snapshots.last().unwrap().current, 6);
}

#[test]
fn batch_size_throttles_callback_cadence() {
    let every_frame = Arc::new(Recorder::default());
    scan_frames(
        frames(20),
        &info(20),
        &SplitOptions::new()
            .with_progress(every_frame.clone())
            .with_batch_size(1),
    )
    .expect("scan should succeed");

    let batched = Arc::new(Recorder::default());
    scan_frames(
        frames(20),
        &info(20),
        &SplitOptions::new()
            .with_progress(batched.clone())
            .with_batch_size(10),
    )
    .expect("scan should succeed");

    let fine = every_frame.snapshots.lock().unwrap().len();
    let coarse = batched.snapshots.lock().unwrap().len();
    assert!(coarse < fine);
    // 20 frames at batch 10 → reports at 10, 20, plus the final report.
    assert_eq!(coarse, 3);
}

#[test]
fn unknown_total_leaves_percentage_unset() {
    let recorder = Arc::new(Recorder::default());
    let options = SplitOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(1);

    // frame_count 0 models a container that reports no usable duration.
    scan_frames(frames(4), &info(0), &options).expect("scan should succeed");

    let snapshots = recorder.snapshots.lock().unwrap();
    assert!(!snapshots.is_empty());
    for snapshot in snapshots.iter() {
        assert_eq!(snapshot.total, None);
        assert_eq!(snapshot.percentage, None);
        assert_eq!(snapshot.estimated_remaining, None);
    }
}

#[test]
fn cancelled_scan_returns_cancelled_error() {
    let token = CancellationToken::new();
    token.cancel();

    let options = SplitOptions::new().with_cancellation(token);
    let result = scan_frames(frames(10), &info(10), &options);
    assert!(matches!(result, Err(SceneSplitError::Cancelled)));
}
