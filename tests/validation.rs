//! Pre-flight validation report tests.

use std::fs;
use std::time::Duration;

use scenesplit::{SourceInfo, validate_run};
use tempfile::tempdir;

fn healthy_info() -> SourceInfo {
    SourceInfo {
        width: 1920,
        height: 1080,
        frames_per_second: 30.0,
        frame_count: 900,
        codec: "h264".to_string(),
        duration: Duration::from_secs(30),
        format: "mp4".to_string(),
    }
}

#[test]
fn healthy_source_and_directory_pass() {
    let dir = tempdir().expect("create temp dir");
    let report = validate_run(&healthy_info(), 0.6, dir.path());

    assert!(report.is_valid());
    assert!(report.errors.is_empty());
    // Existing-directory note plus the source summary line.
    assert!(report.info.len() >= 2);
}

#[test]
fn missing_output_directory_is_only_informational() {
    let dir = tempdir().expect("create temp dir");
    let target = dir.path().join("not_yet_created");

    let report = validate_run(&healthy_info(), 0.6, &target);
    assert!(report.is_valid());
    assert!(report
        .info
        .iter()
        .any(|line| line.contains("will be created")));
}

#[test]
fn output_path_that_is_a_file_is_an_error() {
    let dir = tempdir().expect("create temp dir");
    let file_path = dir.path().join("occupied");
    fs::write(&file_path, b"not a directory").expect("write file");

    let report = validate_run(&healthy_info(), 0.6, &file_path);
    assert!(!report.is_valid());
    assert!(report
        .errors
        .iter()
        .any(|line| line.contains("not a directory")));
}

#[test]
fn out_of_range_threshold_is_an_error() {
    let dir = tempdir().expect("create temp dir");

    for threshold in [0.0, -1.0, 1.01] {
        let report = validate_run(&healthy_info(), threshold, dir.path());
        assert!(!report.is_valid(), "threshold {threshold} should fail");
    }
}

#[test]
fn zero_dimensions_are_an_error() {
    let dir = tempdir().expect("create temp dir");
    let info = SourceInfo {
        width: 0,
        height: 0,
        ..healthy_info()
    };

    let report = validate_run(&info, 0.6, dir.path());
    assert!(!report.is_valid());
}

#[test]
fn degenerate_metadata_produces_warnings_not_errors() {
    let dir = tempdir().expect("create temp dir");
    let info = SourceInfo {
        frames_per_second: 0.0,
        frame_count: 0,
        duration: Duration::ZERO,
        ..healthy_info()
    };

    let report = validate_run(&info, 0.6, dir.path());
    assert!(report.is_valid());
    assert!(!report.warnings.is_empty());
}

#[test]
fn report_display_lists_every_issue() {
    let dir = tempdir().expect("create temp dir");
    let info = SourceInfo {
        width: 0,
        height: 0,
        ..healthy_info()
    };

    let report = validate_run(&info, 2.0, dir.path());
    let rendered = report.to_string();
    assert!(rendered.contains("[ERROR]"));
    assert!(rendered.contains("[INFO]"));
    assert_eq!(
        rendered.matches("[ERROR]").count(),
        report.errors.len(),
    );
}
