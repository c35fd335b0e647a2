//! Upload gate integration tests.
//!
//! Boundary checks for type and size run against synthetic files; the
//! resolution/duration checks need real media and are gated on fixture
//! files from `tests/fixtures/generate_fixtures.sh`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use clipcap::{Admission, ClipError, UploadGate, UploadLimits};
use tempfile::TempDir;

fn sample_short_path() -> &'static str {
    // Under 10 seconds, 720p or below.
    "tests/fixtures/sample_short.mp4"
}

fn sample_long_path() -> &'static str {
    // Around 25 seconds, within the resolution ceiling.
    "tests/fixtures/sample_long.mp4"
}

fn sample_4k_path() -> &'static str {
    // Any duration, above 1920 pixels on the long axis.
    "tests/fixtures/sample_4k.mp4"
}

#[test]
fn unsupported_extension_rejected_with_type_message() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"hello").expect("write");

    let gate = UploadGate::new(UploadLimits::admin_media());
    let error = gate.check(&path).expect_err("txt must be rejected");

    match error {
        ClipError::ValidationFailed { reason, .. } => {
            assert!(reason.contains("notes.txt"), "message names the file: {reason}");
            assert!(reason.contains("txt"), "message names the type: {reason}");
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn missing_extension_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("clip");
    fs::write(&path, b"data").expect("write");

    let gate = UploadGate::new(UploadLimits::admin_media());
    assert!(matches!(
        gate.check(&path),
        Err(ClipError::ValidationFailed { .. })
    ));
}

#[test]
fn one_byte_over_size_ceiling_rejected_with_size_message() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("big.mp4");
    let limit = 1024_u64;
    fs::write(&path, vec![0_u8; (limit + 1) as usize]).expect("write");

    let limits = UploadLimits::admin_media().with_max_file_size(limit);
    let error = UploadGate::new(limits)
        .check(&path)
        .expect_err("oversized file must be rejected");

    match error {
        ClipError::ValidationFailed { reason, .. } => {
            assert!(reason.contains("big.mp4"), "message names the file: {reason}");
            assert!(reason.contains("1025"), "message names the size: {reason}");
            assert!(reason.contains("1024"), "message names the limit: {reason}");
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn exactly_at_size_ceiling_passes_the_size_check() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("edge.mp4");
    let limit = 1024_u64;
    fs::write(&path, vec![0_u8; limit as usize]).expect("write");

    let limits = UploadLimits::admin_media().with_max_file_size(limit);
    let error = UploadGate::new(limits)
        .check(&path)
        .expect_err("garbage bytes cannot probe as video");

    // The size check admitted the file; the failure comes from probing the
    // garbage payload, not from the ceiling.
    assert!(
        matches!(
            error,
            ClipError::UnsupportedFormat { .. } | ClipError::FileOpen { .. }
        ),
        "expected a probe failure, got {error:?}",
    );
}

#[test]
fn unreadable_file_surfaces_as_file_open_naming_the_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("missing.mp4");

    let gate = UploadGate::new(UploadLimits::admin_media());
    let error = gate.check(&path).expect_err("missing file must fail");

    match error {
        ClipError::FileOpen { path: reported, .. } => {
            assert_eq!(reported, path, "error must name the offending file");
        }
        other => panic!("expected FileOpen, got {other:?}"),
    }
}

#[test]
fn custom_extension_allow_list_respected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("clip.mkv");
    fs::write(&path, b"data").expect("write");

    // mkv is outside the default allow-list...
    let gate = UploadGate::new(UploadLimits::admin_media());
    assert!(matches!(
        gate.check(&path),
        Err(ClipError::ValidationFailed { .. })
    ));

    // ...but an overridden list admits it as far as the probe.
    let limits = UploadLimits::admin_media().with_allowed_extensions(["mkv"]);
    let error = UploadGate::new(limits).check(&path).expect_err("probe fails");
    assert!(!matches!(error, ClipError::ValidationFailed { .. }));
}

#[test]
fn tool_preset_is_ten_megabytes() {
    let limits = UploadLimits::tool_upload();
    assert_eq!(limits.max_file_size, 10 * 1024 * 1024);
    assert_eq!(limits.max_duration, Duration::from_secs(10));

    let admin = UploadLimits::admin_media();
    assert_eq!(admin.max_file_size, 100 * 1024 * 1024);
}

#[test]
fn short_video_admitted_directly() {
    let path = sample_short_path();
    if !Path::new(path).exists() {
        return;
    }

    let gate = UploadGate::new(UploadLimits::admin_media());
    let admission = gate.check(path).expect("short video should be admitted");

    assert!(
        matches!(admission, Admission::Direct(_)),
        "under-cap video must not be flagged for trim",
    );
}

#[test]
fn long_video_routed_to_trim() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let gate = UploadGate::new(UploadLimits::admin_media());
    let admission = gate.check(path).expect("long video is admissible");

    assert!(admission.needs_trim(), "over-cap video must need trimming");
    assert!(admission.info().duration > Duration::from_secs(10));
}

#[test]
fn video_at_duration_cap_admitted_directly() {
    let path = sample_short_path();
    if !Path::new(path).exists() {
        return;
    }

    // Set the cap to exactly the fixture's duration: at-cap is admitted.
    let info = clipcap::MediaProbe::probe(path).expect("probe");
    let limits = UploadLimits::admin_media().with_max_duration(info.duration);
    let admission = UploadGate::new(limits).check(path).expect("admissible");
    assert!(matches!(admission, Admission::Direct(_)));
}

#[test]
fn over_resolution_rejected_outright() {
    let path = sample_4k_path();
    if !Path::new(path).exists() {
        return;
    }

    let gate = UploadGate::new(UploadLimits::admin_media());
    let error = gate.check(path).expect_err("4k must be rejected");

    match error {
        ClipError::ValidationFailed { reason, .. } => {
            assert!(
                reason.contains("1920"),
                "message names the ceiling: {reason}",
            );
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}
