//! Trim run integration tests.
//!
//! Codec preference logic is pure; end-to-end trims require fixture files
//! from `tests/fixtures/generate_fixtures.sh` and an FFmpeg build with at least one of the
//! preferred encoders.

use std::path::Path;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use clipcap::{
    CancellationToken, ClipError, ClipSource, MediaProbe, ProgressCallback, ProgressInfo,
    TrimOptions, TrimRange, VideoCodec,
};
use tempfile::TempDir;

fn sample_long_path() -> &'static str {
    // Around 25 seconds.
    "tests/fixtures/sample_long.mp4"
}

#[test]
fn codec_preference_order_is_modern_first() {
    let order = VideoCodec::preference_order();
    assert_eq!(order.first(), Some(&VideoCodec::Vp9));
    assert_eq!(order.last(), Some(&VideoCodec::Mpeg4));
    assert!(!order.contains(&VideoCodec::Auto));
}

#[test]
fn codec_extensions() {
    assert_eq!(VideoCodec::Vp9.extension(), "webm");
    assert_eq!(VideoCodec::H264.extension(), "mp4");
    assert_eq!(VideoCodec::Mpeg4.extension(), "mp4");
}

#[test]
fn run_rejects_out_of_bounds_range() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    let mut source = ClipSource::open(path).expect("open fixture");
    let duration = source.info().duration_seconds();

    let result = source
        .trimmer()
        .range(TrimRange::new(duration - 1.0, duration + 5.0))
        .run(dir.path().join("clip.mp4"));

    assert!(matches!(result, Err(ClipError::InvalidRange { .. })));
}

#[test]
fn exact_cap_trim_matches_source_dimensions() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    let output_path = dir.path().join("clip.mp4");

    let mut source = ClipSource::open(path).expect("open fixture");
    let (width, height) = (source.info().width, source.info().height);

    let output = source
        .trimmer()
        .range(TrimRange::new(5.0, 15.0))
        .run(&output_path)
        .expect("trim");

    assert_eq!(output.width, width);
    assert_eq!(output.height, height);
    assert_eq!(output.frame_count, 300);
    assert_eq!(output.duration, Duration::from_secs(10));

    // The written file must agree with the reported metadata.
    let probed = MediaProbe::probe(&output_path).expect("probe output");
    assert_eq!(probed.width, width);
    assert_eq!(probed.height, height);
    let written_seconds = probed.duration.as_secs_f64();
    assert!(
        (written_seconds - 10.0).abs() <= 1.0 / 30.0 + 0.1,
        "output duration {written_seconds}s too far from 10s",
    );
}

#[test]
fn progress_reports_every_frame_up_to_total() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    struct Collect {
        seen: Mutex<Vec<u64>>,
    }

    impl ProgressCallback for Collect {
        fn on_progress(&self, info: &ProgressInfo) {
            self.seen.lock().unwrap().push(info.current);
            assert_eq!(info.total, Some(30));
        }
    }

    let dir = TempDir::new().expect("tempdir");
    let collect = Arc::new(Collect {
        seen: Mutex::new(Vec::new()),
    });

    let mut source = ClipSource::open(path).expect("open fixture");
    source
        .trimmer()
        .range(TrimRange::new(2.0, 3.0))
        .options(TrimOptions::default().with_progress(collect.clone()))
        .run(dir.path().join("clip.mp4"))
        .expect("trim");

    let seen = collect.seen.lock().unwrap();
    // One report per frame, plus the unconditional final report.
    assert_eq!(seen.len(), 31);
    assert_eq!(seen.last(), Some(&30));
}

#[test]
fn pre_cancelled_run_produces_no_output() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    let output_path = dir.path().join("clip.mp4");

    let token = CancellationToken::new();
    token.cancel();

    let mut source = ClipSource::open(path).expect("open fixture");
    let result = source
        .trimmer()
        .range(TrimRange::new(0.0, 5.0))
        .options(TrimOptions::default().with_cancellation(token))
        .run(&output_path);

    assert!(matches!(result, Err(ClipError::Cancelled)));
    assert!(!output_path.exists(), "partial output must be removed");
}

#[test]
fn mid_run_cancellation_stops_promptly_and_cleans_up() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    struct CancelAfter {
        frames: AtomicU64,
        token: CancellationToken,
    }

    impl ProgressCallback for CancelAfter {
        fn on_progress(&self, _info: &ProgressInfo) {
            if self.frames.fetch_add(1, Ordering::SeqCst) + 1 == 10 {
                self.token.cancel();
            }
        }
    }

    let dir = TempDir::new().expect("tempdir");
    let output_path = dir.path().join("clip.mp4");

    let token = CancellationToken::new();
    let canceller = Arc::new(CancelAfter {
        frames: AtomicU64::new(0),
        token: token.clone(),
    });

    let mut source = ClipSource::open(path).expect("open fixture");
    let result = source
        .trimmer()
        .range(TrimRange::new(0.0, 10.0))
        .options(
            TrimOptions::default()
                .with_cancellation(token)
                .with_progress(canceller.clone()),
        )
        .run(&output_path);

    assert!(matches!(result, Err(ClipError::Cancelled)));
    assert!(!output_path.exists(), "partial output must be removed");

    // The cycle after the cancel observes the flag; nothing close to the
    // full 300 frames may have been processed.
    let frames = canceller.frames.load(Ordering::SeqCst);
    assert!(
        (10..15).contains(&frames),
        "expected a prompt stop, saw {frames} frames",
    );
}

#[test]
fn output_reports_resolved_codec() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = TempDir::new().expect("tempdir");
    let mut source = ClipSource::open(path).expect("open fixture");
    let output = source
        .trimmer()
        .range(TrimRange::new(0.0, 1.0))
        .run(dir.path().join("clip.mp4"))
        .expect("trim");

    assert_ne!(output.codec, VideoCodec::Auto, "Auto must resolve");
}
