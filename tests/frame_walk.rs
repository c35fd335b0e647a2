//! Frame walk tests.
//!
//! The frame-count arithmetic is pure and runs everywhere; actually walking
//! frames needs a fixture from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use clipcap::{ClipError, ClipSource, FrameWalk, TrimRange};

fn sample_long_path() -> &'static str {
    "tests/fixtures/sample_long.mp4"
}

#[test]
fn frame_count_is_ceil_of_span_times_fps() {
    // Exactly 10 seconds at 30 fps.
    assert_eq!(TrimRange::new(5.0, 15.0).frame_count(30), 300);
    // A fractional span rounds up.
    assert_eq!(TrimRange::new(0.0, 0.01).frame_count(30), 1);
    assert_eq!(TrimRange::new(0.0, 1.001).frame_count(30), 31);
    // One frame interval exactly.
    assert_eq!(TrimRange::new(2.0, 2.0 + 1.0 / 30.0).frame_count(30), 1);
    // Different fps.
    assert_eq!(TrimRange::new(0.0, 2.5).frame_count(24), 60);
}

#[test]
fn reported_duration_within_one_frame_interval() {
    for span in [0.5, 1.0, 3.25, 9.97, 10.0] {
        let frames = TrimRange::new(0.0, span).frame_count(30);
        let reported = frames as f64 / 30.0;
        assert!(
            (reported - span).abs() <= 1.0 / 30.0 + f64::EPSILON,
            "span {span}: reported {reported} drifts more than a frame",
        );
    }
}

#[test]
fn zero_fps_refused() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = ClipSource::open(path).expect("open fixture");
    assert!(matches!(
        FrameWalk::new(&mut source, TrimRange::new(0.0, 1.0), 0),
        Err(ClipError::InvalidFps(0))
    ));
}

#[test]
fn degenerate_range_refused() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = ClipSource::open(path).expect("open fixture");
    assert!(matches!(
        FrameWalk::new(&mut source, TrimRange::new(3.0, 3.0), 30),
        Err(ClipError::InvalidRange { .. })
    ));
}

#[test]
fn walk_emits_exactly_total_frames_in_order() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = ClipSource::open(path).expect("open fixture");
    let (width, height) = (source.info().width, source.info().height);

    let walk = FrameWalk::new(&mut source, TrimRange::new(1.0, 3.0), 30).expect("walk");
    assert_eq!(walk.total_frames(), 60);

    let mut emitted = 0_u64;
    let mut last_instant = f64::NEG_INFINITY;
    for frame in walk {
        let frame = frame.expect("decoded frame");
        assert_eq!(frame.index, emitted, "indices must be sequential");
        assert!(
            frame.instant > last_instant,
            "instants must strictly increase",
        );
        assert_eq!(frame.image.width(), width);
        assert_eq!(frame.image.height(), height);
        last_instant = frame.instant;
        emitted += 1;
    }

    assert_eq!(emitted, 60, "walk must emit exactly ceil(span * fps) frames");
}

#[test]
fn walk_instants_are_absolute_not_accumulated() {
    let path = sample_long_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut source = ClipSource::open(path).expect("open fixture");
    let walk = FrameWalk::new(&mut source, TrimRange::new(5.0, 6.0), 30).expect("walk");

    for frame in walk {
        let frame = frame.expect("decoded frame");
        let expected = 5.0 + frame.index as f64 / 30.0;
        assert!(
            (frame.instant - expected).abs() < 1e-9,
            "instant {} for index {} drifted from {expected}",
            frame.instant,
            frame.index,
        );
    }
}
