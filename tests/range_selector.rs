//! Range selector behaviour tests.
//!
//! Pure state logic — no fixtures required.

use clipcap::{ClipError, RangeSelector, SelectorState, TrimRange};

#[test]
fn initial_range_is_zero_to_cap() {
    let selector = RangeSelector::new(45.0, 10.0).expect("selector");
    assert_eq!(selector.range().as_pair(), (0.0, 10.0));
    assert_eq!(selector.state(), SelectorState::Loaded);
    assert_eq!(selector.position(), 0.0);
}

#[test]
fn initial_range_capped_by_short_duration() {
    let selector = RangeSelector::new(6.0, 10.0).expect("selector");
    assert_eq!(selector.range().as_pair(), (0.0, 6.0));
}

#[test]
fn invalid_duration_rejected() {
    assert!(matches!(
        RangeSelector::new(0.0, 10.0),
        Err(ClipError::InvalidRange { .. })
    ));
    assert!(matches!(
        RangeSelector::new(f64::NAN, 10.0),
        Err(ClipError::InvalidRange { .. })
    ));
    assert!(matches!(
        RangeSelector::new(30.0, 0.0),
        Err(ClipError::InvalidRange { .. })
    ));
}

#[test]
fn span_invariant_holds_across_drag_sequences() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");

    // An arbitrary mix of drags, some silly.
    let gestures = [
        (0.0, 10.0),
        (5.0, 10.0),
        (5.0, 55.0),
        (-3.0, 4.0),
        (50.0, 70.0),
        (59.5, 59.9),
        (20.0, 20.0),
        (30.0, 25.0),
    ];

    for (start, end) in gestures {
        selector.set_range(start, end);
        let range = selector.range();
        assert!(range.start >= 0.0, "start {} below 0", range.start);
        assert!(range.start < range.end, "degenerate range {range:?}");
        assert!(range.end <= 60.0, "end {} past duration", range.end);
        assert!(
            range.span() <= 10.0 + f64::EPSILON,
            "span {} over the cap after ({start}, {end})",
            range.span(),
        );
    }
}

#[test]
fn moving_start_pushes_end_preserving_start() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    selector.set_range(20.0, 30.0);

    // Move only the start far earlier: end must follow, not hold.
    selector.move_start(5.0);
    assert_eq!(selector.range().as_pair(), (5.0, 15.0));
}

#[test]
fn moving_end_pushes_start_preserving_end() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    selector.set_range(5.0, 15.0);

    selector.move_end(40.0);
    assert_eq!(selector.range().as_pair(), (30.0, 40.0));
}

#[test]
fn oversized_drag_clamps_from_start_anchor() {
    // 45-second source, both handles moved to a 38-second span.
    let mut selector = RangeSelector::new(45.0, 10.0).expect("selector");
    selector.set_range(2.0, 40.0);
    assert_eq!(selector.range().as_pair(), (2.0, 12.0));
}

#[test]
fn within_cap_drag_is_taken_verbatim() {
    let mut selector = RangeSelector::new(45.0, 10.0).expect("selector");
    selector.set_range(3.0, 9.0);
    assert_eq!(selector.range().as_pair(), (3.0, 9.0));
    assert_eq!(selector.state(), SelectorState::Adjusting);
}

#[test]
fn end_clamped_to_duration() {
    let mut selector = RangeSelector::new(8.0, 10.0).expect("selector");
    selector.move_end(20.0);
    assert_eq!(selector.range().end, 8.0);
}

#[test]
fn range_change_seeks_preview_to_start() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    selector.play();
    selector.advance(4.0);
    assert_eq!(selector.position(), 4.0);

    selector.set_range(20.0, 28.0);
    assert_eq!(selector.position(), 20.0);
}

#[test]
fn preview_loops_back_to_start() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    selector.set_range(5.0, 15.0);
    selector.play();

    // Walk up to just before the end, then step past it.
    let mut position = 0.0;
    for _ in 0..9 {
        position = selector.advance(1.0);
        assert!((5.0..15.0).contains(&position), "escaped range: {position}");
    }
    position = selector.advance(1.5);
    assert_eq!(position, 5.0, "position past end must wrap to start");
}

#[test]
fn play_snaps_outside_position_to_start() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    selector.play();
    selector.advance(3.0);
    selector.pause();
    assert_eq!(selector.state(), SelectorState::Paused);

    // Narrow the range so the paused position falls outside it, then play.
    selector.set_range(30.0, 38.0);
    selector.play();
    assert_eq!(selector.position(), 30.0);
    assert_eq!(selector.state(), SelectorState::Previewing);
}

#[test]
fn advance_is_noop_unless_previewing() {
    let mut selector = RangeSelector::new(60.0, 10.0).expect("selector");
    assert_eq!(selector.advance(2.0), 0.0);
    selector.play();
    selector.pause();
    assert_eq!(selector.advance(2.0), 0.0);
}

#[test]
fn confirm_returns_final_range_and_terminalises() {
    let mut selector = RangeSelector::new(45.0, 10.0).expect("selector");
    selector.set_range(2.0, 40.0);

    let range = selector.confirm().expect("confirm");
    assert_eq!(range.as_pair(), (2.0, 12.0));
    assert_eq!(selector.state(), SelectorState::Confirmed);

    // Further gestures are ignored.
    selector.set_range(0.0, 5.0);
    assert_eq!(selector.range().as_pair(), (2.0, 12.0));
}

#[test]
fn cancel_makes_selector_inert() {
    let mut selector = RangeSelector::new(45.0, 10.0).expect("selector");
    selector.cancel();
    assert_eq!(selector.state(), SelectorState::Cancelled);

    selector.set_range(1.0, 5.0);
    selector.play();
    assert_eq!(selector.range().as_pair(), (0.0, 10.0));
    assert_eq!(selector.state(), SelectorState::Cancelled);
}

#[test]
fn confirm_after_cancel_fails_and_stays_cancelled() {
    let mut selector = RangeSelector::new(45.0, 10.0).expect("selector");
    selector.set_range(2.0, 8.0);
    selector.cancel();

    // A stale confirm must not resurrect the abandoned selection.
    assert!(matches!(
        selector.confirm(),
        Err(ClipError::InvalidRange { .. })
    ));
    assert_eq!(selector.state(), SelectorState::Cancelled);
}

#[test]
fn trim_range_validate_bounds() {
    assert!(TrimRange::new(0.0, 10.0).validate(10.0).is_ok());
    assert!(matches!(
        TrimRange::new(5.0, 5.0).validate(10.0),
        Err(ClipError::InvalidRange { .. })
    ));
    assert!(matches!(
        TrimRange::new(-1.0, 5.0).validate(10.0),
        Err(ClipError::InvalidRange { .. })
    ));
    assert!(matches!(
        TrimRange::new(0.0, 10.5).validate(10.0),
        Err(ClipError::InvalidRange { .. })
    ));
}
