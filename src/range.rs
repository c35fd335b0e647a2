//! Trim range selection and preview playback sync.
//!
//! This module provides [`TrimRange`], the time sub-interval selected for
//! extraction, and [`RangeSelector`], the stateful dual-handle selector that
//! keeps every gesture inside the invariant
//! `0 ≤ start < end ≤ duration` with `end − start ≤ max_span`.
//!
//! The selector is pure state logic with no I/O, so a UI (or a test) can
//! drive it with arbitrary drag sequences and observe deterministic results.
//!
//! # Example
//!
//! ```
//! use clipcap::RangeSelector;
//!
//! // A 45-second source with a 10-second trim cap.
//! let mut selector = RangeSelector::new(45.0, 10.0).unwrap();
//! assert_eq!(selector.range().as_pair(), (0.0, 10.0));
//!
//! // An oversized drag is clamped, never rejected: the moved start handle
//! // keeps its position and the end handle is pushed along.
//! selector.set_range(2.0, 40.0);
//! assert_eq!(selector.range().as_pair(), (2.0, 12.0));
//! ```

use crate::error::ClipError;

/// The inclusive time sub-interval `[start, end]` of a source video selected
/// for extraction, in fractional seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct TrimRange {
    /// Range start in seconds from the beginning of the source.
    pub start: f64,
    /// Range end in seconds from the beginning of the source.
    pub end: f64,
}

impl TrimRange {
    /// Create a range without validation.
    ///
    /// Validation happens where the range meets a source: the selector
    /// clamps, and [`Trimmer::run`](crate::Trimmer::run) rejects a range
    /// that is degenerate or outside the source duration.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The span `end − start` in seconds.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// The range as a `(start, end)` pair.
    pub fn as_pair(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// Number of frames a fixed-fps walk across this range emits:
    /// `ceil(span × fps)`.
    pub fn frame_count(&self, fps: u32) -> u64 {
        (self.span() * f64::from(fps)).ceil() as u64
    }

    /// Check the range against a source duration.
    ///
    /// # Errors
    ///
    /// [`ClipError::InvalidRange`] if the span is zero or negative, the
    /// start is negative, or the end exceeds `duration`.
    pub fn validate(&self, duration: f64) -> Result<(), ClipError> {
        if self.start < 0.0 || self.start >= self.end || self.end > duration {
            return Err(ClipError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Lifecycle state of a [`RangeSelector`].
///
/// `Loaded → Adjusting → (Previewing ⇄ Paused) → Confirmed | Cancelled`.
/// The two terminal states make the selector inert: further gestures are
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// Metadata is loaded and the default range is in place.
    Loaded,
    /// A handle has been moved since load.
    Adjusting,
    /// Preview playback is looping inside the selected range.
    Previewing,
    /// Preview playback is paused.
    Paused,
    /// The range was confirmed and handed to the encoder.
    Confirmed,
    /// The selection was abandoned; no output will be produced.
    Cancelled,
}

/// Dual-handle range selector bound to a preview playback position.
///
/// Tracks the selected [`TrimRange`], re-clamping on every update so the
/// span never exceeds the cap, and owns the preview position so loop
/// containment (wrap from `end` back to `start`) is enforced in one place.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    duration: f64,
    max_span: f64,
    range: TrimRange,
    position: f64,
    state: SelectorState,
}

impl RangeSelector {
    /// Create a selector for a source of the given duration (seconds) with
    /// the given maximum selectable span (seconds).
    ///
    /// The initial range is `[0, min(max_span, duration)]` and the preview
    /// position sits at 0.
    ///
    /// # Errors
    ///
    /// [`ClipError::InvalidRange`] if `duration` or `max_span` is not a
    /// positive finite number.
    pub fn new(duration: f64, max_span: f64) -> Result<Self, ClipError> {
        if !duration.is_finite() || duration <= 0.0 || !max_span.is_finite() || max_span <= 0.0 {
            return Err(ClipError::InvalidRange {
                start: 0.0,
                end: duration,
            });
        }
        Ok(Self {
            duration,
            max_span,
            range: TrimRange::new(0.0, max_span.min(duration)),
            position: 0.0,
            state: SelectorState::Loaded,
        })
    }

    /// The currently selected range.
    pub fn range(&self) -> TrimRange {
        self.range
    }

    /// The preview playback position in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// The selector's lifecycle state.
    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Source duration this selector was created for.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The maximum selectable span in seconds.
    pub fn max_span(&self) -> f64 {
        self.max_span
    }

    /// Update both handles at once, clamping to the invariant.
    ///
    /// The algorithm preserves the moved handle's position rather than
    /// rejecting the gesture:
    ///
    /// 1. Determine which endpoint moved by comparing against the previous
    ///    pair.
    /// 2. If the new span exceeds the cap, push the *unmoved* endpoint:
    ///    start moved → `end = start + max_span`; end moved →
    ///    `start = end − max_span`. When both moved (or neither), the start
    ///    handle is the anchor.
    /// 3. Clamp `start ≥ 0` and `end ≤ duration`.
    ///
    /// The preview position seeks to the new start after every update.
    /// Ignored once the selector is confirmed or cancelled.
    pub fn set_range(&mut self, start: f64, end: f64) {
        if self.is_terminal() {
            return;
        }

        let previous = self.range;
        let start_moved = start != previous.start;
        let end_moved = end != previous.end;

        let (mut start, mut end) = (start, end);

        if end - start > self.max_span {
            if end_moved && !start_moved {
                start = end - self.max_span;
            } else {
                // Start moved, or an ambiguous gesture: anchor on start.
                end = start + self.max_span;
            }
        }

        start = start.max(0.0);
        end = end.min(self.duration);

        // A degenerate pair (start ≥ end) cannot come from handle drags on a
        // positive-duration source, but direct callers can produce one. Grow
        // the span back out from the anchor instead of accepting it.
        if start >= end {
            end = (start + self.max_span).min(self.duration);
            if start >= end {
                start = (end - self.max_span).max(0.0);
            }
        }

        self.range = TrimRange::new(start, end);
        self.position = start;
        self.state = SelectorState::Adjusting;
    }

    /// Move only the start handle. The end handle follows if the span cap
    /// requires it.
    pub fn move_start(&mut self, start: f64) {
        let end = self.range.end;
        self.set_range(start, end);
    }

    /// Move only the end handle. The start handle follows if the span cap
    /// requires it.
    pub fn move_end(&mut self, end: f64) {
        let start = self.range.start;
        self.set_range(start, end);
    }

    /// Start (or resume) preview playback.
    ///
    /// A position outside the selected range snaps to the range start
    /// before playing. Ignored in terminal states.
    pub fn play(&mut self) {
        if self.is_terminal() {
            return;
        }
        if self.position < self.range.start || self.position >= self.range.end {
            self.position = self.range.start;
        }
        self.state = SelectorState::Previewing;
    }

    /// Pause preview playback, keeping the current position.
    pub fn pause(&mut self) {
        if self.state == SelectorState::Previewing {
            self.state = SelectorState::Paused;
        }
    }

    /// Advance the preview clock by `delta` seconds while previewing.
    ///
    /// Returns the resulting position. Playback loops strictly inside
    /// `[start, end]`: a position that reaches `end` wraps back to `start`
    /// and continues. Outside the `Previewing` state this is a no-op.
    pub fn advance(&mut self, delta: f64) -> f64 {
        if self.state != SelectorState::Previewing {
            return self.position;
        }
        self.position += delta.max(0.0);
        if self.position >= self.range.end {
            self.position = self.range.start;
        }
        self.position
    }

    /// Confirm the selection, returning the final range for encoding.
    ///
    /// # Errors
    ///
    /// [`ClipError::InvalidRange`] if the selector is already confirmed or
    /// cancelled (a cancelled selection stays abandoned), or if the span is
    /// somehow zero or negative. The clamping in
    /// [`set_range`](RangeSelector::set_range) makes the latter unreachable
    /// through the public mutation API; the check guards the encoder anyway.
    pub fn confirm(&mut self) -> Result<TrimRange, ClipError> {
        if self.is_terminal() {
            return Err(ClipError::InvalidRange {
                start: self.range.start,
                end: self.range.end,
            });
        }
        self.range.validate(self.duration)?;
        if self.range.span() > self.max_span + f64::EPSILON {
            return Err(ClipError::InvalidRange {
                start: self.range.start,
                end: self.range.end,
            });
        }
        self.state = SelectorState::Confirmed;
        Ok(self.range)
    }

    /// Abandon the selection. The selector becomes inert and no output is
    /// produced.
    pub fn cancel(&mut self) {
        self.state = SelectorState::Cancelled;
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            SelectorState::Confirmed | SelectorState::Cancelled
        )
    }
}
