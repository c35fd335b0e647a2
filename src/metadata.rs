//! Source media metadata.
//!
//! This module defines [`SourceInfo`], the metadata structure cached by
//! [`ClipSource::open`](crate::ClipSource::open) and returned by
//! [`MediaProbe::probe`](crate::MediaProbe::probe). It is extracted once when
//! the file is opened, without decoding any frames.

use std::time::Duration;

/// Metadata for a source video file.
///
/// Contains the natural dimensions and duration the trim pipeline operates
/// on, plus codec and container information for diagnostics.
///
/// # Example
///
/// ```no_run
/// use clipcap::MediaProbe;
///
/// let info = MediaProbe::probe("input.mp4").unwrap();
/// println!("{}x{} for {:?}", info.width, info.height, info.duration);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct SourceInfo {
    /// Natural frame width in pixels.
    pub width: u32,
    /// Natural frame height in pixels.
    pub height: u32,
    /// Total duration of the file.
    pub duration: Duration,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Estimated total number of frames, computed from duration and frame rate.
    pub frame_count: u64,
    /// Video codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub container: String,
    /// Size of the file on disk in bytes.
    pub file_size: u64,
}

impl SourceInfo {
    /// The larger of the two pixel dimensions.
    ///
    /// Used by the upload gate's resolution ceiling, which applies to
    /// whichever axis is longest regardless of orientation.
    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Duration in fractional seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}
