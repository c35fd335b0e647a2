//! Lightweight media file probing.
//!
//! [`MediaProbe`] extracts [`SourceInfo`] from a video file without keeping
//! the demuxer open. This is what the upload gate uses to learn a file's
//! dimensions and duration before admitting it to the trim pipeline, and it
//! is useful on its own for quickly inspecting many files.
//!
//! For trimming, use [`ClipSource::open`](crate::ClipSource::open) instead.

use std::path::Path;

use crate::clip::ClipSource;
use crate::error::ClipError;
use crate::metadata::SourceInfo;

/// Lightweight video file probe.
///
/// Opens the file, extracts metadata, and immediately closes the demuxer.
/// The resulting [`SourceInfo`] is identical to what
/// [`ClipSource::info`](crate::ClipSource::info) returns, but without
/// keeping the file open.
///
/// # Example
///
/// ```no_run
/// use clipcap::MediaProbe;
///
/// let info = MediaProbe::probe("input.mp4")?;
/// println!("Duration: {:?}, codec: {}", info.duration, info.codec);
/// # Ok::<(), clipcap::ClipError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a video file and return its metadata.
    ///
    /// Opens the file, reads the video stream's parameters, and closes the
    /// demuxer. The returned [`SourceInfo`] is owned and fully independent
    /// of any file handle; nothing stays allocated on either the success or
    /// the failure path.
    ///
    /// # Errors
    ///
    /// - [`ClipError::FileOpen`] if the file cannot be opened.
    /// - [`ClipError::UnsupportedFormat`] if it has no decodable video
    ///   stream.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<SourceInfo, ClipError> {
        let source = ClipSource::open(path)?;
        Ok(source.info.clone())
    }

    /// Probe multiple video files and return their metadata.
    ///
    /// Files that cannot be probed produce an `Err` entry in the result
    /// vector rather than aborting the entire batch.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clipcap::MediaProbe;
    ///
    /// for result in MediaProbe::probe_many(&["a.mp4", "b.webm", "c.mov"]) {
    ///     match result {
    ///         Ok(info) => println!("{}x{}", info.width, info.height),
    ///         Err(err) => eprintln!("Error: {err}"),
    ///     }
    /// }
    /// ```
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<SourceInfo, ClipError>> {
        paths.iter().map(|path| Self::probe(path)).collect()
    }
}
