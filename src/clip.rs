//! Core [`ClipSource`] implementation.
//!
//! `ClipSource` is the main entry point for the trim pipeline. It opens a
//! video file, extracts and caches [`SourceInfo`], and provides access to a
//! [`Trimmer`](crate::Trimmer) for re-encoding a selected sub-range.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{codec::context::Context as CodecContext, format::context::Input, media::Type};

use crate::{error::ClipError, metadata::SourceInfo, trim::Trimmer};

/// An opened source video, ready for trimming.
///
/// Created via [`ClipSource::open`], this struct holds the demuxer context
/// and cached metadata. The demuxer is owned exclusively by this value and
/// released when it is dropped, on every exit path.
///
/// # Example
///
/// ```no_run
/// use clipcap::{ClipSource, TrimRange};
///
/// let mut source = ClipSource::open("input.mp4").unwrap();
/// println!("Duration: {:?}", source.info().duration);
///
/// let output = source
///     .trimmer()
///     .range(TrimRange::new(5.0, 15.0))
///     .run("clip.mp4")
///     .unwrap();
/// println!("Wrote {:?} ({:?})", output.path, output.duration);
/// ```
pub struct ClipSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata extracted at open time.
    pub(crate) info: SourceInfo,
    /// Index of the best video stream.
    pub(crate) video_stream_index: usize,
    /// Path to the opened media file (kept for error messages).
    pub(crate) file_path: PathBuf,
}

impl Debug for ClipSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClipSource")
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl ClipSource {
    /// Open a video file for trimming.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata. No frames are decoded.
    ///
    /// # Errors
    ///
    /// - [`ClipError::FileOpen`] if the file cannot be opened at all.
    /// - [`ClipError::UnsupportedFormat`] if the file opens but contains no
    ///   decodable video stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clipcap::{ClipError, ClipSource};
    ///
    /// let source = ClipSource::open("video.mp4")?;
    /// # Ok::<(), ClipError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ClipError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening clip source: {}", file_path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| ClipError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let file_size = std::fs::metadata(path)
            .map_err(|error| ClipError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?
            .len();

        // Open the media file.
        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ClipError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        // The trim pipeline requires a video stream; a file without one is
        // not admissible no matter what else it contains.
        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or_else(|| ClipError::UnsupportedFormat {
                path: file_path.clone(),
                reason: "no video stream found".to_string(),
            })?;

        // Extract container-level duration.
        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let container = input_context.format().name().to_string();

        let stream = input_context
            .stream(video_stream_index)
            .ok_or_else(|| ClipError::UnsupportedFormat {
                path: file_path.clone(),
                reason: "video stream vanished during open".to_string(),
            })?;

        let codec_parameters = stream.parameters();
        let decoder_context =
            CodecContext::from_parameters(codec_parameters).map_err(|error| {
                ClipError::UnsupportedFormat {
                    path: file_path.clone(),
                    reason: format!("failed to read video codec parameters: {error}"),
                }
            })?;
        let video_decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| ClipError::UnsupportedFormat {
                    path: file_path.clone(),
                    reason: format!("failed to create video decoder: {error}"),
                })?;

        let width = video_decoder.width();
        let height = video_decoder.height();

        // Compute frames per second from the stream's average frame rate,
        // falling back to the raw rate field.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec_name = video_decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = SourceInfo {
            width,
            height,
            duration,
            frames_per_second,
            frame_count,
            codec: codec_name,
            container,
            file_size,
        };

        log::debug!(
            "Opened {}: {}x{} {:?} ({} bytes)",
            file_path.display(),
            info.width,
            info.height,
            info.duration,
            info.file_size,
        );

        Ok(Self {
            input_context,
            info,
            video_stream_index,
            file_path,
        })
    }

    /// The cached metadata for this source.
    pub fn info(&self) -> &SourceInfo {
        &self.info
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Obtain a [`Trimmer`] for re-encoding a sub-range of this source.
    ///
    /// The trimmer borrows the source exclusively: one capture session at a
    /// time per source, by construction.
    pub fn trimmer(&mut self) -> Trimmer<'_> {
        Trimmer::new(self)
    }
}
