//! The trim operation — frame walk plus encode, as one capture session.
//!
//! [`Trimmer`] is a builder over an open [`ClipSource`]: configure the
//! range, frame rate, codec, progress, and cancellation, then call
//! [`run`](Trimmer::run). One run is one capture session: it owns the walk
//! and the encode session exclusively, hands back a [`TrimmedOutput`] on
//! success, and discards any partial output on error or cancellation.
//!
//! # Example
//!
//! ```no_run
//! use clipcap::{ClipError, ClipSource, TrimRange};
//!
//! let mut source = ClipSource::open("input.mp4")?;
//! let output = source
//!     .trimmer()
//!     .range(TrimRange::new(5.0, 15.0))
//!     .run("clip.mp4")?;
//! assert_eq!(output.duration.as_secs(), 10);
//! # Ok::<(), ClipError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    clip::ClipSource,
    encode::{ClipEncoder, EncoderOptions, VideoCodec},
    error::ClipError,
    progress::{CancellationToken, NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    range::TrimRange,
    walk::FrameWalk,
};

/// Settings for a trim run.
///
/// Carries the encoding knobs plus the optional progress callback and
/// cancellation token, so [`Trimmer::run`] needs no extra parameters.
#[derive(Clone)]
pub struct TrimOptions {
    /// Target frames per second of the output (default: 30).
    pub fps: u32,
    /// Output codec; `Auto` walks the runtime preference order.
    pub codec: VideoCodec,
    /// Constant Rate Factor for quality. Default: 23.
    pub crf: Option<u32>,
    /// Bitrate in bits per second. If set, overrides CRF.
    pub bitrate: Option<usize>,
    /// Progress callback, invoked once per captured frame.
    pub progress: Option<Arc<dyn ProgressCallback>>,
    /// Cooperative cancellation token checked before every frame cycle.
    pub cancellation: Option<CancellationToken>,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            codec: VideoCodec::Auto,
            crf: Some(23),
            bitrate: None,
            progress: None,
            cancellation: None,
        }
    }
}

impl std::fmt::Debug for TrimOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrimOptions")
            .field("fps", &self.fps)
            .field("codec", &self.codec)
            .field("crf", &self.crf)
            .field("bitrate", &self.bitrate)
            .field("progress", &self.progress.is_some())
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl TrimOptions {
    /// Set the output frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the output codec.
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the CRF quality value.
    pub fn with_crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// The result of a successful trim run.
///
/// Produced exactly once per run; the caller owns the output file from here
/// (e.g. to hand it to an upload flow).
#[derive(Debug, Clone)]
#[must_use]
pub struct TrimmedOutput {
    /// Where the clip was written.
    pub path: PathBuf,
    /// Output width — equals the source's natural width.
    pub width: u32,
    /// Output height — equals the source's natural height.
    pub height: u32,
    /// Output duration: `frame_count / fps`, within one frame interval of
    /// the requested span.
    pub duration: Duration,
    /// Number of frames written.
    pub frame_count: u64,
    /// The codec the encoder resolved to.
    pub codec: VideoCodec,
}

/// Builder for trim operations over an open source.
///
/// Obtained via [`ClipSource::trimmer`]. The exclusive borrow of the source
/// guarantees a single capture session per source at a time.
pub struct Trimmer<'a> {
    source: &'a mut ClipSource,
    range: Option<TrimRange>,
    options: TrimOptions,
}

impl<'a> Trimmer<'a> {
    /// Create a trimmer for the given source.
    ///
    /// Without an explicit [`range`](Trimmer::range), the whole source is
    /// re-encoded.
    pub fn new(source: &'a mut ClipSource) -> Self {
        Self {
            source,
            range: None,
            options: TrimOptions::default(),
        }
    }

    /// Set the range to extract.
    pub fn range(mut self, range: TrimRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Replace the full option set.
    pub fn options(mut self, options: TrimOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the output frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.options.fps = fps;
        self
    }

    /// Set the output codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.options.codec = codec;
        self
    }

    /// Run the trim and write the clip to `path`.
    ///
    /// Walks the selected range at the configured fps, encoding each frame
    /// as it is captured. The cancellation token is checked before every
    /// frame's cycle; on cancellation or any failure the partial output file
    /// is removed before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`ClipError::InvalidRange`] for a degenerate or out-of-bounds range.
    /// - [`ClipError::Cancelled`] if the token fired mid-run.
    /// - [`ClipError::DecodeError`] / [`ClipError::EncodingError`] on
    ///   decode or encode failure.
    pub fn run<P: AsRef<Path>>(self, path: P) -> Result<TrimmedOutput, ClipError> {
        let path = path.as_ref();
        let info = self.source.info.clone();

        let range = match self.range {
            Some(range) => range,
            None => TrimRange::new(0.0, info.duration_seconds()),
        };
        range.validate(info.duration_seconds())?;

        log::info!(
            "Trimming {} [{:.3}s, {:.3}s] -> {}",
            self.source.file_path.display(),
            range.start,
            range.end,
            path.display(),
        );

        let cancellation = self.options.cancellation.clone().unwrap_or_default();
        let callback: Arc<dyn ProgressCallback> = self
            .options
            .progress
            .clone()
            .unwrap_or_else(|| Arc::new(NoOpProgress));

        let encoder_options = EncoderOptions {
            fps: self.options.fps,
            codec: self.options.codec,
            crf: self.options.crf,
            bitrate: self.options.bitrate,
        };

        let mut walk = FrameWalk::new(self.source, range, encoder_options.fps)?;
        let total_frames = walk.total_frames();

        let mut session = ClipEncoder::new(encoder_options)
            .start(path, info.width, info.height)
            .inspect_err(|_| {
                // The muxer may have created the file before failing.
                let _ = std::fs::remove_file(path);
            })?;
        let codec = session.codec();

        let mut tracker =
            ProgressTracker::new(callback, OperationType::Encoding, Some(total_frames));

        // One capture cycle per frame: check the flag, walk, encode. The
        // flag comes first so an abandoned run stops before the next
        // seek/decode, not after it.
        loop {
            if cancellation.is_cancelled() {
                log::info!("Trim cancelled after {} frames", session.frames_written());
                session.abort();
                return Err(ClipError::Cancelled);
            }

            let Some(frame) = walk.next() else {
                break;
            };

            let frame = match frame {
                Ok(frame) => frame,
                Err(error) => {
                    session.abort();
                    return Err(error);
                }
            };

            if let Err(error) = session.write_frame(&frame.image) {
                session.abort();
                return Err(error);
            }

            tracker.advance(Some(Duration::from_secs_f64(frame.instant)));
        }

        let frame_count = session.frames_written();
        if let Err(error) = session.finish() {
            let _ = std::fs::remove_file(path);
            return Err(error);
        }
        tracker.finish();

        let duration = Duration::from_secs_f64(frame_count as f64 / f64::from(self.options.fps));

        log::info!(
            "Trim complete: {} frames, {:?} at {}x{}",
            frame_count,
            duration,
            info.width,
            info.height,
        );

        Ok(TrimmedOutput {
            path: path.to_path_buf(),
            width: info.width,
            height: info.height,
            duration,
            frame_count,
            codec,
        })
    }
}
