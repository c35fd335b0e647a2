//! Error types for the `clipcap` crate.
//!
//! This module defines [`ClipError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry rich context to aid
//! debugging, including file paths, the specific limit a file violated, and
//! upstream error messages.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `clipcap` operations.
///
/// Every public method that can fail returns `Result<T, ClipError>`.
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipError {
    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::ClipSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file could be opened but cannot be decoded as video.
    ///
    /// Raised by the prober when no decodable video stream is found. The
    /// pipeline must not proceed to range selection or encoding.
    #[error("{} is not a supported video file: {reason}", .path.display())]
    UnsupportedFormat {
        /// Path of the offending file.
        path: PathBuf,
        /// Why the file was refused (missing stream, unknown codec, ...).
        reason: String,
    },

    /// The file failed a pre-admission check in the upload gate.
    ///
    /// The `reason` is a complete, user-displayable sentence naming the file
    /// and the specific limit it violated. Not retryable without a
    /// different file.
    #[error("{reason}")]
    ValidationFailed {
        /// Path of the rejected file.
        path: PathBuf,
        /// Human-readable description of the violated limit.
        reason: String,
    },

    /// A video frame could not be decoded during the frame walk.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// Encoder construction or mid-capture encoding failed.
    ///
    /// Partial output is discarded before this error surfaces.
    #[error("Video encoding error: {0}")]
    EncodingError(String),

    /// A trim range's start is not strictly before its end, or the range
    /// falls outside the source duration.
    ///
    /// The range selector clamps all inputs so this cannot arise from user
    /// gestures; it guards direct API misuse.
    #[error("Invalid trim range: start ({start}s) must be less than end ({end}s)")]
    InvalidRange {
        /// Requested range start in seconds.
        start: f64,
        /// Requested range end in seconds.
        end: f64,
    },

    /// A frame rate of zero was requested.
    #[error("Frame rate must be greater than zero (got {0})")]
    InvalidFps(u32),

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ClipError {
    fn from(error: FfmpegError) -> Self {
        ClipError::FfmpegError(error.to_string())
    }
}
