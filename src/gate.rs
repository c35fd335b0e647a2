//! Upload validation gate.
//!
//! Pre-screens incoming files by container type, file size, and
//! resolution/duration ceilings before they are admitted to the trim
//! pipeline or the direct-use path. Limits are configurable per call site;
//! two presets mirror the common upload contexts.
//!
//! # Example
//!
//! ```no_run
//! use clipcap::{Admission, UploadGate, UploadLimits};
//!
//! let gate = UploadGate::new(UploadLimits::admin_media());
//! match gate.check("upload.mp4") {
//!     Ok(Admission::Direct(info)) => println!("ok as-is ({:?})", info.duration),
//!     Ok(Admission::NeedsTrim(info)) => println!("over the cap, trim first"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use crate::error::ClipError;
use crate::metadata::SourceInfo;
use crate::probe::MediaProbe;

/// Container extensions admitted by default: the mp4/quicktime family plus
/// WebM. Matches the upload surfaces this gate fronts.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm"];

/// Ceilings applied by the [`UploadGate`].
///
/// Build with a preset and adjust with the chained setters:
///
/// ```
/// use std::time::Duration;
/// use clipcap::UploadLimits;
///
/// let limits = UploadLimits::tool_upload().with_max_duration(Duration::from_secs(5));
/// assert_eq!(limits.max_duration, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct UploadLimits {
    /// Maximum file size in bytes. A file of exactly this size is admitted.
    pub max_file_size: u64,
    /// Maximum for the larger pixel dimension. Exceeding it is an outright
    /// rejection — trimming cannot fix resolution.
    pub max_dimension: u32,
    /// Maximum duration admitted without trimming. Longer files are routed
    /// to the trim pipeline, not rejected.
    pub max_duration: Duration,
    /// Admitted file extensions (lowercase, without the dot).
    pub allowed_extensions: Vec<String>,
}

impl UploadLimits {
    /// Preset for admin media uploads: 100 MB, 1920 px, 10 s cap.
    pub fn admin_media() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            max_dimension: 1920,
            max_duration: Duration::from_secs(10),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Preset for lightweight tool uploads: 10 MB, 1920 px, 10 s cap.
    pub fn tool_upload() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            ..Self::admin_media()
        }
    }

    /// Set the file size ceiling in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the pixel dimension ceiling.
    pub fn with_max_dimension(mut self, pixels: u32) -> Self {
        self.max_dimension = pixels;
        self
    }

    /// Set the duration cap above which a file needs trimming.
    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = duration;
        self
    }

    /// Replace the extension allow-list.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        self
    }
}

/// Outcome of a successful gate check.
///
/// A file over the duration cap is not rejected — it is admitted with the
/// trim requirement flagged, carrying the probed metadata either way so the
/// caller does not probe twice.
#[derive(Debug, Clone)]
#[must_use]
pub enum Admission {
    /// The file is within every limit and can be used as-is.
    Direct(SourceInfo),
    /// The file is admissible but exceeds the duration cap; route it to the
    /// range selector and trimmer before use.
    NeedsTrim(SourceInfo),
}

impl Admission {
    /// The probed metadata, regardless of disposition.
    pub fn info(&self) -> &SourceInfo {
        match self {
            Admission::Direct(info) | Admission::NeedsTrim(info) => info,
        }
    }

    /// Whether the file must pass through the trim pipeline before use.
    pub fn needs_trim(&self) -> bool {
        matches!(self, Admission::NeedsTrim(_))
    }
}

/// Pre-admission check applied to any file before it enters the pipeline.
///
/// Checks run cheapest-first: extension, then byte size, then a metadata
/// probe for the dimension and duration ceilings. Every rejection message is
/// a single human-readable string naming the file and the limit violated.
#[derive(Debug, Clone)]
pub struct UploadGate {
    limits: UploadLimits,
}

impl UploadGate {
    /// Create a gate with the given limits.
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    /// The limits this gate applies.
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Check a file against the configured limits.
    ///
    /// # Errors
    ///
    /// - [`ClipError::ValidationFailed`] for a disallowed type, an oversized
    ///   file, or an over-resolution video. The message names the file and
    ///   the specific limit.
    /// - [`ClipError::FileOpen`] / [`ClipError::UnsupportedFormat`] if the
    ///   file cannot be read or probed as video.
    pub fn check<P: AsRef<Path>>(&self, path: P) -> Result<Admission, ClipError> {
        let path = path.as_ref();
        let name = file_name(path);

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        if !self
            .limits
            .allowed_extensions
            .iter()
            .any(|allowed| *allowed == extension)
        {
            return Err(ClipError::ValidationFailed {
                path: path.to_path_buf(),
                reason: format!(
                    "{name}: file type \"{extension}\" is not supported (allowed: {})",
                    self.limits.allowed_extensions.join(", "),
                ),
            });
        }

        let file_size = std::fs::metadata(path)
            .map_err(|error| ClipError::FileOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?
            .len();
        if file_size > self.limits.max_file_size {
            return Err(ClipError::ValidationFailed {
                path: path.to_path_buf(),
                reason: format!(
                    "{name}: file is {file_size} bytes, over the {} byte limit",
                    self.limits.max_file_size,
                ),
            });
        }

        let info = MediaProbe::probe(path)?;

        if info.max_dimension() > self.limits.max_dimension {
            return Err(ClipError::ValidationFailed {
                path: path.to_path_buf(),
                reason: format!(
                    "{name}: resolution {}x{} exceeds the maximum dimension of {} pixels",
                    info.width, info.height, self.limits.max_dimension,
                ),
            });
        }

        if info.duration > self.limits.max_duration {
            log::debug!(
                "{name}: duration {:?} over the {:?} cap, needs trim",
                info.duration,
                self.limits.max_duration,
            );
            return Ok(Admission::NeedsTrim(info));
        }

        Ok(Admission::Direct(info))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
