//! The full intake flow: gate, then direct use or range selection.
//!
//! [`TrimPipeline`] ties the pieces together the way an upload surface uses
//! them: a file is checked against [`UploadLimits`]; a file within every
//! limit comes back ready to use, and a file over the duration cap comes
//! back with an initialised [`RangeSelector`] whose span cap equals the
//! gate's duration cap. Rejections surface as errors from the gate.
//!
//! # Example
//!
//! ```no_run
//! use clipcap::{Intake, TrimPipeline, UploadLimits};
//!
//! let pipeline = TrimPipeline::new(UploadLimits::tool_upload());
//! match pipeline.admit("upload.mp4").unwrap() {
//!     Intake::Ready(source) => {
//!         println!("use directly: {:?}", source.info().duration);
//!     }
//!     Intake::NeedsTrim { mut source, mut selector } => {
//!         selector.set_range(2.0, 12.0);
//!         let range = selector.confirm().unwrap();
//!         source.trimmer().range(range).run("clip.mp4").unwrap();
//!     }
//! }
//! ```

use std::path::Path;

use crate::{
    clip::ClipSource,
    error::ClipError,
    gate::{Admission, UploadGate, UploadLimits},
    range::RangeSelector,
};

/// Disposition of an admitted file.
#[derive(Debug)]
#[must_use]
pub enum Intake {
    /// The file is within every limit; no trimming needed.
    Ready(ClipSource),
    /// The file exceeds the duration cap; trim before use.
    NeedsTrim {
        /// The opened source, ready for a [`Trimmer`](crate::Trimmer).
        source: ClipSource,
        /// Selector initialised to `[0, cap]` with the gate's duration cap
        /// as its maximum span.
        selector: RangeSelector,
    },
}

/// Gate-then-select intake pipeline.
#[derive(Debug, Clone)]
pub struct TrimPipeline {
    gate: UploadGate,
}

impl TrimPipeline {
    /// Create a pipeline applying the given limits.
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            gate: UploadGate::new(limits),
        }
    }

    /// The gate this pipeline fronts.
    pub fn gate(&self) -> &UploadGate {
        &self.gate
    }

    /// Admit a file: validate, open, and route.
    ///
    /// # Errors
    ///
    /// Whatever [`UploadGate::check`](crate::UploadGate::check) or
    /// [`ClipSource::open`] returns.
    pub fn admit<P: AsRef<Path>>(&self, path: P) -> Result<Intake, ClipError> {
        let path = path.as_ref();
        match self.gate.check(path)? {
            Admission::Direct(_) => {
                let source = ClipSource::open(path)?;
                Ok(Intake::Ready(source))
            }
            Admission::NeedsTrim(info) => {
                let source = ClipSource::open(path)?;
                let selector = RangeSelector::new(
                    info.duration_seconds(),
                    self.gate.limits().max_duration.as_secs_f64(),
                )?;
                Ok(Intake::NeedsTrim { source, selector })
            }
        }
    }
}
