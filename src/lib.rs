//! # clipcap
//!
//! Bounded video trimming — validate, cap, and re-encode fixed-length clips
//! from larger videos.
//!
//! `clipcap` implements a complete intake pipeline for user-supplied video:
//! a configurable **upload gate** (type, size, resolution, and duration
//! ceilings), a clamping **range selector** whose selection can never exceed
//! a maximum span, and a **frame-exact re-encoder** that walks the selected
//! range at a fixed frame rate and writes a compact clip at the source's
//! natural dimensions. Powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Trim a sub-range
//!
//! ```no_run
//! use clipcap::{ClipSource, TrimRange};
//!
//! let mut source = ClipSource::open("input.mp4").unwrap();
//! let output = source
//!     .trimmer()
//!     .range(TrimRange::new(5.0, 15.0))
//!     .run("clip.mp4")
//!     .unwrap();
//! println!("{}x{} for {:?}", output.width, output.height, output.duration);
//! ```
//!
//! ### Gate an upload
//!
//! ```no_run
//! use clipcap::{Admission, UploadGate, UploadLimits};
//!
//! let gate = UploadGate::new(UploadLimits::admin_media());
//! match gate.check("upload.mov") {
//!     Ok(Admission::Direct(_)) => println!("within every limit"),
//!     Ok(Admission::NeedsTrim(info)) => {
//!         println!("{:?} is over the cap — trim first", info.duration)
//!     }
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! ### Select a capped range
//!
//! ```
//! use clipcap::RangeSelector;
//!
//! let mut selector = RangeSelector::new(45.0, 10.0).unwrap();
//! selector.set_range(2.0, 40.0); // clamped, never rejected
//! assert_eq!(selector.range().as_pair(), (2.0, 12.0));
//! ```
//!
//! ## Features
//!
//! - **Metadata probing** — dimensions, duration, frame rate, codec, and
//!   container read without decoding a single frame
//! - **Upload gate** — per-call-site ceilings with human-readable rejection
//!   messages naming the file and the violated limit; over-long files are
//!   routed to trimming instead of rejected
//! - **Range selection** — dual-handle updates that preserve the moved
//!   handle and push its partner to honour the span cap; preview playback
//!   looping strictly inside the selection
//! - **Frame-exact re-encoding** — deterministic `ceil(span × fps)` frame
//!   walk computed from absolute instants, immune to floating-point drift
//! - **Codec fallback** — an ordered preference list (VP9, H.264, MPEG-4)
//!   probed against the linked FFmpeg build at runtime
//! - **Progress & cancellation** — per-frame callbacks and a cooperative
//!   [`CancellationToken`]; a cancelled run discards its partial output
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod clip;
pub mod encode;
pub mod error;
pub mod ffmpeg;
pub mod gate;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod range;
pub mod trim;
mod utilities;
pub mod walk;

pub use clip::ClipSource;
pub use encode::{ClipEncoder, EncodeSession, EncoderOptions, VideoCodec};
pub use error::ClipError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use gate::{Admission, DEFAULT_ALLOWED_EXTENSIONS, UploadGate, UploadLimits};
pub use metadata::SourceInfo;
pub use pipeline::{Intake, TrimPipeline};
pub use probe::MediaProbe;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use range::{RangeSelector, SelectorState, TrimRange};
pub use trim::{TrimOptions, TrimmedOutput, Trimmer};
pub use walk::{FrameWalk, WalkedFrame};
