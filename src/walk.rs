//! Fixed-fps frame walk across a trim range.
//!
//! [`FrameWalk`] drives the source through the selected range at a fixed
//! target frame rate: for each integer frame index `i` it computes the exact
//! instant `start + i / fps`, advances the decoder to the frame on screen at
//! that instant, and emits it as an RGB [`image::DynamicImage`] at the
//! source's natural dimensions.
//!
//! Walking by absolute instants (never by accumulating a per-frame delta)
//! avoids floating-point drift across hundreds of frames, and emitting
//! exactly `ceil(span × fps)` frames makes the output duration
//! deterministic regardless of the source's own frame timing. Frames come
//! out in strictly increasing order by construction: each emission only ever
//! moves the decode position forward.
//!
//! # Example
//!
//! ```no_run
//! use clipcap::{ClipSource, FrameWalk, TrimRange};
//!
//! let mut source = ClipSource::open("input.mp4").unwrap();
//! let walk = FrameWalk::new(&mut source, TrimRange::new(5.0, 15.0), 30).unwrap();
//! for frame in walk {
//!     let frame = frame.unwrap();
//!     println!("frame {} at {:.3}s", frame.index, frame.instant);
//! }
//! ```

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{clip::ClipSource, error::ClipError, range::TrimRange, utilities};

/// One frame emitted by a [`FrameWalk`].
#[derive(Debug)]
pub struct WalkedFrame {
    /// Zero-based frame index within the walk.
    pub index: u64,
    /// The absolute source instant this frame represents, in seconds.
    pub instant: f64,
    /// The decoded frame at the source's natural dimensions, RGB8.
    pub image: DynamicImage,
}

/// Iterator performing the fixed-fps frame walk.
///
/// Created by [`FrameWalk::new`]; each call to `next` performs one
/// seek/decode/emit cycle. The walk seeks once, to the nearest keyframe at
/// or before the range start, then decodes strictly forward. For each target
/// instant the emitted frame is the latest decoded frame whose timestamp is
/// at or before that instant — what a player paused there would show. If the
/// stream runs out before the final instant, the last decoded frame is held.
pub struct FrameWalk<'a> {
    source: &'a mut ClipSource,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ScalingContext,
    time_base: Rational,
    stream_index: usize,
    width: u32,
    height: u32,
    start: f64,
    fps: u32,
    total_frames: u64,
    next_index: u64,
    /// Latest decoded frame at or before the current instant.
    current: Option<VideoFrame>,
    /// Next decoded frame, not yet due.
    lookahead: Option<(f64, VideoFrame)>,
    primed: bool,
    flushed: bool,
}

impl<'a> FrameWalk<'a> {
    /// Set up a walk over `range` at `fps` frames per second.
    ///
    /// Seeks the source to the range start and builds a fresh decoder and
    /// RGB converter. The walk owns the source's demuxer position until it
    /// is dropped.
    ///
    /// # Errors
    ///
    /// - [`ClipError::InvalidFps`] if `fps` is zero.
    /// - [`ClipError::InvalidRange`] if the range is degenerate or outside
    ///   the source duration.
    /// - [`ClipError::DecodeError`] / [`ClipError::FfmpegError`] if the
    ///   decoder or converter cannot be constructed.
    pub fn new(
        source: &'a mut ClipSource,
        range: TrimRange,
        fps: u32,
    ) -> Result<Self, ClipError> {
        if fps == 0 {
            return Err(ClipError::InvalidFps(fps));
        }
        range.validate(source.info.duration_seconds())?;

        let total_frames = range.frame_count(fps);
        let stream_index = source.video_stream_index;
        let width = source.info.width;
        let height = source.info.height;

        let stream = source
            .input_context
            .stream(stream_index)
            .ok_or_else(|| ClipError::DecodeError("video stream disappeared".to_string()))?;
        let time_base = stream.time_base();
        let codec_parameters = stream.parameters();
        let decoder_context = CodecContext::from_parameters(codec_parameters)?;
        let decoder = decoder_context.decoder().video()?;

        // Source format → tightly-packed RGB24 at natural dimensions.
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the nearest keyframe at or before the range start; the
        // walk decodes forward from there.
        let start_timestamp = utilities::seconds_to_stream_timestamp(range.start, time_base);
        source.input_context.seek(start_timestamp, ..start_timestamp)?;

        log::debug!(
            "Frame walk over [{:.3}, {:.3}] at {fps} fps: {total_frames} frames",
            range.start,
            range.end,
        );

        Ok(Self {
            source,
            decoder,
            scaler,
            time_base,
            stream_index,
            width,
            height,
            start: range.start,
            fps,
            total_frames,
            next_index: 0,
            current: None,
            lookahead: None,
            primed: false,
            flushed: false,
        })
    }

    /// Total number of frames this walk will emit: `ceil(span × fps)`.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// The walk's target frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Pull the next frame out of the decoder, feeding packets as needed.
    ///
    /// Returns `None` once the stream and the decoder are both drained.
    fn receive_decoded(&mut self) -> Result<Option<VideoFrame>, ClipError> {
        let mut frame = VideoFrame::empty();
        loop {
            if self.decoder.receive_frame(&mut frame).is_ok() {
                return Ok(Some(frame));
            }
            if self.flushed {
                return Ok(None);
            }

            // Need more input: read the next packet for our stream. The
            // borrow of the demuxer must end before feeding the decoder.
            let packet = {
                let mut found = None;
                for (stream, packet) in self.source.input_context.packets() {
                    if stream.index() == self.stream_index {
                        found = Some(packet);
                        break;
                    }
                }
                found
            };

            match packet {
                Some(packet) => self
                    .decoder
                    .send_packet(&packet)
                    .map_err(|e| ClipError::DecodeError(e.to_string()))?,
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|e| ClipError::DecodeError(e.to_string()))?;
                    self.flushed = true;
                }
            }
        }
    }

    fn decoded_with_time(&mut self) -> Result<Option<(f64, VideoFrame)>, ClipError> {
        Ok(self.receive_decoded()?.map(|frame| {
            let pts = frame.pts().unwrap_or(0);
            (utilities::pts_to_seconds(pts, self.time_base), frame)
        }))
    }

    /// Decode the first frame after the seek, regardless of its timestamp.
    ///
    /// A seek can land past the target on sparse-keyframe content; the frame
    /// it lands on is still the best available representation of the range
    /// start.
    fn prime(&mut self) -> Result<(), ClipError> {
        let first = self.decoded_with_time()?;
        self.current = first.map(|(_, frame)| frame);
        self.lookahead = self.decoded_with_time()?;
        self.primed = true;
        Ok(())
    }

    /// Advance decode state so `current` is the latest frame with timestamp
    /// at or before `instant`.
    fn advance_to(&mut self, instant: f64) -> Result<(), ClipError> {
        loop {
            match &self.lookahead {
                Some((time, _)) if *time <= instant => {
                    if let Some((_, frame)) = self.lookahead.take() {
                        self.current = Some(frame);
                    }
                    self.lookahead = self.decoded_with_time()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn emit_current(&mut self, index: u64, instant: f64) -> Result<WalkedFrame, ClipError> {
        let frame = self.current.as_ref().ok_or_else(|| {
            ClipError::DecodeError("no decodable frames in the selected range".to_string())
        })?;

        let mut rgb_frame = VideoFrame::empty();
        self.scaler.run(frame, &mut rgb_frame)?;

        let buffer = utilities::frame_to_rgb_buffer(&rgb_frame, self.width, self.height);
        let rgb_image = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            ClipError::DecodeError(
                "failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;

        Ok(WalkedFrame {
            index,
            instant,
            image: DynamicImage::ImageRgb8(rgb_image),
        })
    }

    fn step(&mut self) -> Result<WalkedFrame, ClipError> {
        if !self.primed {
            self.prime()?;
        }

        let index = self.next_index;
        // Always the absolute start plus an integer frame count over fps —
        // never accumulated addition.
        let instant = self.start + index as f64 / f64::from(self.fps);
        self.advance_to(instant)?;
        let frame = self.emit_current(index, instant)?;
        self.next_index += 1;
        Ok(frame)
    }
}

impl Iterator for FrameWalk<'_> {
    type Item = Result<WalkedFrame, ClipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.total_frames {
            return None;
        }
        let result = self.step();
        if result.is_err() {
            // Fuse the walk after the first failure.
            self.next_index = self.total_frames;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_frames - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}
