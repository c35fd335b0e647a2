//! Clip encoding — write walked frames into an output video file.
//!
//! This module provides [`ClipEncoder`] and its streaming [`EncodeSession`].
//! Frames are accepted one at a time so a trim run never buffers the whole
//! clip in memory; the session owns the muxer and finalises (or discards)
//! the output file exactly once.
//!
//! Codec selection is a runtime fallback chain, not a per-platform constant:
//! [`VideoCodec::Auto`] walks [`VideoCodec::preference_order`] and picks the
//! first codec whose encoder is actually present in the linked FFmpeg build.

use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel, context::Output};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Dictionary, Packet, Rational};
use image::DynamicImage;

use crate::error::ClipError;

/// Output video codecs, in capability-fallback terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    /// Pick the first available codec from [`VideoCodec::preference_order`].
    #[default]
    Auto,
    /// VP9 (WebM's modern codec).
    Vp9,
    /// H.264 / AVC.
    H264,
    /// MPEG-4 Part 2 — the baseline virtually every FFmpeg build carries.
    Mpeg4,
}

impl VideoCodec {
    /// The ordered preference list evaluated by [`VideoCodec::Auto`]:
    /// modern codec first, degrading to the baseline.
    pub fn preference_order() -> &'static [VideoCodec] {
        &[VideoCodec::Vp9, VideoCodec::H264, VideoCodec::Mpeg4]
    }

    /// The natural container extension for output named after this codec.
    pub fn extension(self) -> &'static str {
        match self {
            VideoCodec::Vp9 => "webm",
            VideoCodec::Auto | VideoCodec::H264 | VideoCodec::Mpeg4 => "mp4",
        }
    }

    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::Auto => Id::None,
            VideoCodec::Vp9 => Id::VP9,
            VideoCodec::H264 => Id::H264,
            VideoCodec::Mpeg4 => Id::MPEG4,
        }
    }

    fn input_pixel_format(self) -> Pixel {
        // All three encoders take YUV420P input.
        Pixel::YUV420P
    }

    /// Is an encoder for this codec present in the linked FFmpeg build?
    pub fn is_available(self) -> bool {
        if self == VideoCodec::Auto {
            return Self::preference_order().iter().any(|c| c.is_available());
        }
        ffmpeg_next::init().is_ok() && ffmpeg_next::encoder::find(self.to_codec_id()).is_some()
    }

    /// Resolve `Auto` against the runtime capability probes.
    ///
    /// # Errors
    ///
    /// [`ClipError::EncodingError`] if no codec in the preference list (or
    /// the explicitly requested codec) has an available encoder.
    pub fn resolve(self) -> Result<VideoCodec, ClipError> {
        match self {
            VideoCodec::Auto => Self::preference_order()
                .iter()
                .copied()
                .find(|codec| codec.is_available())
                .ok_or_else(|| {
                    ClipError::EncodingError(
                        "no supported video encoder available in this FFmpeg build".to_string(),
                    )
                }),
            explicit => {
                if explicit.is_available() {
                    Ok(explicit)
                } else {
                    Err(ClipError::EncodingError(format!(
                        "encoder for {explicit:?} not available in this FFmpeg build"
                    )))
                }
            }
        }
    }
}

/// Options for the clip encoder.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    /// Target frames per second (default: 30).
    pub fps: u32,
    /// Codec to use; `Auto` walks the preference order at runtime.
    pub codec: VideoCodec,
    /// Constant Rate Factor for quality (0-51, lower is better). Default: 23.
    pub crf: Option<u32>,
    /// Bitrate in bits per second. If set, overrides CRF.
    pub bitrate: Option<usize>,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            codec: VideoCodec::Auto,
            crf: Some(23),
            bitrate: None,
        }
    }
}

impl EncoderOptions {
    /// Set the frame rate.
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the codec.
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the CRF quality value.
    pub fn crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Set the target bitrate in bits per second.
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Encodes a stream of frames into a video file.
///
/// Create via [`ClipEncoder::new`], then call [`start`](ClipEncoder::start)
/// to obtain an [`EncodeSession`].
pub struct ClipEncoder {
    options: EncoderOptions,
}

impl ClipEncoder {
    /// Create a new clip encoder with the given options.
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// Open the output file and set up the encoder for frames of the given
    /// dimensions. The container format is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// - [`ClipError::EncodingError`] if no codec is available, the codec
    ///   cannot be opened, or the muxer rejects the stream.
    /// - [`ClipError::InvalidFps`] if the configured fps is zero.
    pub fn start<P: AsRef<Path>>(
        &self,
        path: P,
        width: u32,
        height: u32,
    ) -> Result<EncodeSession, ClipError> {
        let path = path.as_ref();
        if self.options.fps == 0 {
            return Err(ClipError::InvalidFps(self.options.fps));
        }

        let codec = self.options.codec.resolve()?;
        if self.options.codec == VideoCodec::Auto {
            log::info!("Selected {codec:?} from the codec preference order");
        }

        let codec_id = codec.to_codec_id();
        let target_pixel = codec.input_pixel_format();

        let mut output = ffmpeg_next::format::output(&path)
            .map_err(|e| ClipError::EncodingError(format!("cannot open output: {e}")))?;

        // Check if we need a global header before adding the stream (avoids
        // a borrow conflict).
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            ClipError::EncodingError(format!("codec {codec_id:?} not available"))
        })?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| ClipError::EncodingError(format!("cannot add stream: {e}")))?;

        let stream_index = stream.index();

        let mut encoder = {
            let ctx = CodecContext::from_parameters(stream.parameters()).map_err(|e| {
                ClipError::EncodingError(format!("cannot create codec context: {e}"))
            })?;
            ctx.encoder().video().map_err(|e| {
                ClipError::EncodingError(format!("cannot open video encoder: {e}"))
            })?
        };

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(Rational::new(1, self.options.fps as i32));
        encoder.set_frame_rate(Some(Rational::new(self.options.fps as i32, 1)));

        if let Some(bitrate) = self.options.bitrate {
            encoder.set_bit_rate(bitrate);
        }

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        // CRF drives quality when no explicit bitrate is requested. VP9
        // only honours it with a zero bitrate (VBR).
        let mut codec_options = Dictionary::new();
        if let (Some(crf), None) = (self.options.crf, self.options.bitrate) {
            codec_options.set("crf", &crf.to_string());
            if codec == VideoCodec::Vp9 {
                encoder.set_bit_rate(0);
            }
        }

        let opened_encoder = encoder
            .open_as_with(encoder_codec, codec_options)
            .map_err(|e| ClipError::EncodingError(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&opened_encoder);

        output
            .write_header()
            .map_err(|e| ClipError::EncodingError(format!("cannot write header: {e}")))?;

        // RGB24 frames from the walk → encoder input pixel format.
        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| ClipError::EncodingError(format!("cannot create scaler: {e}")))?;

        log::info!(
            "Encoding {}x{} at {} fps to {} ({codec:?})",
            width,
            height,
            self.options.fps,
            path.display(),
        );

        Ok(EncodeSession {
            output,
            encoder: opened_encoder,
            scaler,
            stream_index,
            fps: self.options.fps,
            width,
            height,
            frame_index: 0,
            path: path.to_path_buf(),
            codec,
        })
    }
}

/// One in-flight encode: muxer, encoder, and converter for a single output
/// file.
///
/// Owned exclusively by one trim run at a time. Call
/// [`write_frame`](EncodeSession::write_frame) for each walked frame, then
/// exactly one of [`finish`](EncodeSession::finish) (flush and write the
/// trailer) or [`abort`](EncodeSession::abort) (discard the partial file).
pub struct EncodeSession {
    output: Output,
    encoder: ffmpeg_next::encoder::Video,
    scaler: ScalingContext,
    stream_index: usize,
    fps: u32,
    width: u32,
    height: u32,
    frame_index: i64,
    path: PathBuf,
    codec: VideoCodec,
}

impl EncodeSession {
    /// The codec the session resolved to.
    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frame_index as u64
    }

    /// Encode one RGB frame at the next fixed-fps timestamp.
    ///
    /// The image must match the dimensions the session was started with.
    ///
    /// # Errors
    ///
    /// [`ClipError::EncodingError`] on conversion, encode, or mux failure.
    pub fn write_frame(&mut self, image: &DynamicImage) -> Result<(), ClipError> {
        if image.width() != self.width || image.height() != self.height {
            return Err(ClipError::EncodingError(format!(
                "frame is {}x{}, session expects {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height,
            )));
        }

        let rgb = image.to_rgb8();

        let mut src_frame = VideoFrame::new(Pixel::RGB24, self.width, self.height);
        let stride = src_frame.stride(0);
        let src_data = src_frame.data_mut(0);
        let rgb_bytes = rgb.as_raw();
        let row_len = (self.width as usize) * 3;
        for y in 0..self.height as usize {
            let src_start = y * row_len;
            let dst_start = y * stride;
            src_data[dst_start..dst_start + row_len]
                .copy_from_slice(&rgb_bytes[src_start..src_start + row_len]);
        }

        let mut dst_frame = VideoFrame::empty();
        self.scaler
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| ClipError::EncodingError(format!("scaling failed: {e}")))?;

        dst_frame.set_pts(Some(self.frame_index));
        self.frame_index += 1;

        self.encoder
            .send_frame(&dst_frame)
            .map_err(|e| ClipError::EncodingError(format!("send_frame failed: {e}")))?;

        self.drain_packets()
    }

    /// Flush the encoder, write the container trailer, and close the file.
    ///
    /// # Errors
    ///
    /// [`ClipError::EncodingError`] if the flush or trailer write fails.
    pub fn finish(mut self) -> Result<(), ClipError> {
        self.encoder
            .send_eof()
            .map_err(|e| ClipError::EncodingError(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| ClipError::EncodingError(format!("cannot write trailer: {e}")))?;
        Ok(())
    }

    /// Discard the session and remove the partial output file.
    pub fn abort(self) {
        let path = self.path.clone();
        drop(self);
        if let Err(error) = std::fs::remove_file(&path) {
            log::warn!(
                "Could not remove partial output {}: {error}",
                path.display(),
            );
        }
    }

    /// Receive whatever packets the encoder has ready and mux them.
    fn drain_packets(&mut self) -> Result<(), ClipError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(
                Rational::new(1, self.fps as i32),
                self.output.stream(self.stream_index).unwrap().time_base(),
            );
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| ClipError::EncodingError(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}
