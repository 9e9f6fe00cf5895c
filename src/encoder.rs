//! Clip encoder — encode frames into a video file as they arrive.
//!
//! This module provides [`ClipEncoder`], a streaming encoder used by the
//! split pass. Unlike a batch encoder that takes a finished frame list, a
//! clip grows frame by frame while the pass is still deciding where it ends,
//! so the encoder exposes an open/write/finish lifecycle.
//!
//! The file header is written on creation, packets are interleaved as frames
//! arrive, and the encoder flush plus container trailer happen in
//! [`finish`](ClipEncoder::finish). Dropping an unfinished encoder performs a
//! best-effort flush so a clip file is never left without a trailer on early
//! exits.

use std::path::Path;

use ffmpeg_next::codec::Id;
use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::codec::encoder::video::Encoder as OpenedVideoEncoder;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg_next::{Dictionary, Packet, Rational};
use image::RgbImage;

use crate::error::SceneSplitError;

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// H.264 / AVC.
    H264,
    /// H.265 / HEVC.
    H265,
    /// MPEG-4 Part 2 (for AVI compatibility).
    Mpeg4,
}

impl VideoCodec {
    fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
            VideoCodec::Mpeg4 => Id::MPEG4,
        }
    }

    fn input_pixel_format(self) -> Pixel {
        // All three encoders accept YUV420P input.
        Pixel::YUV420P
    }
}

/// Options for clip encoding.
///
/// Controls the output codec and quality. Resolution and frame rate are not
/// options: each clip is sized to the frame that opened it and inherits the
/// source's nominal frame rate.
#[derive(Debug, Clone)]
pub struct ClipEncoderOptions {
    /// Codec to use. Default is H.264.
    pub codec: VideoCodec,
    /// Constant Rate Factor for quality (0-51, lower is better). Default: 23.
    pub crf: Option<u32>,
    /// Bitrate in bits per second. If set, overrides CRF.
    pub bitrate: Option<usize>,
}

impl Default for ClipEncoderOptions {
    fn default() -> Self {
        Self {
            codec: VideoCodec::H264,
            crf: Some(23),
            bitrate: None,
        }
    }
}

impl ClipEncoderOptions {
    /// Set the codec.
    #[must_use]
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the CRF quality value.
    #[must_use]
    pub fn crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Set the target bitrate in bits per second.
    #[must_use]
    pub fn bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }
}

/// Convert a nominal frame rate to a rational with millihertz precision.
fn fps_to_rational(fps: f64) -> Rational {
    Rational::new((fps * 1000.0).round() as i32, 1000)
}

/// Encodes one clip's frames into a video file.
///
/// Created by [`ClipEncoder::create`], fed with
/// [`write_frame`](ClipEncoder::write_frame), and closed with
/// [`finish`](ClipEncoder::finish).
pub struct ClipEncoder {
    output: Output,
    encoder: OpenedVideoEncoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    width: u32,
    height: u32,
    frame_index: i64,
    finished: bool,
}

impl ClipEncoder {
    /// Create a clip file and write its header.
    ///
    /// The container format is inferred from the file extension. `width` and
    /// `height` fix the clip's dimensions; `fps` is the source's nominal
    /// frame rate.
    ///
    /// # Errors
    ///
    /// - [`SceneSplitError::ClipCreate`] if the output file cannot be opened.
    /// - [`SceneSplitError::ClipEncode`] if the codec is unavailable or the
    ///   encoder cannot be configured.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        fps: f64,
        options: &ClipEncoderOptions,
    ) -> Result<Self, SceneSplitError> {
        let path = path.as_ref();
        log::debug!(
            "Creating clip {:?} ({}x{} @ {:.3} fps, codec={:?})",
            path,
            width,
            height,
            fps,
            options.codec,
        );

        let codec_id = options.codec.to_codec_id();
        let target_pixel = options.codec.input_pixel_format();
        let frame_rate = fps_to_rational(fps);
        let time_base = frame_rate.invert();

        let mut output =
            ffmpeg_next::format::output(path).map_err(|e| SceneSplitError::ClipCreate {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Must be read before add_stream takes the mutable borrow.
        let needs_global_header = output.format().flags().contains(FormatFlags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find(codec_id).ok_or_else(|| {
            SceneSplitError::ClipEncode(format!("codec {codec_id:?} not available"))
        })?;

        let mut stream = output
            .add_stream(encoder_codec)
            .map_err(|e| SceneSplitError::ClipEncode(format!("cannot add stream: {e}")))?;

        let stream_index = stream.index();

        let mut encoder = {
            let ctx = CodecContext::from_parameters(stream.parameters()).map_err(|e| {
                SceneSplitError::ClipEncode(format!("cannot create codec context: {e}"))
            })?;
            ctx.encoder()
                .video()
                .map_err(|e| SceneSplitError::ClipEncode(format!("cannot open video encoder: {e}")))?
        };

        encoder.set_width(width);
        encoder.set_height(height);
        encoder.set_format(target_pixel);
        encoder.set_time_base(time_base);
        encoder.set_frame_rate(Some(frame_rate));

        if let Some(bitrate) = options.bitrate {
            encoder.set_bit_rate(bitrate);
        }

        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let mut encoder_options = Dictionary::new();
        if options.bitrate.is_none()
            && let Some(crf) = options.crf
        {
            encoder_options.set("crf", &crf.to_string());
        }

        let encoder = encoder
            .open_as_with(encoder_codec, encoder_options)
            .map_err(|e| SceneSplitError::ClipEncode(format!("cannot open encoder: {e}")))?;

        stream.set_parameters(&encoder);
        drop(stream);

        output.write_header().map_err(|e| SceneSplitError::ClipCreate {
            path: path.to_path_buf(),
            reason: format!("cannot write header: {e}"),
        })?;

        let scaler = ScalingContext::get(
            Pixel::RGB24,
            width,
            height,
            target_pixel,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| SceneSplitError::ClipEncode(format!("cannot create scaler: {e}")))?;

        Ok(Self {
            output,
            encoder,
            scaler,
            stream_index,
            time_base,
            width,
            height,
            frame_index: 0,
            finished: false,
        })
    }

    /// Append one frame to the clip.
    ///
    /// Frames must match the dimensions the clip was created with.
    ///
    /// # Errors
    ///
    /// [`SceneSplitError::ClipWrite`] on dimension mismatch or encoding/muxing
    /// failure.
    pub fn write_frame(&mut self, frame: &RgbImage) -> Result<(), SceneSplitError> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(SceneSplitError::ClipWrite(format!(
                "frame is {}x{} but clip is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height,
            )));
        }

        // Copy the packed RGB rows into an FFmpeg frame, honouring its stride.
        let mut src_frame = VideoFrame::new(Pixel::RGB24, self.width, self.height);
        let stride = src_frame.stride(0);
        let row_len = (self.width as usize) * 3;
        let src_data = src_frame.data_mut(0);
        let rgb_bytes = frame.as_raw();
        for y in 0..self.height as usize {
            src_data[y * stride..y * stride + row_len]
                .copy_from_slice(&rgb_bytes[y * row_len..(y + 1) * row_len]);
        }

        let mut dst_frame = VideoFrame::empty();
        self.scaler
            .run(&src_frame, &mut dst_frame)
            .map_err(|e| SceneSplitError::ClipWrite(format!("scaling failed: {e}")))?;

        dst_frame.set_pts(Some(self.frame_index));
        self.frame_index += 1;

        self.encoder
            .send_frame(&dst_frame)
            .map_err(|e| SceneSplitError::ClipWrite(format!("send_frame failed: {e}")))?;

        self.drain_packets()
    }

    /// Number of frames written to this clip so far.
    pub fn frames_written(&self) -> u64 {
        self.frame_index as u64
    }

    /// Flush the encoder and write the container trailer.
    ///
    /// # Errors
    ///
    /// [`SceneSplitError::ClipWrite`] if the flush or trailer write fails.
    pub fn finish(mut self) -> Result<(), SceneSplitError> {
        self.finish_inner()
    }

    fn finish_inner(&mut self) -> Result<(), SceneSplitError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        self.encoder
            .send_eof()
            .map_err(|e| SceneSplitError::ClipWrite(format!("send_eof failed: {e}")))?;
        self.drain_packets()?;

        self.output
            .write_trailer()
            .map_err(|e| SceneSplitError::ClipWrite(format!("cannot write trailer: {e}")))?;
        Ok(())
    }

    fn drain_packets(&mut self) -> Result<(), SceneSplitError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            let stream_time_base = self
                .output
                .stream(self.stream_index)
                .map(|s| s.time_base())
                .unwrap_or(self.time_base);
            packet.rescale_ts(self.time_base, stream_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| SceneSplitError::ClipWrite(format!("write packet failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for ClipEncoder {
    fn drop(&mut self) {
        // Best-effort close on early exits; errors are already surfaced on
        // the explicit finish() path.
        if !self.finished
            && let Err(error) = self.finish_inner()
        {
            log::warn!("Clip encoder dropped without finish: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_rational_handles_fractional_rates() {
        let ntsc = fps_to_rational(29.97);
        assert_eq!(ntsc.numerator(), 29970);
        assert_eq!(ntsc.denominator(), 1000);

        let whole = fps_to_rational(30.0);
        assert_eq!(whole.numerator(), 30000);
    }

    #[test]
    fn encoder_options_builder() {
        let options = ClipEncoderOptions::default()
            .codec(VideoCodec::H265)
            .crf(18)
            .bitrate(5_000_000);

        assert_eq!(options.codec, VideoCodec::H265);
        assert_eq!(options.crf, Some(18));
        assert_eq!(options.bitrate, Some(5_000_000));
    }
}
