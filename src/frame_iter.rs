//! Lazy, pull-based decoded-frame iterator.
//!
//! [`FrameIterator`] implements [`Iterator`] and decodes frames on demand —
//! each call to [`next()`](Iterator::next) reads and decodes just enough
//! packets to produce the next frame as an [`image::RgbImage`]. Frames are
//! yielded strictly in source order; nothing is buffered beyond the decoder's
//! own state.
//!
//! Splitting is a best-effort operation: a mid-stream read or decode failure
//! is treated as end-of-stream (logged as a warning) so the caller can flush
//! what it has and report a partial result.
//!
//! Create a `FrameIterator` via [`VideoSource::frames`].

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::SceneSplitError;
use crate::source::VideoSource;

/// A lazy iterator over all decoded video frames.
///
/// Yields `(frame_number, frame)` pairs, numbering from 0 in decode order.
/// The iterator borrows the underlying [`VideoSource`] mutably; dropping it
/// releases the borrow.
pub struct FrameIterator<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    width: u32,
    height: u32,
    frame_number: u64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl<'a> FrameIterator<'a> {
    pub(crate) fn new(source: &'a mut VideoSource) -> Result<Self, SceneSplitError> {
        let video_stream_index = source.video_stream_index;

        let stream = source
            .input_context
            .stream(video_stream_index)
            .ok_or(SceneSplitError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|e| SceneSplitError::VideoDecodeError(e.to_string()))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|e| SceneSplitError::VideoDecodeError(e.to_string()))?;

        let width = source.info.width;
        let height = source.info.height;

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|e| SceneSplitError::VideoDecodeError(e.to_string()))?;

        Ok(Self {
            source,
            decoder,
            scaler,
            video_stream_index,
            width,
            height,
            frame_number: 0,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Scale and convert the current `decoded_frame` to an `RgbImage`.
    fn convert_current_frame(&mut self) -> Option<RgbImage> {
        if let Err(error) = self.scaler.run(&self.decoded_frame, &mut self.scaled_frame) {
            log::warn!("Frame scaling failed mid-stream, treating as end of stream: {error}");
            return None;
        }

        let buffer = frame_to_rgb_buffer(&self.scaled_frame, self.width, self.height);
        let image = RgbImage::from_raw(self.width, self.height, buffer);
        if image.is_none() {
            log::warn!("Decoded frame buffer has unexpected size, treating as end of stream");
        }
        image
    }
}

impl Iterator for FrameIterator<'_> {
    type Item = (u64, RgbImage);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            // Yield any frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                match self.convert_current_frame() {
                    Some(image) => {
                        let frame_number = self.frame_number;
                        self.frame_number += 1;
                        return Some((frame_number, image));
                    }
                    None => {
                        self.done = true;
                        return None;
                    }
                }
            }

            // Decoder has no buffered frames. Feed it more packets.
            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        // A corrupt packet ends the stream rather than the
                        // whole pass.
                        log::warn!(
                            "Decode failed at frame {}, treating as end of stream: {error}",
                            self.frame_number,
                        );
                        self.done = true;
                        return None;
                    }
                    // Non-video packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    if self.decoder.send_eof().is_err() {
                        self.done = true;
                        return None;
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    log::warn!(
                        "Packet read failed at frame {}, treating as end of stream: {error}",
                        self.frame_number,
                    );
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3); this
/// strips it so the result can be passed to [`image::RgbImage::from_raw`].
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
