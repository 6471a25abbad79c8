//! Frame production from the source video.

pub mod ffmpeg;

pub use ffmpeg::FfmpegFrameSource;

use anyhow::Result;
use image::{ImageBuffer, Luma};

/// A producer of a lazy, finite sequence of grayscale frames.
pub trait FrameSource {
    /// The next frame, or None at end of input.
    fn next_frame(&mut self) -> Result<Option<ImageBuffer<Luma<u8>, Vec<u8>>>>;

    /// Total frame count when the container reports one. Only used for
    /// progress output; may be absent or approximate.
    fn frame_count_hint(&self) -> Option<u64>;
}
