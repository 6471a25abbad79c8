//! Channels connecting the frame feeder, the OCR workers, and the
//! aggregation loop.
//!
//! Frames flow through a bounded channel so decoding cannot race ahead of
//! OCR and buffer the whole video in memory. Readings flow back through an
//! unbounded channel; they are a few strings each.

use image::{ImageBuffer, Luma};
use std::sync::mpsc::{channel, sync_channel, Receiver, Sender, SyncSender};

use crate::ocr::parse::FrameReading;

/// One decoded frame handed to an OCR worker.
pub struct FrameJob {
    /// Frame index in decode order (0-based), for log messages
    pub index: u64,
    pub frame: ImageBuffer<Luma<u8>, Vec<u8>>,
}

/// Creates the bounded frame queue feeding the worker pool.
pub fn frame_queue(depth: usize) -> (SyncSender<FrameJob>, Receiver<FrameJob>) {
    sync_channel(depth)
}

/// Creates the reading queue draining into the aggregator.
pub fn reading_queue() -> (Sender<FrameReading>, Receiver<FrameReading>) {
    channel()
}
