//! OCR worker: runs the pure per-frame pipeline stages.
//!
//! Each worker pulls frames from the shared queue, runs
//! compose -> normalize -> recognize -> parse, and pushes the resulting
//! reading to the aggregation loop. Workers hold no mutable state, so any
//! number of them can run over frames in any order.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::config::RegionLayout;
use crate::ocr::compose::compose;
use crate::ocr::engine::Recognize;
use crate::ocr::parse::{FrameReading, LineParser};
use crate::ocr::transfer::TransferFunction;
use crate::scan::queue::FrameJob;

/// Shared read-only state for the per-frame stages.
pub struct ScanContext {
    pub layout: RegionLayout,
    pub transfer: TransferFunction,
    pub parser: LineParser,
    pub engine: Box<dyn Recognize>,
}

/// Worker loop. Runs until the frame queue closes or the aggregation side
/// goes away.
///
/// A failed frame (recognizer error, no readable name line) is logged and
/// skipped; it simply contributes no evidence, exactly like a frame that
/// yielded too few candidate pairs.
pub fn run_scan_worker(
    jobs: Arc<Mutex<Receiver<FrameJob>>>,
    readings: Sender<FrameReading>,
    ctx: Arc<ScanContext>,
) {
    loop {
        // hold the lock only while waiting for a job, never while
        // processing one
        let job = {
            let queue = match jobs.lock() {
                Ok(queue) => queue,
                Err(_) => break, // another worker panicked
            };
            queue.recv()
        };

        let job = match job {
            Ok(job) => job,
            Err(_) => break, // queue closed, no more frames
        };

        if let Some(reading) = scan_frame(&job, &ctx) {
            if readings.send(reading).is_err() {
                break;
            }
        }
    }
}

/// Runs one frame through the full per-frame pipeline.
fn scan_frame(job: &FrameJob, ctx: &ScanContext) -> Option<FrameReading> {
    let composite = match compose(&job.frame, &ctx.layout) {
        Ok(img) => img,
        Err(e) => {
            crate::log(&format!("frame {}: {}", job.index, e));
            return None;
        }
    };

    let normalized = ctx.transfer.apply(&composite);

    let text = match ctx.engine.recognize(&normalized) {
        Ok(text) => text,
        Err(e) => {
            crate::log(&format!("frame {}: recognizer failed: {}", job.index, e));
            return None;
        }
    };

    ctx.parser.parse_reading(&text)
}
