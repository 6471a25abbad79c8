//! Scan orchestration.
//!
//! Feeds frames to the worker pool and drains their readings into the one
//! Aggregator. Aggregation happens only on this thread, so occurrence
//! counts are exact no matter how many workers run or in what order
//! frames finish.

use anyhow::{anyhow, Context, Result};
use std::sync::mpsc::TryRecvError;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::ScanConfig;
use crate::ocr::compose;
use crate::ocr::engine::Recognize;
use crate::ocr::parse::LineParser;
use crate::ocr::transfer::TransferFunction;
use crate::scan::queue::{frame_queue, reading_queue, FrameJob};
use crate::scan::worker::{run_scan_worker, ScanContext};
use crate::stats::aggregate::{Aggregator, FrequencyTable};
use crate::video::FrameSource;

/// Outcome of a scan pass over the whole frame sequence.
pub struct ScanReport {
    pub table: FrequencyTable,
    pub frames_read: u64,
    /// Frames whose readings passed the candidate-count gate
    pub frames_accepted: u64,
}

const PROGRESS_INTERVAL: u64 = 200;

/// Runs the full scan: every frame through the worker pool, every reading
/// into the frequency table.
///
/// Only configuration-class problems abort: an unreadable source, invalid
/// transfer points, or a first frame smaller than the layout. A source
/// that fails mid-stream ends the sequence early; whatever was aggregated
/// up to that frame boundary is still returned and resolvable.
pub fn run_scan<S: FrameSource>(
    mut source: S,
    config: &ScanConfig,
    engine: Box<dyn Recognize>,
) -> Result<ScanReport> {
    let ctx = Arc::new(ScanContext {
        layout: config.layout.clone(),
        transfer: TransferFunction::from_points(&config.transfer_points)?,
        parser: LineParser::new(config.corrections.clone())?,
        engine,
    });

    let workers = config.workers.max(1);
    let (job_tx, job_rx) = frame_queue(workers * 2);
    let (reading_tx, reading_rx) = reading_queue();
    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let jobs = Arc::clone(&job_rx);
        let readings = reading_tx.clone();
        let ctx = Arc::clone(&ctx);
        handles.push(thread::spawn(move || run_scan_worker(jobs, readings, ctx)));
    }
    // the aggregation loop ends once every worker has dropped its sender
    drop(reading_tx);

    let total = source.frame_count_hint();
    let mut aggregator = Aggregator::new(config.min_pairs_per_frame);
    let mut frames_read: u64 = 0;
    let mut frames_accepted: u64 = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                crate::log(&format!("frame read failed after {} frames: {}", frames_read, e));
                break;
            }
        };

        if frames_read == 0 {
            let (width, height) = frame.dimensions();
            compose::check_fit(width, height, &config.layout)
                .context("video resolution does not match the configured layout")?;
        }

        job_tx
            .send(FrameJob { index: frames_read, frame })
            .map_err(|_| anyhow!("all OCR workers exited early"))?;
        frames_read += 1;

        if frames_read % PROGRESS_INTERVAL == 0 {
            log_progress(frames_read, total);
        }

        // keep the reading channel drained while feeding
        loop {
            match reading_rx.try_recv() {
                Ok(reading) => {
                    if aggregator.record(&reading) {
                        frames_accepted += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    // no more frames: let the workers drain the queue and finish
    drop(job_tx);
    for reading in reading_rx.iter() {
        if aggregator.record(&reading) {
            frames_accepted += 1;
        }
    }
    for handle in handles {
        let _ = handle.join();
    }

    crate::log(&format!(
        "scan finished: {} frames read, {} accepted",
        frames_read, frames_accepted
    ));

    Ok(ScanReport {
        table: aggregator.into_table(),
        frames_read,
        frames_accepted,
    })
}

fn log_progress(frames_read: u64, total: Option<u64>) {
    match total {
        Some(total) if total > 0 => crate::log(&format!(
            "scanned {}/{} frames ({:.0}%)",
            frames_read,
            total,
            frames_read as f64 / total as f64 * 100.0
        )),
        _ => crate::log(&format!("scanned {} frames", frames_read)),
    }
}
