//! apex-statscan
//!
//! Reads a capture of the career-stats overlay and distills thousands of
//! noisy per-frame OCR readings into one JSON table of per-legend
//! statistics. Individual frames are allowed to be wrong; values only
//! reach the output once enough frames agree on them.

mod config;
mod ocr;
mod scan;
mod stats;
mod video;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use config::ScanConfig;
use ocr::engine::TesseractEngine;
use scan::run_scan;
use stats::{export, resolve};
use video::{FfmpegFrameSource, FrameSource};

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Logs a message to stderr and, once the output location is known, to a
/// log file next to it.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    if let Some(path) = LOG_FILE.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = ScanConfig::load(Path::new(&config_path));
    config.validate()?;

    let _ = LOG_FILE.set(config.out_file.with_extension("log"));

    // fail now, not on frame one
    TesseractEngine::probe()?;

    let source = FfmpegFrameSource::open(&config.video)
        .context(format!("failed to open video: {}", config.video.display()))?;
    let (width, height) = source.dimensions();
    match source.frame_count_hint() {
        Some(total) => log(&format!(
            "scanning {} ({}x{}, {} frames)",
            config.video.display(),
            width,
            height,
            total
        )),
        None => log(&format!(
            "scanning {} ({}x{})",
            config.video.display(),
            width,
            height
        )),
    }

    let engine = Box::new(TesseractEngine::new(&config.chars));
    let report = run_scan(source, &config, engine)?;

    let results = resolve::resolve(&report.table, config.min_evidence, config.keep_empty_entities);
    export::write_results(&results, &config.out_file)?;

    log(&format!("results written to {}", config.out_file.display()));
    for (entity, tags) in &results {
        log(&format!("  {}: {} resolved values", entity, tags.len()));
    }

    Ok(())
}
