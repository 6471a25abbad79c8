//! Text recognition backend.
//!
//! Recognition is delegated to the Tesseract CLI. Whatever it returns is
//! treated as a best-effort transcription, never as ground truth; the
//! parser and aggregator downstream are built to absorb its mistakes.

use anyhow::{anyhow, Context, Result};
use image::{ImageBuffer, Luma};
use std::process::Command;
use tempfile::NamedTempFile;

/// A best-effort text recognizer.
///
/// Implementations may return garbage or empty text for any image; only an
/// unrecoverable I/O failure is an error. `Send + Sync` so one instance
/// can serve the whole worker pool.
pub trait Recognize: Send + Sync {
    fn recognize(&self, img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Result<String>;
}

/// Runs the `tesseract` executable on each image.
pub struct TesseractEngine {
    whitelist: String,
}

impl TesseractEngine {
    pub fn new(whitelist: &str) -> Self {
        Self {
            whitelist: whitelist.to_string(),
        }
    }

    /// Checks that the tesseract binary is on PATH. Called once at startup
    /// so a missing install aborts the run instead of failing every frame.
    pub fn probe() -> Result<()> {
        let output = Command::new("tesseract")
            .arg("--version")
            .output()
            .context("tesseract not found on PATH")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("tesseract --version failed: {}", stderr));
        }
        Ok(())
    }
}

impl Recognize for TesseractEngine {
    fn recognize(&self, img: &ImageBuffer<Luma<u8>, Vec<u8>>) -> Result<String> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        let output = Command::new("tesseract")
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("4") // single column of text of variable sizes
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", self.whitelist))
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
