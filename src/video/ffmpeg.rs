//! ffmpeg-backed frame source.
//!
//! Decoding stays outside the process: ffprobe reports the stream
//! geometry, then ffmpeg streams raw 8-bit grayscale frames over a pipe,
//! one `width * height` chunk per frame.

use anyhow::{anyhow, bail, Context, Result};
use image::{ImageBuffer, Luma};
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use super::FrameSource;

pub struct FfmpegFrameSource {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frame_count: Option<u64>,
    buf: Vec<u8>,
}

impl FfmpegFrameSource {
    /// Opens the video. Fails when the file is missing or ffprobe/ffmpeg
    /// cannot handle it; that is a configuration error and aborts the run.
    pub fn open(path: &Path) -> Result<Self> {
        let (width, height, frame_count) = probe(path)?;

        let mut child = Command::new("ffmpeg")
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("gray")
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .spawn()
            .context("failed to spawn ffmpeg (is it on PATH?)")?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("ffmpeg stdout not captured"))?;

        Ok(Self {
            child,
            stdout,
            width,
            height,
            frame_count,
            buf: vec![0u8; (width * height) as usize],
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> Result<Option<ImageBuffer<Luma<u8>, Vec<u8>>>> {
        match self.stdout.read_exact(&mut self.buf) {
            Ok(()) => {
                let img = ImageBuffer::from_raw(self.width, self.height, self.buf.clone())
                    .ok_or_else(|| anyhow!("frame buffer size mismatch"))?;
                Ok(Some(img))
            }
            // a clean EOF on a frame boundary ends the sequence
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e).context("failed to read frame from ffmpeg"),
        }
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Runs ffprobe on the first video stream and returns
/// (width, height, frame count when reported).
fn probe(path: &Path) -> Result<(u32, u32, Option<u64>)> {
    if !path.exists() {
        bail!("video not found: {}", path.display());
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames",
            "-of",
            "csv=p=0",
        ])
        .arg(path)
        .output()
        .context("failed to run ffprobe (is it on PATH?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe failed for {}: {}", path.display(), stderr.trim());
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parses ffprobe csv output like "1920,1080,5143". Some containers do
/// not store a frame count and report "N/A"; that only loses the
/// progress total.
fn parse_probe_output(s: &str) -> Result<(u32, u32, Option<u64>)> {
    let line = s.lines().next().unwrap_or("").trim();
    let parts: Vec<&str> = line.split(',').collect();

    if parts.len() < 2 {
        bail!("unexpected ffprobe output: {:?}", line);
    }

    let width = parts[0].parse::<u32>().context("invalid stream width")?;
    let height = parts[1].parse::<u32>().context("invalid stream height")?;
    let frame_count = parts.get(2).and_then(|p| p.parse::<u64>().ok());

    Ok((width, height, frame_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output_with_frame_count() {
        let (w, h, n) = parse_probe_output("1920,1080,5143\n").unwrap();
        assert_eq!((w, h), (1920, 1080));
        assert_eq!(n, Some(5143));
    }

    #[test]
    fn test_parse_probe_output_without_frame_count() {
        let (w, h, n) = parse_probe_output("1920,1080,N/A\n").unwrap();
        assert_eq!((w, h), (1920, 1080));
        assert_eq!(n, None);

        let (w, h, n) = parse_probe_output("1280,720").unwrap();
        assert_eq!((w, h), (1280, 720));
        assert_eq!(n, None);
    }

    #[test]
    fn test_parse_probe_output_garbage_rejected() {
        assert!(parse_probe_output("").is_err());
        assert!(parse_probe_output("no video stream").is_err());
        assert!(parse_probe_output("x,y,z").is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(FfmpegFrameSource::open(Path::new("/no/such/video.mkv")).is_err());
    }
}
