//! Scan configuration loaded from config.json at startup.
//!
//! Every value that used to be hardcoded for one capture setup lives here:
//! region coordinates, the contrast transfer curve, OCR whitelist, evidence
//! thresholds, and the correction rules for known recognition errors.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A rectangle in absolute pixel coordinates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PixelRect {
    /// X position of the top-left corner
    pub x: u32,
    /// Y position of the top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where the legend name and the stat blocks sit in a frame.
///
/// The stat boxes are listed top-to-bottom as they appear on screen. Their
/// order only encodes display position; which statistic a box holds is
/// decided by the tag text read out of it, not by its index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionLayout {
    pub name_box: PixelRect,
    pub stat_boxes: Vec<PixelRect>,
}

impl RegionLayout {
    /// All rectangles in stacking order: name box first, then stat boxes.
    pub fn rects(&self) -> impl Iterator<Item = &PixelRect> {
        std::iter::once(&self.name_box).chain(self.stat_boxes.iter())
    }
}

impl Default for RegionLayout {
    fn default() -> Self {
        // 1920x1080 capture of the career stats page
        let stat_rows = [278u32, 355, 429, 505, 583, 656, 733, 810];
        Self {
            name_box: PixelRect {
                x: 836,
                y: 57,
                width: 344,
                height: 61,
            },
            stat_boxes: stat_rows
                .iter()
                .map(|&y| PixelRect {
                    x: 590,
                    y,
                    width: 344,
                    height: 61,
                })
                .collect(),
        }
    }
}

/// One tag-correction rule.
///
/// When `trigger` appears in a tag at a byte offset greater than
/// `min_offset`, the replacements are applied in order. These rules are
/// narrow pattern fixes for one source's recognition failures; alternate
/// layouts supply their own set instead of touching parser code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagRule {
    pub trigger: String,
    pub min_offset: usize,
    pub replacements: Vec<(String, String)>,
}

/// Corrections applied while turning recognized lines into tags and numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionRules {
    /// Tokens the recognizer reliably mangles into a known literal value,
    /// e.g. a lone "0" glyph read as "ie".
    pub number_literals: Vec<(String, u32)>,
    /// Character substitutions applied before numeric validation,
    /// e.g. "9" read as "g".
    pub digit_substitutions: Vec<(char, char)>,
    pub tag_rules: Vec<TagRule>,
}

impl Default for CorrectionRules {
    fn default() -> Self {
        Self {
            number_literals: vec![("ie".to_string(), 0)],
            digit_substitutions: vec![('g', '9')],
            tag_rules: vec![TagRule {
                trigger: "Apex".to_string(),
                min_offset: 2,
                replacements: vec![
                    ("Sl".to_string(), "S1".to_string()),
                    ("S1e".to_string(), "S12".to_string()),
                ],
            }],
        }
    }
}

/// Complete scan configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Source video path
    pub video: PathBuf,
    /// Output JSON path
    pub out_file: PathBuf,
    /// Characters the recognizer is allowed to produce. Adding punctuation
    /// like ":'-" can help some labels but tends to garble normal text.
    pub chars: String,
    pub layout: RegionLayout,
    /// Control points of the piecewise-linear contrast curve, sorted by
    /// input intensity
    pub transfer_points: Vec<(u8, u8)>,
    /// A frame must yield at least this many (tag, value) pairs to count
    pub min_pairs_per_frame: usize,
    /// A tag's winning value must occur at least this often to be reported
    pub min_evidence: u32,
    pub corrections: CorrectionRules,
    /// Keep legends whose tags all failed the evidence threshold as empty
    /// entries in the output instead of dropping them
    pub keep_empty_entities: bool,
    /// OCR worker thread count; 1 processes frames strictly in order
    pub workers: usize,
}

fn default_chars() -> String {
    let mut chars: String = ('a'..='z').chain('A'..='Z').chain('0'..='9').collect();
    chars.push(' ');
    chars
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            video: PathBuf::from("example/example.mkv"),
            out_file: PathBuf::from("example/out.json"),
            chars: default_chars(),
            layout: RegionLayout::default(),
            transfer_points: vec![(0, 0), (87, 9), (182, 237), (255, 255)],
            min_pairs_per_frame: 3,
            min_evidence: 3,
            corrections: CorrectionRules::default(),
            keep_empty_entities: true,
            workers: 2,
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the given path or returns defaults.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(config) => {
                        crate::log(&format!("Config loaded from {}", path.display()));
                        return config;
                    }
                    Err(e) => {
                        crate::log(&format!(
                            "Failed to parse {}: {}. Using defaults.",
                            path.display(),
                            e
                        ));
                    }
                },
                Err(e) => {
                    crate::log(&format!(
                        "Failed to read {}: {}. Using defaults.",
                        path.display(),
                        e
                    ));
                }
            }
        } else {
            crate::log(&format!(
                "{} not found. Using default config.",
                path.display()
            ));
        }

        ScanConfig::default()
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chars.is_empty() {
            bail!("chars whitelist is empty");
        }
        if self.layout.stat_boxes.is_empty() {
            bail!("layout has no stat boxes");
        }
        for rect in self.layout.rects() {
            if rect.width == 0 || rect.height == 0 {
                bail!("layout rectangle at ({}, {}) has zero size", rect.x, rect.y);
            }
        }
        // vertical stacking needs a single column width
        let width = self.layout.name_box.width;
        if self.layout.rects().any(|r| r.width != width) {
            bail!("layout rectangles must all share one width");
        }
        if self.transfer_points.windows(2).any(|w| w[0].0 > w[1].0) {
            bail!("transfer points must be sorted by input intensity");
        }
        if self.min_pairs_per_frame < 1 {
            bail!("min_pairs_per_frame must be at least 1");
        }
        if self.min_evidence < 1 {
            bail!("min_evidence must be at least 1");
        }
        if self.workers < 1 {
            bail!("workers must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        ScanConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_chars_whitelist() {
        let chars = default_chars();
        assert!(chars.contains('a'));
        assert!(chars.contains('Z'));
        assert!(chars.contains('0'));
        assert!(chars.ends_with(' '));
        assert_eq!(chars.len(), 26 + 26 + 10 + 1);
    }

    #[test]
    fn test_validate_rejects_mixed_widths() {
        let mut config = ScanConfig::default();
        config.layout.stat_boxes[0].width = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unsorted_transfer_points() {
        let mut config = ScanConfig::default();
        config.transfer_points = vec![(0, 0), (182, 237), (87, 9), (255, 255)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = ScanConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_roundtrip_through_json() {
        let config = ScanConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.layout.stat_boxes.len(), 8);
        assert_eq!(parsed.transfer_points, config.transfer_points);
        assert_eq!(parsed.min_pairs_per_frame, 3);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: ScanConfig =
            serde_json::from_str(r#"{"video": "match.mkv", "workers": 4}"#).unwrap();
        assert_eq!(parsed.video, PathBuf::from("match.mkv"));
        assert_eq!(parsed.workers, 4);
        assert_eq!(parsed.min_evidence, 3);
        assert_eq!(parsed.layout.stat_boxes.len(), 8);
    }
}
