//! Turns raw recognizer output into structured (tag, value) candidates.
//!
//! The overlay renders each statistic as a tag line followed by a number
//! line. Recognition noise means any line can be wrong, so every adjacent
//! line pair is tested independently: a spurious line costs one candidate,
//! it never desynchronizes the pairs after it.

use anyhow::Result;
use regex::Regex;

use crate::config::CorrectionRules;

/// One (tag, value) pair read from adjacent lines of recognizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub tag: String,
    pub value: u32,
}

/// Everything one frame contributed: the legend name from the first line
/// plus the candidate pairs found below it.
///
/// The name is taken as-is. A garbled name misattributes the whole frame's
/// values; the evidence thresholds downstream are what keep such frames
/// from reaching the final output.
#[derive(Debug, Clone)]
pub struct FrameReading {
    pub entity: String,
    pub candidates: Vec<Candidate>,
}

/// Splits recognized text into lines and extracts candidates, applying the
/// configured correction rules for known recognition errors.
pub struct LineParser {
    rules: CorrectionRules,
    digits: Regex,
}

impl LineParser {
    pub fn new(rules: CorrectionRules) -> Result<Self> {
        Ok(Self {
            digits: Regex::new(r"^[0-9]+$")?,
            rules,
        })
    }

    /// Parses one frame's text. Returns None when no entity name can be
    /// read; that frame then contributes no evidence.
    pub fn parse_reading(&self, text: &str) -> Option<FrameReading> {
        let collapsed = text.replace("\n\n", "\n");
        let lines: Vec<&str> = collapsed.split('\n').map(str::trim).collect();

        let entity = lines.first()?.to_string();
        if entity.is_empty() {
            return None;
        }

        let mut candidates = Vec::new();
        for pair in lines.windows(2) {
            if let Some(value) = self.parse_number(pair[1]) {
                candidates.push(Candidate {
                    tag: self.correct_tag(pair[0]),
                    value,
                });
            }
        }

        Some(FrameReading { entity, candidates })
    }

    /// Parses a token as a number, tolerating known recognition errors.
    /// Returns None for anything that is not a (possibly corrupted) number.
    pub fn parse_number(&self, token: &str) -> Option<u32> {
        for (literal, value) in &self.rules.number_literals {
            if token == literal {
                return Some(*value);
            }
        }

        let mut fixed = token.to_string();
        for (from, to) in &self.rules.digit_substitutions {
            fixed = fixed.replace(*from, &to.to_string());
        }

        if self.digits.is_match(&fixed) {
            return fixed.parse().ok();
        }
        None
    }

    /// Applies the configured tag rewrites, e.g. "Sle Apex Kills" read off
    /// the overlay becomes "S12 Apex Kills".
    pub fn correct_tag(&self, tag: &str) -> String {
        let mut tag = tag.to_string();
        for rule in &self.rules.tag_rules {
            let triggered = tag
                .find(&rule.trigger)
                .is_some_and(|offset| offset > rule.min_offset);
            if triggered {
                for (from, to) in &rule.replacements {
                    tag = tag.replace(from.as_str(), to.as_str());
                }
            }
        }
        tag
    }
}
