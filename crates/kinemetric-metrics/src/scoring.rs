//! Scoring engine
//!
//! Rules shared by every rubric:
//! - sub-scores are floored at 0 (and capped at their maximum) before weighting
//! - the composite is clamped to [0, 100]
//! - feedback lists measurement-specific lines first, then one band summary

use serde::{Deserialize, Serialize};

use crate::SubScore;

/// Floor a raw sub-score at 0, mapping non-finite values to 0
#[inline]
pub fn floor_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.max(0.0)
    } else {
        0.0
    }
}

/// Clamp a composite score to [0, 100]
#[inline]
pub fn clamp_composite(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Linear ramp: 0 at `from`, 1 at `to`, clamped
pub fn ramp(value: f64, from: f64, to: f64) -> f64 {
    if to == from {
        return if value >= to { 1.0 } else { 0.0 };
    }
    ((value - from) / (to - from)).clamp(0.0, 1.0)
}

/// Weighted rubric accumulator
#[derive(Debug, Default)]
pub struct ScoreSheet {
    entries: Vec<(SubScore, f64)>,
}

impl ScoreSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component worth up to `max` points, contributing `weight × points`
    pub fn component(&mut self, name: &str, raw: f64, max: f64, weight: f64) -> f64 {
        let value = floor_score(raw).min(max);
        self.entries.push((
            SubScore {
                name: name.to_string(),
                value,
                max,
            },
            weight,
        ));
        value
    }

    /// Weighted sum, clamped to [0, 100]
    pub fn composite(&self) -> f64 {
        clamp_composite(self.entries.iter().map(|(s, w)| s.value * w).sum())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(s, _)| s.name == name)
            .map(|(s, _)| s.value)
    }

    pub fn into_sub_scores(self) -> Vec<SubScore> {
        self.entries.into_iter().map(|(s, _)| s).collect()
    }
}

/// Score band: applies when the composite is above `min`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    /// Whether `min` itself belongs to the band
    pub inclusive: bool,
    pub message: String,
}

impl Band {
    pub fn above(min: f64, message: &str) -> Self {
        Self {
            min,
            inclusive: false,
            message: message.to_string(),
        }
    }

    pub fn at_least(min: f64, message: &str) -> Self {
        Self {
            min,
            inclusive: true,
            message: message.to_string(),
        }
    }

    fn contains(&self, score: f64) -> bool {
        if self.inclusive {
            score >= self.min
        } else {
            score > self.min
        }
    }
}

/// Ordered band table; the first band containing the score wins
pub fn band_message<'a>(score: f64, bands: &'a [Band], otherwise: &'a str) -> &'a str {
    bands
        .iter()
        .find(|b| b.contains(score))
        .map(|b| b.message.as_str())
        .unwrap_or(otherwise)
}

/// Deterministic feedback list
#[derive(Debug, Default)]
pub struct FeedbackBuilder {
    lines: Vec<String>,
}

impl FeedbackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a measurement-specific line when `condition` holds
    pub fn when(&mut self, condition: bool, line: impl Into<String>) -> &mut Self {
        if condition {
            self.lines.push(line.into());
        }
        self
    }

    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Close with the band summary for `score`
    pub fn finish(mut self, score: f64, bands: &[Band], otherwise: &str) -> Vec<String> {
        let summary = band_message(score, bands, otherwise);
        if !summary.is_empty() {
            self.lines.push(summary.to_string());
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_and_clamp() {
        assert_eq!(floor_score(-12.0), 0.0);
        assert_eq!(floor_score(f64::NAN), 0.0);
        assert_eq!(clamp_composite(140.0), 100.0);
        assert_eq!(clamp_composite(-1.0), 0.0);
    }

    #[test]
    fn test_sheet_weights() {
        let mut sheet = ScoreSheet::new();
        sheet.component("a", 100.0, 100.0, 0.4);
        sheet.component("b", -50.0, 100.0, 0.4);
        sheet.component("c", 100.0, 100.0, 0.2);
        assert!((sheet.composite() - 60.0).abs() < 1e-9);
        assert_eq!(sheet.get("b"), Some(0.0));
    }

    #[test]
    fn test_ramp() {
        assert_eq!(ramp(135.0, 135.0, 175.0), 0.0);
        assert_eq!(ramp(155.0, 135.0, 175.0), 0.5);
        assert_eq!(ramp(200.0, 135.0, 175.0), 1.0);
    }

    #[test]
    fn test_band_order() {
        let bands = vec![Band::above(85.0, "great"), Band::at_least(70.0, "ok")];
        assert_eq!(band_message(85.0, &bands, "low"), "ok");
        assert_eq!(band_message(85.5, &bands, "low"), "great");
        assert_eq!(band_message(69.9, &bands, "low"), "low");

        let mut fb = FeedbackBuilder::new();
        fb.when(true, "first").when(false, "skipped");
        assert_eq!(fb.finish(90.0, &bands, "low"), vec!["first", "great"]);
    }
}
