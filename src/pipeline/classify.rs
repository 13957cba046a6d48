//! Verdict classification.
//!
//! Two classifiers run over the verdict text:
//!
//! * [`RiskGlyph`] — the two-valued display indicator. It only looks for the
//!   substring `HIGH RISK` (any case); everything else, `SUSPICIOUS`
//!   included, shows the verified glyph.
//! * [`VerdictLabel`] — a tolerant three-way extraction with an `Unknown`
//!   fallback for text that names no label. When several labels appear the
//!   most severe one wins.

use crate::prompts::VERDICT_LABELS;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels in `VERDICT_LABELS` order, most severe first.
const BY_SEVERITY: [VerdictLabel; 3] = [
    VerdictLabel::HighRisk,
    VerdictLabel::Suspicious,
    VerdictLabel::Safe,
];

/// One capture group per prompt label, whole words, any case. Multi-word
/// labels also match with `-`, `_` or repeated whitespace between words.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    let groups: Vec<String> = VERDICT_LABELS
        .iter()
        .map(|label| {
            let words: Vec<String> = label.split(' ').map(regex::escape).collect();
            format!("({})", words.join(r"[\s_-]+"))
        })
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", groups.join("|"))).unwrap()
});

/// The display indicator shown next to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskGlyph {
    HighRisk,
    Verified,
}

impl RiskGlyph {
    /// Case-insensitive substring test for `HIGH RISK`.
    pub fn from_verdict(text: &str) -> Self {
        if text.to_uppercase().contains(VerdictLabel::HighRisk.as_str()) {
            RiskGlyph::HighRisk
        } else {
            RiskGlyph::Verified
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            RiskGlyph::HighRisk => "🔴",
            RiskGlyph::Verified => "🟢",
        }
    }

    pub fn is_high_risk(self) -> bool {
        self == RiskGlyph::HighRisk
    }
}

impl fmt::Display for RiskGlyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskGlyph::HighRisk => write!(f, "{} High Risk", self.glyph()),
            RiskGlyph::Verified => write!(f, "{} Verified", self.glyph()),
        }
    }
}

/// The verdict label named in the text, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictLabel {
    /// No label found: needs human review.
    Unknown,
    Safe,
    Suspicious,
    HighRisk,
}

impl VerdictLabel {
    /// Extract the most severe label mentioned, or `Unknown`.
    pub fn extract(text: &str) -> Self {
        LABEL_RE
            .captures_iter(text)
            .filter_map(|caps| {
                (1..caps.len())
                    .find(|&i| caps.get(i).is_some())
                    .map(|i| BY_SEVERITY[i - 1])
            })
            .max()
            .unwrap_or(VerdictLabel::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VerdictLabel::Unknown => "NEEDS REVIEW",
            VerdictLabel::HighRisk => VERDICT_LABELS[0],
            VerdictLabel::Suspicious => VERDICT_LABELS[1],
            VerdictLabel::Safe => VERDICT_LABELS[2],
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_high_risk_any_case() {
        assert_eq!(RiskGlyph::from_verdict("Verdict: HIGH RISK"), RiskGlyph::HighRisk);
        assert_eq!(RiskGlyph::from_verdict("this is high risk"), RiskGlyph::HighRisk);
        assert_eq!(RiskGlyph::from_verdict("High Risk — edited"), RiskGlyph::HighRisk);
    }

    #[test]
    fn glyph_safe_is_verified() {
        assert_eq!(RiskGlyph::from_verdict("SAFE"), RiskGlyph::Verified);
    }

    #[test]
    fn glyph_suspicious_is_verified() {
        assert_eq!(
            RiskGlyph::from_verdict("Verdict: SUSPICIOUS. Font kerning inconsistent."),
            RiskGlyph::Verified
        );
    }

    #[test]
    fn glyph_display() {
        assert_eq!(RiskGlyph::HighRisk.to_string(), "🔴 High Risk");
        assert_eq!(RiskGlyph::Verified.to_string(), "🟢 Verified");
    }

    #[test]
    fn label_extraction() {
        assert_eq!(VerdictLabel::extract("Verdict: SAFE."), VerdictLabel::Safe);
        assert_eq!(
            VerdictLabel::extract("Verdict: SUSPICIOUS. Font kerning inconsistent."),
            VerdictLabel::Suspicious
        );
        assert_eq!(VerdictLabel::extract("**high-risk**"), VerdictLabel::HighRisk);
        assert_eq!(VerdictLabel::extract("HIGH  RISK"), VerdictLabel::HighRisk);
    }

    #[test]
    fn every_prompt_label_is_recognised() {
        for (label, expected) in VERDICT_LABELS.iter().zip(BY_SEVERITY) {
            assert_eq!(VerdictLabel::extract(label), expected);
            assert_eq!(expected.as_str(), *label);
        }
    }

    #[test]
    fn label_unknown_when_absent() {
        assert_eq!(
            VerdictLabel::extract("I cannot determine authenticity."),
            VerdictLabel::Unknown
        );
        assert_eq!(VerdictLabel::extract("UNSAFE"), VerdictLabel::Unknown);
        assert_eq!(VerdictLabel::Unknown.to_string(), "NEEDS REVIEW");
    }

    #[test]
    fn label_most_severe_wins() {
        assert_eq!(
            VerdictLabel::extract("Not SAFE. Rather SUSPICIOUS, bordering on HIGH RISK."),
            VerdictLabel::HighRisk
        );
        assert_eq!(
            VerdictLabel::extract("safe? no — suspicious"),
            VerdictLabel::Suspicious
        );
    }
}
