//! Recognition filter: raw OCR text → location-code candidate.
//!
//! OCR tends to split location labels at the dash or dot, so a fixed,
//! ordered list of structural patterns is tried first and reassembled into
//! the canonical `LETTER-DIGITS.DIGITLETTER` shape. A looser single-token
//! pattern catches everything else. No match means the frame is discarded;
//! de-duplication against the last accepted candidate is the capture
//! session's job.

use regex::Regex;

/// Structural shapes for OCR segmentation noise, tried in order.
/// Each has four groups: letter, first digits, second digits, ending letter.
const STRUCTURAL_PATTERNS: [&str; 5] = [
    r"([A-Z])-(\d+)\s+(\d+)([A-Z])",
    r"([A-Z])(\d+)\s+(\d+)([A-Z])",
    r"([A-Z])-(\d+)\.(\d+)([A-Z])",
    r"([A-Z])(\d+)(\d+)([A-Z])",
    r"([A-Z])\s+(\d+)\s+(\d+)\s+([A-Z])",
];

/// Loose fallback: a single aisle-style token or a staging code.
const LOOSE_PATTERN: &str = r"[A-Z]-?\d+\.?\d*[A-Z]?|STG\.[A-Z]\d{2,3}";

/// Extracts location-code candidates from noisy OCR output.
pub struct RecognitionFilter {
    structural: Vec<Regex>,
    loose: Regex,
}

impl RecognitionFilter {
    pub fn new() -> Self {
        Self {
            structural: STRUCTURAL_PATTERNS
                .iter()
                .map(|p| Regex::new(p).expect("valid regex"))
                .collect(),
            loose: Regex::new(LOOSE_PATTERN).expect("valid regex"),
        }
    }

    /// Returns the first candidate found in the raw text, or None when the
    /// frame carries nothing location-shaped.
    pub fn extract(&self, raw: &str) -> Option<String> {
        let cleaned = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        if cleaned.is_empty() {
            return None;
        }

        for pattern in &self.structural {
            if let Some(caps) = pattern.captures(&cleaned) {
                return Some(format!(
                    "{}-{}.{}{}",
                    &caps[1], &caps[2], &caps[3], &caps[4]
                ));
            }
        }

        self.loose.find(&cleaned).map(|m| m.as_str().to_string())
    }
}

impl Default for RecognitionFilter {
    fn default() -> Self {
        Self::new()
    }
}
