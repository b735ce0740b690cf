//! Location-code normalization.
//!
//! Converts free-form human/scanner input into canonical location codes.
//! Input is trimmed and upper-cased, then the rules below are tried in
//! strict order; the first matching rule's output is returned and rules are
//! never combined or re-applied to each other's output. Only the range rule
//! can produce more than one code.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A range whose start exceeds its end. Always a hard error, on every path.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid range {start}-{end}: ensure start <= end")]
pub struct RangeInvalid {
    pub start: u32,
    pub end: u32,
}

/// Aisle tags that never take the staging or dash rewrites.
const EXCLUDED_AISLES: [&str; 4] = ["AX", "AV", "RX", "RV"];

/// First letters eligible for the two-character staging shorthand.
const STAGING_LETTERS: &str = "ABCDEGHJKLM";

/// First letters eligible for the dash rewrite (no H here).
const DASH_LETTERS: &str = "ABCDEGJKLM";

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z]+)(\d+)\s*-\s*([A-Z]+)(\d+)$").expect("valid regex"))
}

fn quad_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z])(\d{1,2})(\d)([A-Z])$").expect("valid regex"))
}

fn contains_excluded_aisle(value: &str) -> bool {
    EXCLUDED_AISLES.iter().any(|tag| value.contains(tag))
}

/// Expands `PREFIX<start>..PREFIX<end>` into individual codes, ascending.
fn expand_range(prefix: &str, start: u32, end: u32) -> Vec<String> {
    (start..=end).map(|n| format!("{prefix}{n}")).collect()
}

/// Normalizes one raw input into canonical location codes.
///
/// Never returns an empty vector: inputs no rule recognizes pass through
/// unchanged as a single-element sequence. The only error is an inverted
/// range.
pub fn normalize(raw: &str) -> Result<Vec<String>, RangeInvalid> {
    let value = raw.trim().to_uppercase();

    // Rule 1: range expansion, e.g. AX1-AX100. Both prefixes must match;
    // an inverted range is rejected rather than passed through.
    if let Some(caps) = range_re().captures(&value) {
        if caps[1] == caps[3] {
            if let (Ok(start), Ok(end)) = (caps[2].parse::<u32>(), caps[4].parse::<u32>()) {
                if start > end {
                    return Err(RangeInvalid { start, end });
                }
                return Ok(expand_range(&caps[1], start, end));
            }
        }
    }

    // Rule 2: shorthand quad pattern, e.g. B113A -> B-11.3A.
    if let Some(caps) = quad_re().captures(&value) {
        return Ok(vec![format!(
            "{}-{}.{}{}",
            &caps[1], &caps[2], &caps[3], &caps[4]
        )]);
    }

    let chars: Vec<char> = value.chars().collect();

    // Rule 3: three-character codes get the staging prefix verbatim.
    if chars.len() == 3 && value != "RTS" && !contains_excluded_aisle(&value) {
        return Ok(vec![format!("STG.{value}")]);
    }

    // Rule 4: two-character staging shorthand, zero-padded: H2 -> STG.H02.
    if chars.len() == 2
        && STAGING_LETTERS.contains(chars[0])
        && !contains_excluded_aisle(&value)
    {
        return Ok(vec![format!("STG.{}0{}", chars[0], chars[1])]);
    }

    // Rule 5: dock-door codes pass through unchanged.
    if value.contains("DD") {
        return Ok(vec![value]);
    }

    // Rule 6: short aisle shorthand, e.g. A173 -> A-173. Never re-triggers
    // on already-canonical codes (the dash and STG exclusions).
    if chars.len() < 7
        && chars.first().is_some_and(|c| DASH_LETTERS.contains(*c))
        && !value.contains("OV")
        && !value.contains('-')
        && !value.contains("STG")
        && !contains_excluded_aisle(&value)
    {
        let rest: String = chars[1..].iter().collect();
        return Ok(vec![format!("{}-{}", chars[0], rest)]);
    }

    // Fallback: return the input unchanged.
    Ok(vec![value])
}
