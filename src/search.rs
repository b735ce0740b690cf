//! Top-level query pipeline: normalize → lookup → result set.

use crate::dataset::{LookupIndex, ScanResult};
use crate::error::SearchError;
use crate::normalize::normalize;

/// Resolves one raw query into scan results.
///
/// A range expands to many codes; the batch reports a miss only if every
/// expanded code misses the index. An inverted range is a distinct error and
/// never falls through to pass-through behavior.
pub fn search(index: &LookupIndex, raw: &str) -> Result<Vec<ScanResult>, SearchError> {
    let codes = normalize(raw)
        .map_err(|e| SearchError::RangeInvalid {
            start: e.start,
            end: e.end,
        })?;

    let results: Vec<ScanResult> = codes.iter().filter_map(|code| index.find(code)).collect();

    if results.is_empty() {
        tracing::debug!("query {raw:?} expanded to {} codes, none found", codes.len());
        return Err(SearchError::NoMatches);
    }

    Ok(results)
}

/// Re-resolves an already-canonical code (a history entry or suggestion).
///
/// Skips the normalizer: stored codes are canonical. A miss means the
/// dataset changed underneath the session.
pub fn resolve_canonical(index: &LookupIndex, code: &str) -> Result<ScanResult, SearchError> {
    index
        .find(code)
        .ok_or_else(|| SearchError::NotFound(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_index() -> LookupIndex {
        LookupIndex::from_json(
            r#"[
            { "LOCATION": "STG.H02", "REFERENCEID": "ref-h02", "TYPE": "STAGING_AREA" },
            { "LOCATION": "B-11.3A", "REFERENCEID": "ref-b11", "TYPE": "STACKING_AREA" },
            { "LOCATION": "AX1", "REFERENCEID": "ref-ax1", "TYPE": "GENERAL_AREA" },
            { "LOCATION": "AX2", "REFERENCEID": "ref-ax2", "TYPE": "GENERAL_AREA" },
            { "LOCATION": "AX3", "REFERENCEID": "ref-ax3", "TYPE": "GENERAL_AREA" }
        ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_search_normalizes_before_lookup() {
        let index = test_index();
        let results = search(&index, "b113a").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location, "B-11.3A");
        assert_eq!(results[0].reference_id, "ref-b11");
    }

    #[test]
    fn test_range_returns_only_hits() {
        // AX1-AX5 expands to five codes; only three exist.
        let index = test_index();
        let results = search(&index, "AX1-AX5").unwrap();
        let locations: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, ["AX1", "AX2", "AX3"]);
    }

    #[test]
    fn test_range_all_miss_is_aggregate_error() {
        let index = test_index();
        assert_eq!(search(&index, "AX90-AX95"), Err(SearchError::NoMatches));
    }

    #[test]
    fn test_inverted_range_is_distinct_error() {
        let index = test_index();
        assert_eq!(
            search(&index, "AX3-AX1"),
            Err(SearchError::RangeInvalid { start: 3, end: 1 })
        );
    }

    #[test]
    fn test_fallback_miss_reports_no_matches() {
        let index = test_index();
        assert_eq!(search(&index, "ZZTOP99"), Err(SearchError::NoMatches));
    }

    #[test]
    fn test_resolve_canonical_skips_normalizer() {
        let index = test_index();
        // "AX1" would survive normalization anyway, but "STG.H02" proves the
        // stored canonical form is looked up verbatim.
        assert_eq!(
            resolve_canonical(&index, "STG.H02").unwrap().reference_id,
            "ref-h02"
        );
        assert_eq!(
            resolve_canonical(&index, "STG.Z99"),
            Err(SearchError::NotFound("STG.Z99".to_string()))
        );
    }
}
