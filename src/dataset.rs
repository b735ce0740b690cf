//! Location dataset and lookup index.
//!
//! The dataset is a read-only JSON collection of `{LOCATION, REFERENCEID,
//! TYPE}` records loaded once at startup. Lookup is an exact, case-sensitive
//! match against canonical codes; callers must normalize first.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Sample dataset compiled into the binary, used when no locations.json
/// exists next to the executable.
const EMBEDDED_DATASET: &str = include_str!("../resources/locations.json");

/// Area classification of a location, used for display grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaType {
    Staging,
    Stacking,
    General,
    Other,
}

impl AreaType {
    pub const ALL: [AreaType; 4] = [
        AreaType::Staging,
        AreaType::Stacking,
        AreaType::General,
        AreaType::Other,
    ];

    /// Classifies a raw dataset type tag. Unrecognized tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "STAGING_AREA" => AreaType::Staging,
            "STACKING_AREA" => AreaType::Stacking,
            "GENERAL_AREA" => AreaType::General,
            _ => AreaType::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AreaType::Staging => "Staging Area",
            AreaType::Stacking => "Stacking Area",
            AreaType::General => "General Area",
            AreaType::Other => "Other",
        }
    }
}

/// One record of the raw dataset, field names as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "REFERENCEID")]
    pub reference_id: String,
    #[serde(rename = "TYPE")]
    pub type_tag: String,
}

/// One dataset entry after classification. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct LocationEntry {
    pub location: String,
    pub reference_id: String,
    pub area_type: AreaType,
}

/// A resolved location, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub location: String,
    pub reference_id: String,
    pub area_type: AreaType,
}

/// Read-only index over the dataset, built once at startup.
pub struct LookupIndex {
    entries: Vec<LocationEntry>,
    by_location: HashMap<String, usize>,
}

impl LookupIndex {
    /// Builds the index from raw records. On duplicate locations the first
    /// record wins.
    pub fn build(records: Vec<RawRecord>) -> Self {
        let mut entries = Vec::with_capacity(records.len());
        let mut by_location = HashMap::with_capacity(records.len());

        for record in records {
            let entry = LocationEntry {
                area_type: AreaType::from_tag(&record.type_tag),
                location: record.location,
                reference_id: record.reference_id,
            };
            if !by_location.contains_key(&entry.location) {
                by_location.insert(entry.location.clone(), entries.len());
                entries.push(entry);
            }
        }

        Self {
            entries,
            by_location,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<RawRecord> =
            serde_json::from_str(json).context("failed to parse location dataset")?;
        Ok(Self::build(records))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Exact, case-sensitive lookup of a canonical code.
    pub fn find(&self, code: &str) -> Option<ScanResult> {
        self.by_location.get(code).map(|&i| {
            let entry = &self.entries[i];
            ScanResult {
                location: entry.location.clone(),
                reference_id: entry.reference_id.clone(),
                area_type: entry.area_type,
            }
        })
    }

    /// Case-insensitive substring matches for the autocomplete dropdown.
    pub fn suggestions(&self, term: &str, limit: usize) -> Vec<&LocationEntry> {
        let needle = term.trim().to_uppercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.location.contains(&needle))
            .take(limit)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries bucketed into one area classification.
    pub fn bucket_len(&self, area: AreaType) -> usize {
        self.entries.iter().filter(|e| e.area_type == area).count()
    }
}

/// Loads the index from the configured path, the default location next to
/// the executable, or the embedded sample dataset, in that order.
pub fn load_index(config: &crate::config::AppConfig) -> Result<LookupIndex> {
    let path = config
        .dataset_path
        .clone()
        .unwrap_or_else(crate::paths::get_dataset_path);

    if path.exists() {
        let index = LookupIndex::load(&path)?;
        tracing::info!("loaded {} locations from {}", index.len(), path.display());
        return Ok(index);
    }

    let index = LookupIndex::from_json(EMBEDDED_DATASET)?;
    tracing::info!("loaded {} locations from embedded sample dataset", index.len());
    Ok(index)
}
