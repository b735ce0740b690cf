//! Recent-scan history.
//!
//! Bounded, in-memory record of successful camera-driven scans: newest
//! first, each location at most once, never persisted.

use std::collections::VecDeque;

use crate::dataset::AreaType;

/// Maximum number of entries kept.
const HISTORY_LIMIT: usize = 10;

/// One successful scan, as shown in the history strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub location: String,
    pub area_type: AreaType,
    pub timestamp: String,
}

/// Bounded most-recent-first scan history.
#[derive(Debug, Default)]
pub struct ScanHistory {
    entries: VecDeque<HistoryEntry>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful scan: any existing entry for the same location
    /// is removed, the new entry goes to the front, and the list is
    /// truncated to the capacity.
    pub fn record(&mut self, location: &str, area_type: AreaType) {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.record_at(location, area_type, timestamp);
    }

    fn record_at(&mut self, location: &str, area_type: AreaType, timestamp: String) {
        self.entries.retain(|e| e.location != location);
        self.entries.push_front(HistoryEntry {
            location: location.to_string(),
            area_type,
            timestamp,
        });
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Entries, newest first.
    pub fn list(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_n(history: &mut ScanHistory, n: usize) {
        for i in 0..n {
            history.record(&format!("AX{i}"), AreaType::General);
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = ScanHistory::new();
        record_n(&mut history, 3);
        let locations: Vec<&str> = history.list().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, ["AX2", "AX1", "AX0"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = ScanHistory::new();
        record_n(&mut history, 11);
        assert_eq!(history.len(), 10);
        let locations: Vec<&str> = history.list().map(|e| e.location.as_str()).collect();
        assert_eq!(locations.first(), Some(&"AX10"));
        // AX0 was the oldest and fell off.
        assert!(!locations.contains(&"AX0"));
        assert_eq!(locations.last(), Some(&"AX1"));
    }

    #[test]
    fn test_rescan_moves_to_front_without_growing() {
        let mut history = ScanHistory::new();
        record_n(&mut history, 5);
        history.record("AX1", AreaType::General);
        assert_eq!(history.len(), 5);
        let locations: Vec<&str> = history.list().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, ["AX1", "AX4", "AX3", "AX2", "AX0"]);
    }

    #[test]
    fn test_each_location_appears_once() {
        let mut history = ScanHistory::new();
        history.record("STG.H02", AreaType::Staging);
        history.record("STG.H02", AreaType::Staging);
        history.record("STG.H02", AreaType::Staging);
        assert_eq!(history.len(), 1);
    }
}
