//! GUI application state management.
//!
//! Tracks the search field, current result set, scan history, and the
//! camera panel's display state.

use eframe::egui::Color32;

use crate::capture::CameraDevice;
use crate::dataset::{AreaType, ScanResult};
use crate::history::ScanHistory;

/// Display color for an area classification.
pub fn area_color(area: AreaType) -> Color32 {
    match area {
        AreaType::Staging => Color32::from_rgb(0x34, 0x98, 0xdb),
        AreaType::Stacking => Color32::from_rgb(0x2e, 0xcc, 0x71),
        AreaType::General => Color32::from_rgb(0xf3, 0x9c, 0x12),
        AreaType::Other => Color32::from_rgb(0x95, 0xa5, 0xa6),
    }
}

/// GUI application state.
#[derive(Default)]
pub struct GuiState {
    /// Current search input.
    pub search_term: String,
    /// Whether the suggestions dropdown is visible.
    pub show_suggestions: bool,
    /// Current result set.
    pub results: Vec<ScanResult>,
    /// Search error message, if any.
    pub error: Option<String>,
    /// Recent successful camera scans.
    pub history: ScanHistory,
    /// Whether the camera panel is open.
    pub camera_open: bool,
    /// Enumerated camera devices.
    pub devices: Vec<CameraDevice>,
    /// Selected camera device id.
    pub selected_device: Option<String>,
    /// Last text/candidate readout from the capture loop.
    pub detected_text: String,
    /// Camera error message, shown with a retry affordance.
    pub camera_error: Option<String>,
    /// Note about the last export (paths written or failure).
    pub export_note: Option<String>,
}
