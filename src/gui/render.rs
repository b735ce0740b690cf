//! GUI rendering functions.
//!
//! Contains UI layout and component rendering logic. Render functions take
//! the state and report user actions back as values; the app applies them.

use std::collections::HashMap;

use eframe::egui::{self, Color32, RichText, TextureHandle, Vec2};

use super::state::{GuiState, area_color};
use crate::capture::CaptureState;
use crate::config::QuickLink;
use crate::dataset::LookupIndex;

/// Actions from the search area.
pub enum SearchAction {
    Submitted,
    SuggestionPicked(String),
    Cleared,
}

/// Actions from the camera panel.
pub enum CameraAction {
    Start,
    Close,
    Switch(String),
    CaptureNow,
    ClearResult,
}

/// Render the header with title and quick links.
pub fn render_header(ui: &mut egui::Ui, quick_links: &[QuickLink]) {
    ui.heading("Stowscan Location Codes");
    if !quick_links.is_empty() {
        ui.horizontal_wrapped(|ui| {
            for link in quick_links {
                ui.hyperlink_to(&link.name, &link.url);
            }
        });
    }
    ui.add_space(8.0);
}

/// Render the search input with suggestions dropdown.
pub fn render_search(
    ui: &mut egui::Ui,
    state: &mut GuiState,
    index: &LookupIndex,
) -> Option<SearchAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.search_term)
                .hint_text("A-23.3A, STG.H02, AX1 or AX1-AX100")
                .desired_width(ui.available_width() - 70.0),
        );
        if response.changed() {
            state.show_suggestions = !state.search_term.trim().is_empty();
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action = Some(SearchAction::Submitted);
        }
        if ui.button("Clear").clicked() {
            action = Some(SearchAction::Cleared);
        }
    });

    if state.show_suggestions {
        let suggestions: Vec<_> = index
            .suggestions(&state.search_term, 8)
            .iter()
            .map(|e| (e.location.clone(), e.area_type))
            .collect();
        for (location, area) in suggestions {
            ui.horizontal(|ui| {
                if ui.button(&location).clicked() {
                    action = Some(SearchAction::SuggestionPicked(location.clone()));
                }
                ui.colored_label(area_color(area), area.display_name());
            });
        }
    }

    action
}

/// Render the recent-scans strip. Returns the selected location, if any.
pub fn render_history(ui: &mut egui::Ui, state: &GuiState) -> Option<String> {
    if state.history.is_empty() {
        return None;
    }

    let mut selected = None;
    ui.add_space(8.0);
    ui.label(RichText::new("Recent Scans (tap to search)").strong());
    ui.horizontal_wrapped(|ui| {
        for entry in state.history.list() {
            let text = format!("{}  {}", entry.location, entry.timestamp);
            if ui
                .button(RichText::new(text).color(area_color(entry.area_type)))
                .clicked()
            {
                selected = Some(entry.location.clone());
            }
        }
    });
    selected
}

/// Render the result cards. Returns true when export was clicked.
pub fn render_results(
    ui: &mut egui::Ui,
    state: &GuiState,
    textures: &HashMap<String, TextureHandle>,
) -> bool {
    let mut export_clicked = false;

    if let Some(error) = &state.error {
        ui.add_space(8.0);
        ui.colored_label(Color32::from_rgb(0xe7, 0x4c, 0x3c), error);
    }

    if state.results.is_empty() {
        return false;
    }

    ui.add_space(8.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.heading(format!("Generated Codes ({})", state.results.len()));
        if ui.button("Export PNGs").clicked() {
            export_clicked = true;
        }
    });
    if let Some(note) = &state.export_note {
        ui.label(RichText::new(note).weak());
    }

    for result in &state.results {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if let Some(texture) = textures.get(&result.reference_id) {
                ui.image((texture.id(), Vec2::splat(120.0)));
            }
            ui.vertical(|ui| {
                ui.label(RichText::new(&result.location).strong().size(18.0));
                ui.colored_label(
                    area_color(result.area_type),
                    result.area_type.display_name(),
                );
                ui.label(RichText::new(format!("Ref: {}", result.reference_id)).weak());
            });
        });
    }

    export_clicked
}

/// Render the camera panel. Returns the requested action, if any.
pub fn render_camera(
    ui: &mut egui::Ui,
    state: &GuiState,
    capture_state: CaptureState,
    interval_ms: u64,
) -> Option<CameraAction> {
    let mut action = None;

    ui.add_space(8.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.heading("Camera Text Scanner");
        if ui.button("Close").clicked() {
            action = Some(CameraAction::Close);
        }
    });

    // Device picker.
    if !state.devices.is_empty() {
        let selected_label = state
            .devices
            .iter()
            .find(|d| Some(d.device_id.as_str()) == state.selected_device.as_deref())
            .map(|d| d.label.clone())
            .unwrap_or_else(|| "Select camera".to_string());
        egui::ComboBox::from_id_salt("camera-device")
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                for device in &state.devices {
                    let checked = Some(device.device_id.as_str()) == state.selected_device.as_deref();
                    if ui.selectable_label(checked, &device.label).clicked() && !checked {
                        action = Some(CameraAction::Switch(device.device_id.clone()));
                    }
                }
            });
    }

    // Status line.
    match capture_state {
        CaptureState::Starting => {
            ui.label("Starting camera...");
        }
        CaptureState::Active => {
            ui.colored_label(
                Color32::from_rgb(0x15, 0x57, 0x24),
                format!(
                    "Camera active - scanning every {:.1} s",
                    interval_ms as f32 / 1000.0
                ),
            );
        }
        CaptureState::Paused => {
            ui.colored_label(
                Color32::from_rgb(0x8a, 0x6d, 0x3b),
                "Scan paused (clear result to resume)",
            );
        }
        CaptureState::Idle | CaptureState::Stopped => {
            ui.label("Camera is not running.");
        }
    }

    if !state.detected_text.is_empty() {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Detected:").strong());
            ui.label(&state.detected_text);
        });
    }

    ui.horizontal(|ui| {
        match capture_state {
            CaptureState::Active => {
                if ui.button("Capture Now").clicked() {
                    action = Some(CameraAction::CaptureNow);
                }
            }
            CaptureState::Paused => {
                if ui.button("Clear Result & Resume").clicked() {
                    action = Some(CameraAction::ClearResult);
                }
            }
            CaptureState::Idle | CaptureState::Stopped => {
                let label = if state.camera_error.is_some() {
                    "Retry Starting Camera"
                } else {
                    "Start Camera"
                };
                if ui.button(label).clicked() {
                    action = Some(CameraAction::Start);
                }
            }
            CaptureState::Starting => {}
        }
    });

    if let Some(error) = &state.camera_error {
        ui.colored_label(Color32::from_rgb(0x72, 0x1c, 0x24), error);
    }

    action
}
