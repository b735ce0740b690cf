//! GUI module for the application.
//!
//! Provides a graphical interface using egui/eframe: search with
//! suggestions, result cards with rendered codes, recent-scan history, and
//! the camera-scanner panel driven by the capture manager.

pub mod render;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::{self, TextureHandle, Vec2};

use crate::capture::{CaptureConfig, CaptureManager, CaptureState, FolderProvider, SessionEvent};
use crate::config::get_config;
use crate::dataset::LookupIndex;
use crate::ocr::TesseractRecognizer;
use crate::render::{DISPLAY_SIZE, export_results, render_code};
use crate::search::{resolve_canonical, search};

use render::{CameraAction, SearchAction};
use state::GuiState;

/// Main GUI application struct.
pub struct App {
    /// Application state.
    state: GuiState,
    /// Lookup index, shared with capture workers.
    index: Arc<LookupIndex>,
    /// Capture manager, created when the camera panel is first opened.
    capture: Option<CaptureManager>,
    /// Rendered code textures, keyed by reference id.
    textures: HashMap<String, TextureHandle>,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, index: Arc<LookupIndex>) -> Self {
        Self {
            state: GuiState::default(),
            index,
            capture: None,
            textures: HashMap::new(),
        }
    }

    /// Handle a submitted search query.
    fn handle_search(&mut self) {
        self.state.show_suggestions = false;
        self.state.export_note = None;
        match search(&self.index, &self.state.search_term) {
            Ok(results) => {
                self.state.results = results;
                self.state.error = None;
            }
            Err(e) => {
                self.state.results.clear();
                self.state.error = Some(e.to_string());
            }
        }
    }

    /// Handle a picked suggestion or history entry: both store canonical
    /// codes, so lookup runs without the normalizer.
    fn handle_canonical_select(&mut self, location: String) {
        self.state.search_term = location.clone();
        self.state.show_suggestions = false;
        self.state.export_note = None;
        match resolve_canonical(&self.index, &location) {
            Ok(result) => {
                self.state.results = vec![result];
                self.state.error = None;
            }
            Err(e) => {
                // Dataset changed underneath the session.
                self.state.results.clear();
                self.state.error = Some(e.to_string());
            }
        }
    }

    fn handle_clear(&mut self) {
        self.state.search_term.clear();
        self.state.results.clear();
        self.state.error = None;
        self.state.show_suggestions = false;
        self.state.export_note = None;
    }

    /// Handle the export (print path) button.
    fn handle_export(&mut self) {
        match export_results(&self.state.results, &crate::paths::get_export_dir()) {
            Ok(written) => {
                self.state.export_note = Some(format!(
                    "Wrote {} PNG(s) to {}",
                    written.len(),
                    crate::paths::get_export_dir().display()
                ));
            }
            Err(e) => {
                self.state.export_note = Some(format!("Export failed: {e}"));
            }
        }
    }

    /// Open the camera panel and start a session.
    fn open_camera(&mut self) {
        self.state.camera_open = true;
        self.state.camera_error = None;
        self.state.detected_text.clear();

        if self.capture.is_none() {
            let recognizer = match TesseractRecognizer::new() {
                Ok(recognizer) => recognizer,
                Err(e) => {
                    self.state.camera_error = Some(e.to_string());
                    return;
                }
            };
            let config = get_config();
            let frames_dir = config
                .frames_dir
                .clone()
                .unwrap_or_else(crate::paths::get_frames_dir);
            self.capture = Some(CaptureManager::new(
                Arc::new(FolderProvider::new(frames_dir)),
                Box::new(recognizer),
                Arc::clone(&self.index),
                CaptureConfig::from_app(config),
            ));
        }

        let Some(manager) = self.capture.as_mut() else {
            return;
        };
        match manager.devices() {
            Ok(devices) => {
                if self.state.selected_device.is_none() {
                    // Default to an environment-facing device when available.
                    let preferred = devices
                        .iter()
                        .find(|d| {
                            let label = d.label.to_lowercase();
                            label.contains("back") || label.contains("environment")
                        })
                        .or_else(|| devices.first());
                    self.state.selected_device = preferred.map(|d| d.device_id.clone());
                }
                self.state.devices = devices;
            }
            Err(e) => {
                self.state.camera_error = Some(e.to_string());
                return;
            }
        }
        manager.start(self.state.selected_device.clone());
    }

    fn close_camera(&mut self) {
        if let Some(manager) = self.capture.as_mut() {
            manager.stop();
        }
        self.state.camera_open = false;
        self.state.detected_text.clear();
        self.state.camera_error = None;
    }

    fn apply_camera_action(&mut self, action: CameraAction) {
        match action {
            CameraAction::Start => {
                self.state.camera_error = None;
                self.open_camera();
            }
            CameraAction::Close => self.close_camera(),
            CameraAction::Switch(device_id) => {
                self.state.selected_device = Some(device_id.clone());
                if let Some(manager) = self.capture.as_mut() {
                    manager.switch_device(device_id);
                }
            }
            CameraAction::CaptureNow => {
                if let Some(manager) = self.capture.as_ref() {
                    if !manager.capture_now() {
                        self.state.detected_text =
                            "Clear the current result before scanning manually.".to_string();
                    }
                }
            }
            CameraAction::ClearResult => {
                if let Some(manager) = self.capture.as_ref() {
                    manager.clear_result();
                }
                self.state.detected_text.clear();
            }
        }
    }

    /// Drain capture events into UI state.
    fn pump_capture_events(&mut self) {
        let Some(manager) = self.capture.as_mut() else {
            return;
        };
        for event in manager.poll() {
            match event {
                SessionEvent::Ready { width, height } => {
                    tracing::debug!("camera stream ready at {width}x{height}");
                    self.state.camera_error = None;
                }
                SessionEvent::Candidate { code } => {
                    self.state.detected_text = code;
                }
                SessionEvent::DuplicateIgnored { code } => {
                    tracing::debug!("duplicate detection ignored: {code}");
                }
                SessionEvent::Miss { code } => {
                    self.state.detected_text = format!("{code} (no matching location)");
                }
                SessionEvent::Resolved(result) => {
                    self.state.detected_text = result.location.clone();
                    self.state.history.record(&result.location, result.area_type);
                    self.state.results = vec![result];
                    self.state.error = None;
                    self.state.export_note = None;
                }
                SessionEvent::OcrFailed(message) => {
                    tracing::debug!("frame recognition failed: {message}");
                }
                SessionEvent::Camera(e) => {
                    self.state.camera_error = Some(e.to_string());
                }
                SessionEvent::Stopped => {
                    tracing::debug!("capture session stopped");
                }
            }
        }
    }

    /// Make sure every current result has a rendered code texture.
    fn ensure_textures(&mut self, ctx: &egui::Context) {
        for result in &self.state.results {
            if self.textures.contains_key(&result.reference_id) {
                continue;
            }
            match render_code(&result.reference_id, DISPLAY_SIZE) {
                Ok(img) => {
                    let size = [img.width() as usize, img.height() as usize];
                    let rgba: Vec<u8> = img
                        .pixels()
                        .flat_map(|p| [p[0], p[0], p[0], 255])
                        .collect();
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba);
                    let texture = ctx.load_texture(
                        format!("qr-{}", result.reference_id),
                        color_image,
                        egui::TextureOptions::NEAREST,
                    );
                    self.textures.insert(result.reference_id.clone(), texture);
                }
                Err(e) => {
                    tracing::warn!("failed to render code for {}: {e}", result.location);
                }
            }
        }
    }

    fn capture_state(&self) -> CaptureState {
        self.capture
            .as_ref()
            .map(|m| m.state())
            .unwrap_or(CaptureState::Idle)
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_capture_events();
        self.ensure_textures(ctx);

        // Keep polling while a capture session is live.
        if self.state.camera_open {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            render::render_header(ui, &get_config().quick_links);

            egui::ScrollArea::vertical().show(ui, |ui| {
                if let Some(action) = render::render_search(ui, &mut self.state, &self.index) {
                    match action {
                        SearchAction::Submitted => self.handle_search(),
                        SearchAction::SuggestionPicked(location) => {
                            self.handle_canonical_select(location)
                        }
                        SearchAction::Cleared => self.handle_clear(),
                    }
                }

                if let Some(location) = render::render_history(ui, &self.state) {
                    self.handle_canonical_select(location);
                }

                if render::render_results(ui, &self.state, &self.textures) {
                    self.handle_export();
                }

                if self.state.camera_open {
                    let capture_state = self.capture_state();
                    let interval_ms = get_config().capture_interval_ms;
                    if let Some(action) =
                        render::render_camera(ui, &self.state, capture_state, interval_ms)
                    {
                        self.apply_camera_action(action);
                    }
                } else {
                    ui.add_space(12.0);
                    if ui.button("Camera Text Scanner").clicked() {
                        self.open_camera();
                    }
                }
            });
        });
    }
}

/// Run the GUI application. Blocks until the window is closed.
pub fn run_gui(index: Arc<LookupIndex>) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(760.0, 640.0))
            .with_min_inner_size(Vec2::new(480.0, 420.0))
            .with_title("Stowscan"),
        ..Default::default()
    };

    eframe::run_native(
        "Stowscan",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, index)))),
    )
}
