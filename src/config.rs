//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides capture timing,
//! OCR preprocessing, dataset/frame locations, and quick links.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// A named external link shown in the GUI header.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuickLink {
    pub name: String,
    pub url: String,
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interval between camera capture ticks (milliseconds).
    #[serde(default = "default_capture_interval_ms")]
    pub capture_interval_ms: u64,
    /// Maximum time to wait for the video stream to report usable dimensions.
    #[serde(default = "default_stream_timeout_ms")]
    pub stream_timeout_ms: u64,
    /// Delay before re-opening a device after a switch, so the previous
    /// hardware handle can release.
    #[serde(default = "default_device_settle_ms")]
    pub device_settle_ms: u64,
    /// Binarization threshold for dark label text (pixels with luma below
    /// this become black). None keeps plain grayscale frames.
    #[serde(default)]
    pub ocr_threshold: Option<u8>,
    /// Override for the location dataset path (defaults to
    /// `<exe_dir>/locations.json`, falling back to the embedded sample).
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// Override for the camera hot-folder root (defaults to `<exe_dir>/frames`).
    #[serde(default)]
    pub frames_dir: Option<PathBuf>,
    /// External links rendered in the GUI header.
    #[serde(default)]
    pub quick_links: Vec<QuickLink>,
}

fn default_capture_interval_ms() -> u64 {
    2000
}

fn default_stream_timeout_ms() -> u64 {
    10_000
}

fn default_device_settle_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture_interval_ms: default_capture_interval_ms(),
            stream_timeout_ms: default_stream_timeout_ms(),
            device_settle_ms: default_device_settle_ms(),
            ocr_threshold: None,
            dataset_path: None,
            frames_dir: None,
            quick_links: Vec::new(),
        }
    }
}

/// Loads configuration from config.json next to the executable, or defaults.
fn load_config() -> AppConfig {
    let config_path = crate::paths::get_exe_dir().join("config.json");

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("config loaded from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("failed to parse config.json: {e}. Using defaults.");
                }
            },
            Err(e) => {
                tracing::warn!("failed to read config.json: {e}. Using defaults.");
            }
        }
    } else {
        tracing::info!("config.json not found, using default config");
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.capture_interval_ms, 2000);
        assert_eq!(config.stream_timeout_ms, 10_000);
        assert!(config.ocr_threshold.is_none());
        assert!(config.quick_links.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "capture_interval_ms": 1500 }"#).unwrap();
        assert_eq!(config.capture_interval_ms, 1500);
        assert_eq!(config.device_settle_ms, 500);
        assert!(config.dataset_path.is_none());
    }
}
