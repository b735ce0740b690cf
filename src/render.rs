//! Scannable-code rendering.
//!
//! Renders a reference identifier as a QR matrix at error-correction level H
//! with a quiet zone, rasterized into `image` buffers. Used for on-screen
//! display and for the print/export path, which writes higher-resolution
//! PNGs (one size for a single result, a smaller one for multi-result sets).

use anyhow::{Result, anyhow};
use image::{GrayImage, ImageBuffer, Luma};
use qrcode::{Color, EcLevel, QrCode};
use std::path::{Path, PathBuf};

use crate::dataset::ScanResult;

/// On-screen code size in pixels.
pub const DISPLAY_SIZE: u32 = 160;
/// Export size when printing a single result.
pub const PRINT_SINGLE_SIZE: u32 = 480;
/// Export size per code when printing a multi-result set.
pub const PRINT_MULTI_SIZE: u32 = 240;

/// Quiet-zone width in modules on each side.
const QUIET_ZONE_MODULES: u32 = 4;

/// Renders a payload as a QR image of roughly `target_px` on a side.
///
/// The module scale is floored so the output never exceeds the target except
/// for payloads too dense to fit at one pixel per module.
pub fn render_code(payload: &str, target_px: u32) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
        .map_err(|e| anyhow!("QR encoding failed for {payload:?}: {e}"))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let total = modules + 2 * QUIET_ZONE_MODULES;
    let scale = (target_px / total).max(1);
    let px = total * scale;

    let img = ImageBuffer::from_fn(px, px, |x, y| {
        let mx = x / scale;
        let my = y / scale;
        let in_code = mx >= QUIET_ZONE_MODULES
            && my >= QUIET_ZONE_MODULES
            && mx < QUIET_ZONE_MODULES + modules
            && my < QUIET_ZONE_MODULES + modules;
        let dark = in_code
            && colors[((my - QUIET_ZONE_MODULES) * modules + (mx - QUIET_ZONE_MODULES)) as usize]
                == Color::Dark;
        Luma([if dark { 0u8 } else { 255u8 }])
    });

    Ok(img)
}

/// Writes one PNG per result into `dir`, returning the written paths.
///
/// A single result exports at print size; multi-result sets export smaller
/// so a sheet of them stays printable.
pub fn export_results(results: &[ScanResult], dir: &Path) -> Result<Vec<PathBuf>> {
    let size = if results.len() == 1 {
        PRINT_SINGLE_SIZE
    } else {
        PRINT_MULTI_SIZE
    };

    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(results.len());
    for result in results {
        let img = render_code(&result.reference_id, size)?;
        let path = dir.join(format!("{}.png", sanitize_filename(&result.location)));
        img.save(&path)?;
        written.push(path);
    }

    tracing::info!("exported {} code(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Keeps letters, digits, dot, and dash; everything else becomes '_'.
fn sanitize_filename(location: &str) -> String {
    location
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
