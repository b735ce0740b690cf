//! OCR collaborator contract and the Tesseract implementation.
//!
//! Recognition runs the tesseract CLI once per frame: the preprocessed
//! grayscale frame goes to a temp PNG, tesseract prints plain text to
//! stdout, and the character whitelist keeps the output inside the location
//! alphabet.

use anyhow::{Result, anyhow};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};

/// Characters the OCR collaborator is restricted to.
pub const OCR_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789- .";

/// A text recognizer fed one raster frame at a time.
///
/// Implementations may hold long-lived engine state; the capture session
/// calls them from its worker thread only.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, img: &GrayImage) -> Result<String>;
}

/// Recognizer shelling out to the tesseract CLI per invocation.
pub struct TesseractRecognizer {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
}

impl TesseractRecognizer {
    pub fn new() -> Result<Self> {
        let executable = find_tesseract_executable()?;
        // Installed tesseract usually knows its own data dir; only pass
        // --tessdata-dir when we found one explicitly.
        let tessdata = find_tessdata_dir().ok();
        Ok(Self {
            executable,
            tessdata,
        })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, img: &GrayImage) -> Result<String> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("6") // Assume single uniform block of text
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={OCR_WHITELIST}"));
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
