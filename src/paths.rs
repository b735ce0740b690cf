use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the directory for exported code PNGs: `<exe_dir>/codes/`
pub fn get_export_dir() -> PathBuf {
    get_exe_dir().join("codes")
}

/// Returns the default hot-folder watched for camera frames: `<exe_dir>/frames/`
pub fn get_frames_dir() -> PathBuf {
    get_exe_dir().join("frames")
}

/// Returns the default dataset path: `<exe_dir>/locations.json`
pub fn get_dataset_path() -> PathBuf {
    get_exe_dir().join("locations.json")
}

/// Returns the directory for locally managed Tesseract files.
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stowscan")
        .join("tesseract")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_export_dir())?;
    std::fs::create_dir_all(get_frames_dir())?;
    Ok(())
}
