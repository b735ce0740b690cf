//! Camera device abstraction.
//!
//! The capture loop reaches hardware through two narrow traits: a
//! `CameraProvider` enumerates devices and opens streams, and a
//! `VideoSource` reports readiness and yields frames into a reusable raster
//! surface. The shipped provider is a hot folder: every subdirectory of the
//! frames root is one "device" and the newest image file in it is the
//! current frame, which lets scanner stations drop snapshots for the same
//! pipeline real camera hardware would feed.

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CameraError;

/// One video-input device, as shown in the device picker.
///
/// Labels on real hardware may stay empty until a permission probe has run;
/// providers return whatever label they have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub device_id: String,
    pub label: String,
}

/// An open video stream owned by exactly one capture session.
pub trait VideoSource: Send {
    /// Reported frame dimensions; None until the stream is ready.
    fn dimensions(&mut self) -> Option<(u32, u32)>;

    /// Grabs the current frame into the reusable surface, reallocating it
    /// only when the stream dimensions changed.
    fn grab_into(&mut self, surface: &mut RgbaImage) -> Result<(), CameraError>;

    /// Releases the underlying hardware handle. Idempotent.
    fn release(&mut self);
}

/// Enumerates devices and opens streams.
pub trait CameraProvider: Send + Sync {
    fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError>;

    /// Opens a stream for the given device, or the provider's
    /// environment-facing default when none is given.
    fn open(&self, device_id: Option<&str>) -> Result<Box<dyn VideoSource>, CameraError>;
}

/// Image file extensions accepted as frames.
const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn map_io_error(e: io::Error) -> CameraError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => CameraError::PermissionDenied,
        io::ErrorKind::NotFound => CameraError::DeviceNotFound,
        _ => CameraError::Frame(e.to_string()),
    }
}

/// Hot-folder provider: subdirectories of the root are devices.
pub struct FolderProvider {
    root: PathBuf,
}

impl FolderProvider {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn device_dirs(&self) -> Result<Vec<PathBuf>, CameraError> {
        if !self.root.is_dir() {
            return Err(CameraError::DeviceNotFound);
        }
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .map_err(map_io_error)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

impl CameraProvider for FolderProvider {
    fn enumerate(&self) -> Result<Vec<CameraDevice>, CameraError> {
        let dirs = self.device_dirs()?;
        if dirs.is_empty() {
            // The root itself acts as the sole default device.
            return Ok(vec![CameraDevice {
                device_id: String::new(),
                label: "Default".to_string(),
            }]);
        }
        Ok(dirs
            .iter()
            .filter_map(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .map(|name| CameraDevice {
                device_id: name.clone(),
                label: name,
            })
            .collect())
    }

    fn open(&self, device_id: Option<&str>) -> Result<Box<dyn VideoSource>, CameraError> {
        let dir = match device_id {
            Some("") | None => {
                let dirs = self.device_dirs()?;
                // Prefer an environment-facing device, then fall back to
                // the first one.
                dirs.iter()
                    .find(|d| {
                        d.file_name().is_some_and(|n| {
                            let name = n.to_string_lossy().to_lowercase();
                            name.contains("back") || name.contains("environment")
                        })
                    })
                    .or_else(|| dirs.first())
                    .cloned()
                    .unwrap_or_else(|| self.root.clone())
            }
            Some(id) => {
                let dir = self.root.join(id);
                if !dir.is_dir() {
                    return Err(CameraError::DeviceNotFound);
                }
                dir
            }
        };

        Ok(Box::new(FolderSource {
            dir,
            dimensions: None,
        }))
    }
}

/// Stream over the newest image file in one folder.
struct FolderSource {
    dir: PathBuf,
    dimensions: Option<(u32, u32)>,
}

impl FolderSource {
    /// The newest frame file, by modification time then name.
    fn latest_frame(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.dir).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FRAME_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            })
            .max_by_key(|p| {
                let mtime = p
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (mtime, p.clone())
            })
    }

    fn load_frame(&self, path: &Path) -> Result<RgbaImage, CameraError> {
        image::open(path)
            .map(|img| img.to_rgba8())
            .map_err(|e| CameraError::Frame(format!("{}: {e}", path.display())))
    }
}

impl VideoSource for FolderSource {
    fn dimensions(&mut self) -> Option<(u32, u32)> {
        if self.dimensions.is_none() {
            let path = self.latest_frame()?;
            let frame = self.load_frame(&path).ok()?;
            self.dimensions = Some(frame.dimensions());
        }
        self.dimensions
    }

    fn grab_into(&mut self, surface: &mut RgbaImage) -> Result<(), CameraError> {
        let path = self
            .latest_frame()
            .ok_or_else(|| CameraError::Frame("no frame available".to_string()))?;
        let frame = self.load_frame(&path)?;
        self.dimensions = Some(frame.dimensions());
        if surface.dimensions() == frame.dimensions() {
            surface.copy_from_slice(frame.as_raw());
        } else {
            *surface = frame;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.dimensions = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn write_frame(dir: &Path, name: &str, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_enumerate_lists_subdirectories() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("back-dock")).unwrap();
        std::fs::create_dir(root.path().join("front-desk")).unwrap();

        let provider = FolderProvider::new(root.path().to_path_buf());
        let devices = provider.enumerate().unwrap();
        let ids: Vec<&str> = devices.iter().map(|d| d.device_id.as_str()).collect();
        assert_eq!(ids, ["back-dock", "front-desk"]);
    }

    #[test]
    fn test_enumerate_without_subdirs_yields_default() {
        let root = tempdir().unwrap();
        let provider = FolderProvider::new(root.path().to_path_buf());
        let devices = provider.enumerate().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].label, "Default");
    }

    #[test]
    fn test_open_default_prefers_environment_facing() {
        let root = tempdir().unwrap();
        std::fs::create_dir(root.path().join("aaa")).unwrap();
        std::fs::create_dir(root.path().join("back-dock")).unwrap();
        write_frame(&root.path().join("back-dock"), "frame_001.png", 6, 4);

        let provider = FolderProvider::new(root.path().to_path_buf());
        let mut source = provider.open(None).unwrap();
        assert_eq!(source.dimensions(), Some((6, 4)));
    }

    #[test]
    fn test_open_unknown_device_fails() {
        let root = tempdir().unwrap();
        let provider = FolderProvider::new(root.path().to_path_buf());
        assert!(matches!(
            provider.open(Some("nope")),
            Err(CameraError::DeviceNotFound)
        ));
    }

    #[test]
    fn test_not_ready_until_first_frame() {
        let root = tempdir().unwrap();
        let provider = FolderProvider::new(root.path().to_path_buf());
        let mut source = provider.open(None).unwrap();
        assert_eq!(source.dimensions(), None);

        write_frame(root.path(), "frame_001.png", 8, 8);
        assert_eq!(source.dimensions(), Some((8, 8)));
    }

    #[test]
    fn test_grab_reuses_surface_and_tracks_newest() {
        let root = tempdir().unwrap();
        write_frame(root.path(), "frame_001.png", 8, 8);

        let provider = FolderProvider::new(root.path().to_path_buf());
        let mut source = provider.open(None).unwrap();

        let mut surface = RgbaImage::new(8, 8);
        source.grab_into(&mut surface).unwrap();
        assert_eq!(surface.get_pixel(0, 0)[0], 10);

        // A new frame with different dimensions reallocates the surface.
        write_frame(root.path(), "frame_002.png", 4, 4);
        source.grab_into(&mut surface).unwrap();
        assert_eq!(surface.dimensions(), (4, 4));
    }

    #[test]
    fn test_grab_without_frames_is_frame_error() {
        let root = tempdir().unwrap();
        let provider = FolderProvider::new(root.path().to_path_buf());
        let mut source = provider.open(None).unwrap();
        let mut surface = RgbaImage::new(1, 1);
        assert!(matches!(
            source.grab_into(&mut surface),
            Err(CameraError::Frame(_))
        ));
    }
}
