//! Camera capture: device abstraction and the capture-session state machine.
//!
//! This module provides:
//! - Device enumeration and frame sources (`device`)
//! - The per-run capture session and its manager (`session`)

pub mod device;
pub mod session;

pub use device::{CameraDevice, CameraProvider, FolderProvider, VideoSource};
pub use session::{CaptureConfig, CaptureManager, CaptureState, SessionEvent};
