//! Error taxonomy for the search and capture pipelines.
//!
//! Search errors are synchronous and reflected directly in UI state. Camera
//! and OCR errors are asynchronous and always recoverable: the capture loop
//! reports them and returns to a restartable state.

use std::time::Duration;
use thiserror::Error;

/// Failures while acquiring or reading a camera device.
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    DeviceNotFound,

    #[error("camera is already in use by another application")]
    DeviceBusy,

    #[error("camera constraints cannot be satisfied: {0}")]
    Unsatisfiable(String),

    #[error("video stream not ready within {0:?}")]
    StreamTimeout(Duration),

    #[error("frame grab failed: {0}")]
    Frame(String),
}

/// Failures in the normalize → lookup query pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid range {start}-{end}: ensure start <= end")]
    RangeInvalid { start: u32, end: u32 },

    #[error("no matching locations found")]
    NoMatches,

    #[error("location not found: {0}")]
    NotFound(String),
}
