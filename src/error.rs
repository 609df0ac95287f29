/// Error types for the facility reporter
///
/// Every failure is caught where it happens and turned into a toast by the
/// controller; these types only travel as far as that boundary.
/// Validation, capture and geolocation failures have their own small enums
/// because their messages are shown to the user verbatim.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ReporterError>;

/// Top-level error for storage, media and composition failures
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("thumbnail generation failed: {0}")]
    Thumbnail(String),

    #[error("invalid report: {0}")]
    InvalidReport(String),

    #[error("report {0} not found")]
    NotFound(i64),
}

/// Missing input at submission time. Blocks the submit, never the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a location for the issue")]
    MissingLocation,

    #[error("Please add at least one photo of the issue")]
    NoImages,

    #[error("Please enter a title for the issue")]
    EmptyTitle,
}

/// Camera frame could not be turned into an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Camera is not ready, please try again.")]
    NotReady,

    #[error("Failed to capture photo. Please try again.")]
    EmptyFrame,

    #[error("Could not access the camera. It may not be available on this device.")]
    Unavailable,
}

/// Device position could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Geolocation is not supported on this device")]
    Unsupported,

    #[error("Unable to get your location: {0}")]
    Denied(String),
}
