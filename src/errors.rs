// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo booth

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Color error: {0}")]
    Color(#[from] ColorError),
    #[error("Camera error: {0}")]
    Backend(#[from] BackendError),
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Selection(#[from] SelectionError),
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Invalid layout parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("photo count must be between 1 and 6, got {0}")]
    InvalidCount(u8),
    #[error("unknown orientation '{0}' (expected portrait or landscape)")]
    InvalidOrientation(String),
}

/// Color parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color '{0}', expected 6 hex digits (RRGGBB)")]
    InvalidHex(String),
}

/// Frame source and landmark provider errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The user (or the system) refused access to the camera
    #[error("Camera access denied. Please allow camera access and reload.")]
    PermissionDenied,
    /// No usable frames at the given location
    #[error("no frames found at {0}")]
    NoFrames(PathBuf),
    /// A frame file could not be read or decoded
    #[error("failed to load frame {path}: {reason}")]
    FrameLoad { path: PathBuf, reason: String },
    /// Hand landmark model could not be created
    #[error("hand detection unavailable: {0}")]
    LandmarkInit(String),
    /// Inference on a single frame failed
    #[error("hand detection failed: {0}")]
    Inference(String),
}

/// Errors while turning a frame into a captured photo
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no frame available for capture")]
    NoFrameAvailable,
    #[error("frame has zero dimensions ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("frame data too small: expected {expected} bytes, got {actual}")]
    FrameDataTooSmall { expected: usize, actual: usize },
    #[error("capture task failed: {0}")]
    TaskFailed(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Capture session errors surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please take at least {required} photo{} first.", plural_suffix(.required))]
    NotEnoughPhotos { required: usize, taken: usize },
    #[error("photo store is full ({capacity} photos)")]
    StoreFull { capacity: usize },
}

fn plural_suffix(count: &usize) -> &'static str {
    if *count > 1 { "s" } else { "" }
}

/// Photo selection errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select {required} photos.")]
    Incomplete { required: usize, selected: usize },
    #[error("photo {index} does not exist ({available} captured)")]
    OutOfRange { index: usize, available: usize },
}

/// Strip composition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("selection has {selected} photos but the layout needs {required}")]
    SelectionSize { required: usize, selected: usize },
    #[error("selected photo {0} is not in the photo store")]
    MissingPhoto(usize),
    #[error("render target is {actual:?}, expected {expected:?}")]
    TargetSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Image encoding and saving errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("failed to encode {format}: {reason}")]
    Encode { format: &'static str, reason: String },
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to save {path}: {reason}")]
    Save { path: PathBuf, reason: String },
    #[error("encoding task error: {0}")]
    Task(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_enough_photos_message() {
        let one = SessionError::NotEnoughPhotos { required: 1, taken: 0 };
        assert_eq!(one.to_string(), "Please take at least 1 photo first.");
        let many = SessionError::NotEnoughPhotos { required: 4, taken: 2 };
        assert_eq!(many.to_string(), "Please take at least 4 photos first.");
    }

    #[test]
    fn test_selection_message() {
        let err = SelectionError::Incomplete { required: 3, selected: 1 };
        assert_eq!(err.to_string(), "Please select 3 photos.");
    }

    #[test]
    fn test_session_errors_name_the_numbers() {
        let errors = [
            SessionError::NotEnoughPhotos { required: 2, taken: 1 },
            SessionError::StoreFull { capacity: 4 },
        ];
        for err in errors {
            let text = err.to_string();
            match err {
                SessionError::NotEnoughPhotos { required, .. } => {
                    assert!(text.contains(&required.to_string()))
                }
                SessionError::StoreFull { capacity } => {
                    assert!(text.contains(&capacity.to_string()))
                }
            }
        }
    }

    #[test]
    fn test_app_error_from() {
        let err: AppError = LayoutError::InvalidCount(9).into();
        assert!(matches!(err, AppError::Layout(LayoutError::InvalidCount(9))));
    }
}
