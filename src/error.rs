//! Error types for the confusion-sweep library.

use thiserror::Error;

/// Result type for confusion-sweep operations.
pub type Result<T> = std::result::Result<T, ConfusionError>;

/// Error types that can occur while accumulating matches or building matrices.
#[derive(Error, Debug)]
pub enum ConfusionError {
    /// Malformed or inconsistent box data for a single image.
    ///
    /// The image is excluded from accumulation; other images are unaffected.
    #[error("Invalid input for image '{image_id}': {reason}")]
    InputShape { image_id: String, reason: String },

    /// Malformed box data outside the context of an image.
    #[error("Invalid geometry: {0}")]
    Geometry(String),

    /// Misuse of the evaluator (bad class count, IoU threshold or class index).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid confidence threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfusionError {
    pub(crate) fn input_shape(image_id: &str, reason: impl Into<String>) -> Self {
        Self::InputShape {
            image_id: image_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error only concerns one image's data.
    ///
    /// Recoverable errors exclude that image; everything else should abort the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InputShape { .. } | Self::Geometry(_))
    }
}
