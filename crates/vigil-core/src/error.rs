//! Error types for the attention pipeline

use std::time::Duration;

use thiserror::Error;

/// Core Vigil errors
#[derive(Error, Debug)]
pub enum VigilError {
    // Resource acquisition errors
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera permission denied")]
    CameraPermissionDenied,

    #[error("Face model failed to load: {0}")]
    ModelLoadFailed(String),

    // Per-frame errors
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Inference timed out after {0:?}")]
    InferenceTimeout(Duration),

    // Reporting errors
    #[error("Report failed: {0}")]
    ReportFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    LoggingInit(String),
}

impl VigilError {
    /// True for errors that prevent a session from starting.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            VigilError::CameraUnavailable(_)
                | VigilError::CameraPermissionDenied
                | VigilError::ModelLoadFailed(_)
        )
    }

    /// Reason suitable for showing to the person being monitored.
    pub fn user_message(&self) -> &'static str {
        match self {
            VigilError::CameraPermissionDenied => {
                "Camera access was denied. Allow camera access to start monitoring."
            }
            VigilError::CameraUnavailable(_) => "No camera could be opened.",
            VigilError::ModelLoadFailed(_) => "The face model could not be loaded.",
            VigilError::ReportFailed(_) | VigilError::NotAuthenticated => {
                "The attention summary could not be sent."
            }
            _ => "Attention monitoring failed.",
        }
    }
}

/// Result type for Vigil operations
pub type VigilResult<T> = Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failures() {
        assert!(VigilError::CameraPermissionDenied.is_acquisition_failure());
        assert!(VigilError::ModelLoadFailed("wasm".into()).is_acquisition_failure());
        assert!(!VigilError::InferenceTimeout(Duration::from_secs(2)).is_acquisition_failure());
        assert!(!VigilError::ReportFailed("500".into()).is_acquisition_failure());
    }

    #[test]
    fn test_user_message_is_specific() {
        assert_ne!(
            VigilError::CameraPermissionDenied.user_message(),
            VigilError::ModelLoadFailed(String::new()).user_message()
        );
    }
}
