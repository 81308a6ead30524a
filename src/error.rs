//! Error types for respirar
//!
//! All fallible operations return [`Result`] with [`RespirarError`].

use thiserror::Error;

/// Errors that can occur during artifact loading and prediction
#[derive(Error, Debug)]
pub enum RespirarError {
    /// IO error during file operations
    #[error("IO error: {message}")]
    IoError {
        /// Description of the IO failure
        message: String,
    },

    /// Artifact file does not exist
    #[error("Artifact not found: {path}")]
    ArtifactNotFound {
        /// Path that was checked
        path: String,
    },

    /// Artifact bytes do not conform to the AQR format
    #[error("Invalid artifact format: {reason}")]
    FormatError {
        /// What made the artifact invalid
        reason: String,
    },

    /// Prediction requested while artifacts are not loaded
    #[error("Artifacts unavailable: {reason}")]
    ArtifactsUnavailable {
        /// Why loading failed at startup
        reason: String,
    },

    /// Feature vector has the wrong shape
    #[error("Invalid shape: {reason}")]
    InvalidShape {
        /// Expected vs actual dimensions
        reason: String,
    },

    /// Model or scaler parameters fail a structural check
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Which parameter is out of range
        reason: String,
    },
}

impl From<std::io::Error> for RespirarError {
    fn from(err: std::io::Error) -> Self {
        RespirarError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RespirarError {
    fn from(err: serde_json::Error) -> Self {
        RespirarError::FormatError {
            reason: format!("JSON payload: {err}"),
        }
    }
}

/// Result type alias for respirar operations
pub type Result<T> = std::result::Result<T, RespirarError>;
