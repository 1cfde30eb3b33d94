//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur while setting up ICC transforms.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to create a built-in profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Failed to create a transform between two profiles.
    #[error("failed to create transform: {0}")]
    TransformFailed(String),

    /// The supplied bytes are not a valid ICC profile.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// The supplied profile is not a CMYK profile.
    #[error("color space mismatch: expected CMYK, got {actual}")]
    ColorSpaceMismatch {
        /// Actual color space of the profile.
        actual: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
