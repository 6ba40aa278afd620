//! Error types for autoencoder construction and forward passes.

use thiserror::Error;

/// Result type alias for autoencoder operations
pub type Result<T> = std::result::Result<T, AutoencoderError>;

/// Errors raised while building a network or running a forward pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutoencoderError {
    /// Tensor shape incompatible with a layer
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Actual shape
        actual: String,
    },

    /// Invalid construction parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Batch too small for batch normalization in training mode
    #[error("Batch normalization needs at least {required} samples in training mode, got {actual}")]
    BatchTooSmall {
        /// Minimum batch size required
        required: usize,
        /// Batch size that was supplied
        actual: usize,
    },
}

impl AutoencoderError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
