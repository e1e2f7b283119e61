//! Error types for the signature verification system.

use crate::types::InvalidInputReason;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the signature verification system.
#[derive(Error, Debug)]
pub enum Error {
    /// Constant-valued channel, normalization would divide by zero.
    #[error("Degenerate range: channel '{channel}' has max == min")]
    DegenerateRange { channel: String },

    /// Trajectory too short for differencing.
    #[error("Too few samples: {len} (need at least 2)")]
    TooFewSamples { len: usize },

    /// Channels or curves of incompatible shape.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// NaN or infinite value in numeric data.
    #[error("Non-finite value: {0}")]
    NonFinite(String),

    /// Alignment requested on an empty curve.
    #[error("Cannot align an empty curve")]
    EmptyCurve,

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a degenerate range error for a named channel.
    pub fn degenerate_range(channel: impl Into<String>) -> Self {
        Error::DegenerateRange {
            channel: channel.into(),
        }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Error::ShapeMismatch(msg.into())
    }

    /// Create a non-finite value error.
    pub fn non_finite(msg: impl Into<String>) -> Self {
        Error::NonFinite(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// The invalid-input reason this error maps to, if it is recoverable as
    /// a rejection rather than a computation failure.
    pub fn invalid_input_reason(&self) -> Option<InvalidInputReason> {
        match self {
            Error::DegenerateRange { .. } => Some(InvalidInputReason::DegenerateRange),
            Error::TooFewSamples { .. } => Some(InvalidInputReason::TooFewSamples),
            _ => None,
        }
    }
}
