//! Error types for the laserline library.

use thiserror::Error;

/// Main error type for laserline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Camera parameters cannot produce a projection
    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    /// Shape cannot be rendered (degenerate or non-finite geometry)
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Render or encode parameter out of range
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The output sink was closed; no further points are accepted
    #[error("Point sink is closed")]
    SinkClosed,

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid camera error.
    pub fn camera(msg: impl Into<String>) -> Self {
        Self::InvalidCamera(msg.into())
    }

    /// Create an invalid shape error.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create an invalid parameter error.
    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for errors raised before streaming starts (bad scene or camera).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidCamera(_)
                | Self::InvalidShape(_)
                | Self::InvalidParameter { .. }
                | Self::Config(_)
        )
    }
}

/// Result type alias for laserline operations.
pub type Result<T> = std::result::Result<T, Error>;
