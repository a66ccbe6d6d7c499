//! Error types for lumen analyses.

use serde::Serialize;
use thiserror::Error;

/// Coarse error category, stable for callers that branch on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    EmptyImage,
    InvalidConfig,
    Convergence,
    InvalidImage,
}

/// Errors that can occur while analyzing an image.
///
/// Every failure is local to one invocation; no partial result is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Image has no energy: all pixels are zero")]
    EmptyImage,

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(
        "Energy containment search did not reach {target:.6} (reached {reached:.6}) before gamma exceeded {gamma_hi}"
    )]
    Convergence {
        target: f64,
        reached: f64,
        gamma_hi: f64,
    },

    #[error("Invalid image buffer: {0}")]
    InvalidImage(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyImage => ErrorKind::EmptyImage,
            Error::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Error::Convergence { .. } => ErrorKind::Convergence,
            Error::InvalidImage(_) => ErrorKind::InvalidImage,
        }
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
