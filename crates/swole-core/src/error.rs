//! Error types for the form evaluation pipeline.

use thiserror::Error;

use crate::types::FormLabel;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Normalization failed: no frame out of {frames} has a measurable torso length")]
    Normalization { frames: usize },

    #[error("Degenerate {segment} vector (zero length) at usable frame {frame}")]
    DegenerateVector { frame: usize, segment: &'static str },

    #[error("Feature channel '{channel}' has no usable frames")]
    EmptyChannel { channel: &'static str },

    #[error("Reference corpus has no {label} entries")]
    EmptyPool { label: FormLabel },

    #[error("Bad-form aggregate score is zero; percentage is undefined")]
    ZeroDenominator,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
