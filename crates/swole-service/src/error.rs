//! Service error types.

use std::path::PathBuf;

use swole_core::ExerciseKind;

/// Service error types
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] swole_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Keypoint file {} is invalid: {source}", path.display())]
    KeypointFile {
        path: PathBuf,
        #[source]
        source: swole_core::Error,
    },

    #[error("Request has {frames} frames, limit is {limit}")]
    TooManyFrames { frames: usize, limit: usize },

    #[error("Corpus for {exercise} unavailable: {reason}")]
    Corpus {
        exercise: ExerciseKind,
        reason: String,
    },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ServiceError::Io {
            path: path.into(),
            source,
        }
    }

    /// The pipeline error underneath, if any
    pub fn core(&self) -> Option<&swole_core::Error> {
        match self {
            ServiceError::Core(e) | ServiceError::KeypointFile { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
