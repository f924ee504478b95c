//! Form evaluation service.
//!
//! Loads per-exercise reference corpora from disk on first use and scores
//! incoming repetitions against them. A single [`FormEvaluator`] can be
//! shared between any number of concurrent requests.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod loader;

pub use self::config::*;
pub use error::{ServiceError, ServiceResult};
pub use evaluator::*;
pub use loader::*;
