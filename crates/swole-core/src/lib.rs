//! # Swole-Core
//!
//! Core types for exercise form evaluation: per-frame body keypoints,
//! the 18-part frame pose, and the torso-normalized pose sequence that
//! every later stage of the pipeline consumes.

pub mod error;
pub mod geometry;
pub mod pose;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use pose::*;
pub use types::*;
