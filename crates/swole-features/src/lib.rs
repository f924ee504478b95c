//! # Swole-Features
//!
//! Turns a normalized [`swole_core::PoseSequence`] into the two scalar time
//! series an exercise is judged on.
//!
//! ## Stages
//!
//! 1. **Side selection**: pick the arm visible to the camera (or use the caller's hint)
//! 2. **Frame filtering**: drop frames missing any joint of the arm chain
//! 3. **Geometry**: unit segment vectors and inter-segment angles
//! 4. **Filtering**: two passes of a length-5 median filter over each angle channel
//!
//! The [`summary`] module provides the min/max statistics shown next to a verdict.

pub mod extractor;
pub mod filtering;
pub mod summary;

pub use extractor::*;
pub use filtering::*;
pub use summary::*;
