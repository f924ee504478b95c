//! # Swole-Scoring
//!
//! Nearest-neighbour form scoring against a fixed, pre-labeled corpus.
//!
//! A query's two feature channels are compared with every reference entry
//! using dynamic time warping, which tolerates repetitions performed at
//! different speeds. Distances are pooled by the reference label and the
//! pool with the smaller aggregate wins:
//!
//! ```text
//! good_score = mean(d1 over good) + mean(d2 over good)
//! bad_score  = mean(d1 over bad)  + mean(d2 over bad)
//! percentage = -100 * (good_score - bad_score) / bad_score
//! ```

pub mod corpus;
pub mod dtw;
pub mod scorer;

pub use corpus::*;
pub use dtw::*;
pub use scorer::*;
