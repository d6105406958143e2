//! Benchmark utilities for cinefactor.
//!
//! - Synthetic rating sets with known latent structure
//! - Timing and summary statistics for the path comparison binary

pub mod data;
pub mod utils;

pub use data::{SyntheticRatings, SyntheticSpec};
pub use utils::{benchmark_fn, time_fn, BenchmarkStats};
