//! Trainable rating models.
//!
//! [`Model`] is the lifecycle contract every factorization algorithm follows;
//! [`SvdEngine`] is the SGD implementation.

use std::sync::Arc;

use crate::dataset::Ratings;
use crate::error::Result;
use crate::stats::Baseline;

pub mod params;
pub mod state;
pub mod svd;

pub use params::FactorParams;
pub use state::{EngineState, TrainingProgress};
pub use svd::SvdEngine;

/// Lifecycle of a trainable factorization model.
///
/// A model is handed a training set and a baseline, initializes its learned
/// parameters, runs epoch-based optimization, and predicts one rating per
/// input record.
pub trait Model {
    /// Replaces the active training set.
    fn set_train_points(&mut self, train_points: Ratings);

    /// Replaces the baseline used under every prediction.
    fn set_stats(&mut self, stats: Arc<dyn Baseline>);

    /// Resets the model on `train_points` / `stats`, initializes its parameters,
    /// and runs `epochs` full optimization passes.
    fn train(&mut self, train_points: Ratings, stats: Arc<dyn Baseline>, epochs: usize)
        -> Result<()>;

    /// Runs `epochs` more passes.
    ///
    /// Parameters are re-initialized only when new training points are supplied;
    /// otherwise optimization continues from the current state.
    fn train_more(&mut self, train_points: Option<Ratings>, epochs: usize) -> Result<()>;

    /// One prediction per input record, in input order.
    fn predict(&self, points: &Ratings) -> Result<Vec<f64>>;
}
