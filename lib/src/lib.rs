//! # cinefactor
//!
//! Baseline-plus-latent-factor rating prediction for user × movie data.
//!
//! ## Core Design Principles
//!
//! - **Baseline first**: [`stats::BaselineStats`] blends global, per-movie and
//!   per-user averages toward their priors; factorization only learns the residual.
//! - **One lifecycle contract**: every factorization algorithm implements
//!   [`model::Model`] (`set_train_points`, `set_stats`, `train`, `train_more`, `predict`).
//! - **Interchangeable execution paths**: [`model::SvdEngine`] sweeps features either
//!   record by record or over cached columns, selected by [`config::ExecutionPath`].
//!   Both paths follow the same numeric contract.
//! - **Typed failures**: fallible operations return [`error::Result`]; calling a step
//!   before its prerequisite is an [`error::FactorError::IllegalState`], never a panic.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cinefactor::config::{ColumnLayout, SvdConfig};
//! use cinefactor::dataset::Ratings;
//! use cinefactor::model::{Model, SvdEngine};
//! use cinefactor::stats::BaselineStats;
//!
//! # fn main() -> cinefactor::Result<()> {
//! // user, movie, time, rating
//! let rows = [
//!     [1.0, 2.0, 0.0, 1.0],
//!     [3.0, 4.0, 0.0, 2.0],
//!     [5.0, 1.0, 0.0, 3.0],
//!     [2.0, 3.0, 0.0, 4.0],
//! ];
//! let train = Ratings::from_rows(&rows, &ColumnLayout::default())?;
//!
//! let mut stats = BaselineStats::new();
//! stats.load(train.clone())?;
//! stats.compute()?;
//!
//! let mut engine = SvdEngine::new(SvdConfig::builder().run_accelerated(true).build());
//! engine.train(train.clone(), Arc::new(stats), 10)?;
//! let predictions = engine.predict(&train)?;
//! assert_eq!(predictions.len(), train.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `config`: column layout, hyperparameters and execution path selection
//! - `dataset`: rating records and their construction from numeric rows
//! - `stats`: blended baseline estimates and persistable snapshots
//! - `model`: the `Model` lifecycle and the SGD factorization engine
//! - `metrics`: prediction error metrics
//! - `serialization`: byte and file persistence
//! - `submission`: prediction output writer

/// Column layout, defaults and engine configuration.
pub mod config;

/// Rating records and training sets.
pub mod dataset;

pub mod error;

/// Prediction error metrics.
pub mod metrics;

/// Trainable factorization models.
pub mod model;

/// Persistence of snapshots and learned factors.
pub mod serialization;

/// Baseline rating statistics.
pub mod stats;

pub mod submission;

mod sweep;

pub use config::{ExecutionPath, SvdConfig};
pub use dataset::{RatingRecord, Ratings};
pub use error::{FactorError, Result};
pub use model::{Model, SvdEngine};
pub use stats::{Baseline, BaselineStats, StatsSnapshot};
