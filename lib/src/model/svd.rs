//! SGD matrix factorization over baseline residuals.
//!
//! Each rating is modelled as `baseline(user, movie) + users[user] · movies[movie]`.
//! Training sweeps one latent feature at a time: for every training record the
//! prediction error is computed and the user's and movie's entries for that
//! feature take one regularized gradient step, both from their pre-update values.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cinefactor::dataset::{RatingRecord, Ratings};
//! use cinefactor::model::{Model, SvdEngine};
//! use cinefactor::stats::BaselineStats;
//!
//! let train: Ratings = [(0, 0, 4.0), (0, 1, 3.0), (1, 0, 5.0), (1, 1, 2.0)]
//!     .into_iter()
//!     .map(|(u, m, r)| RatingRecord::new(u, m, 0, r))
//!     .collect();
//!
//! let mut stats = BaselineStats::new();
//! stats.load(train.clone()).unwrap();
//! stats.compute().unwrap();
//!
//! let mut engine = SvdEngine::default();
//! engine.train(train.clone(), Arc::new(stats), 5).unwrap();
//! let predictions = engine.predict(&train).unwrap();
//! assert_eq!(predictions.len(), 4);
//! ```

use std::sync::Arc;

use ndarray::{Array2, ArrayView1, ShapeBuilder};
use tracing::{debug, info};

use super::{EngineState, FactorParams, Model, TrainingProgress};
use crate::config::{ExecutionPath, SvdConfig};
use crate::dataset::Ratings;
use crate::error::{FactorError, IdKind, Result};
use crate::metrics;
use crate::stats::Baseline;
use crate::sweep::{self, PointColumns};

/// Learned per-user and per-movie feature matrices.
///
/// Stored column-major so a single feature's column is contiguous.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Factors {
    pub(crate) users: Array2<f32>,
    pub(crate) movies: Array2<f32>,
}

impl Factors {
    fn filled(num_users: usize, num_movies: usize, num_features: usize, value: f32) -> Self {
        Self {
            users: Array2::from_elem((num_users, num_features).f(), value),
            movies: Array2::from_elem((num_movies, num_features).f(), value),
        }
    }

    fn user_row(&self, user: usize) -> Result<ArrayView1<'_, f32>> {
        if user >= self.users.nrows() {
            return Err(FactorError::UnknownId {
                kind: IdKind::User,
                id: user,
                bound: self.users.nrows(),
            });
        }
        Ok(self.users.row(user))
    }

    fn movie_row(&self, movie: usize) -> Result<ArrayView1<'_, f32>> {
        if movie >= self.movies.nrows() {
            return Err(FactorError::UnknownId {
                kind: IdKind::Movie,
                id: movie,
                bound: self.movies.nrows(),
            });
        }
        Ok(self.movies.row(movie))
    }
}

/// SGD factorization engine.
///
/// Owns its feature matrices exclusively; the baseline is shared read-only
/// through an `Arc`. Cloning deep-copies the matrices and shares the baseline,
/// which is how parallel experiments should fork an engine.
#[derive(Debug, Clone, Default)]
pub struct SvdEngine {
    config: SvdConfig,
    train_points: Ratings,
    stats: Option<Arc<dyn Baseline>>,
    factors: Option<Factors>,
    point_cache: Option<PointColumns>,
    state: EngineState,
    progress: TrainingProgress,
}

impl SvdEngine {
    pub fn new(config: SvdConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SvdConfig {
        &self.config
    }

    pub fn num_features(&self) -> usize {
        self.config.num_features
    }

    pub fn learn_rate(&self) -> f32 {
        self.config.learn_rate
    }

    pub fn feature_initial(&self) -> f32 {
        self.config.feature_initial
    }

    pub fn k_factor(&self) -> f32 {
        self.config.k_factor
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn progress(&self) -> TrainingProgress {
        self.progress
    }

    pub fn train_points(&self) -> &Ratings {
        &self.train_points
    }

    pub fn stats(&self) -> Option<&Arc<dyn Baseline>> {
        self.stats.as_ref()
    }

    /// User feature matrix, `(max_user, num_features)`, once initialized.
    pub fn users(&self) -> Option<&Array2<f32>> {
        self.factors.as_ref().map(|f| &f.users)
    }

    /// Movie feature matrix, `(max_movie, num_features)`, once initialized.
    pub fn movies(&self) -> Option<&Array2<f32>> {
        self.factors.as_ref().map(|f| &f.movies)
    }

    /// Number of user rows in the current matrices (zero when uninitialized).
    pub fn max_user(&self) -> usize {
        self.users().map_or(0, |u| u.nrows())
    }

    /// Number of movie rows in the current matrices (zero when uninitialized).
    pub fn max_movie(&self) -> usize {
        self.movies().map_or(0, |m| m.nrows())
    }

    /// `1 + max(user id)` over the current training points.
    pub fn calculate_max_user(&self) -> Result<usize> {
        self.train_points.user_bound()
    }

    /// `1 + max(movie id)` over the current training points.
    pub fn calculate_max_movie(&self) -> Result<usize> {
        self.train_points.movie_bound()
    }

    /// Allocates both feature matrices at the sizes of the current training
    /// points, every entry set to `feature_initial`.
    ///
    /// # Errors
    /// [`FactorError::EmptyData`] if no training points are set.
    pub fn initialize_users_and_movies(&mut self) -> Result<()> {
        let num_users = self.calculate_max_user()?;
        let num_movies = self.calculate_max_movie()?;
        self.factors = Some(Factors::filled(
            num_users,
            num_movies,
            self.config.num_features,
            self.config.feature_initial,
        ));
        self.state = EngineState::Initialized;
        self.progress.initializations += 1;
        debug!(
            users = num_users,
            movies = num_movies,
            features = self.config.num_features,
            "initialized feature matrices"
        );
        Ok(())
    }

    fn factors(&self) -> Result<&Factors> {
        self.factors.as_ref().ok_or_else(|| {
            FactorError::IllegalState(
                "feature matrices not initialized: train or initialize the engine first".into(),
            )
        })
    }

    fn baseline(&self) -> Result<&dyn Baseline> {
        self.stats.as_deref().ok_or_else(|| {
            FactorError::IllegalState("no baseline stats set: call set_stats first".into())
        })
    }

    fn check_feature(&self, feature: usize) -> Result<()> {
        if feature >= self.config.num_features {
            return Err(FactorError::Shape {
                expected: format!("feature index below {}", self.config.num_features),
                got: format!("feature {feature}"),
            });
        }
        Ok(())
    }

    /// `baseline(user, movie) + users[user, :] · movies[movie, :]`.
    pub fn calculate_prediction(&self, user: usize, movie: usize) -> Result<f64> {
        let factors = self.factors()?;
        let dot = factors.user_row(user)?.dot(&factors.movie_row(movie)?);
        Ok(self.baseline()?.get_baseline(user, movie)? + dot as f64)
    }

    /// `rating - calculate_prediction(user, movie)`.
    pub fn calculate_prediction_error(&self, user: usize, movie: usize, rating: f64) -> Result<f64> {
        Ok(rating - self.calculate_prediction(user, movie)?)
    }

    /// One simultaneous gradient step on `users[user, feature]` and
    /// `movies[movie, feature]`.
    ///
    /// Both new values are computed from the same pre-update pair `(u, m)`:
    ///
    /// ```text
    /// users[user, feature]   = u + learn_rate * (error * m - k_factor * u)
    /// movies[movie, feature] = m + learn_rate * (error * u - k_factor * m)
    /// ```
    pub fn update_user_and_movie(
        &mut self,
        user: usize,
        movie: usize,
        feature: usize,
        error: f64,
    ) -> Result<()> {
        self.check_feature(feature)?;
        let (learn_rate, k_factor) = (self.config.learn_rate, self.config.k_factor);
        let factors = self.factors.as_mut().ok_or_else(|| {
            FactorError::IllegalState("feature matrices not initialized".into())
        })?;
        let (u, m) = {
            let u = *factors.users.get((user, feature)).ok_or(FactorError::UnknownId {
                kind: IdKind::User,
                id: user,
                bound: factors.users.nrows(),
            })?;
            let m = *factors.movies.get((movie, feature)).ok_or(FactorError::UnknownId {
                kind: IdKind::Movie,
                id: movie,
                bound: factors.movies.nrows(),
            })?;
            (u, m)
        };
        let error = error as f32;
        factors.users[(user, feature)] = u + learn_rate * (error * m - k_factor * u);
        factors.movies[(movie, feature)] = m + learn_rate * (error * u - k_factor * m);
        Ok(())
    }

    /// Reference sweep: for every training point, compute its prediction error
    /// and apply [`Self::update_user_and_movie`] for `feature`.
    pub fn update_feature(&mut self, feature: usize) -> Result<()> {
        self.for_each_point_update(feature, |engine, user, movie, feature, error| {
            engine.update_user_and_movie(user, movie, feature, error)
        })?;
        self.progress.reference_sweeps += 1;
        Ok(())
    }

    /// Visits every training point exactly once, in order, handing its
    /// `(user, movie, feature, error)` to `apply`.
    fn for_each_point_update<F>(&mut self, feature: usize, mut apply: F) -> Result<()>
    where
        F: FnMut(&mut Self, usize, usize, usize, f64) -> Result<()>,
    {
        self.check_feature(feature)?;
        for index in 0..self.train_points.len() {
            let record = self.train_points.records()[index];
            let error =
                self.calculate_prediction_error(record.user, record.movie, record.rating as f64)?;
            apply(self, record.user, record.movie, feature, error)?;
        }
        Ok(())
    }

    /// Accelerated sweep over `feature`; same numeric contract as
    /// [`Self::update_feature`].
    pub fn update_feature_accelerated(&mut self, feature: usize) -> Result<()> {
        self.check_feature(feature)?;
        if self.point_cache.is_none() {
            let cache = PointColumns::build(&self.train_points, self.baseline()?)?;
            self.point_cache = Some(cache);
        }
        let (learn_rate, k_factor) = (self.config.learn_rate, self.config.k_factor);
        let factors = self.factors.as_mut().ok_or_else(|| {
            FactorError::IllegalState("feature matrices not initialized".into())
        })?;
        if let Some(points) = self.point_cache.as_ref() {
            sweep::sweep_feature(
                &mut factors.users,
                &mut factors.movies,
                points,
                feature,
                learn_rate,
                k_factor,
            );
        }
        self.progress.accelerated_sweeps += 1;
        Ok(())
    }

    /// One epoch: every feature swept exactly once by the configured path.
    pub fn update_all_features(&mut self) -> Result<()> {
        for feature in 0..self.config.num_features {
            match self.config.execution {
                ExecutionPath::Reference => self.update_feature(feature)?,
                ExecutionPath::Accelerated => self.update_feature_accelerated(feature)?,
            }
        }
        self.progress.epochs += 1;
        self.state = EngineState::Trained;
        Ok(())
    }

    fn run_epochs(&mut self, epochs: usize) -> Result<()> {
        info!(
            epochs,
            records = self.train_points.len(),
            users = self.max_user(),
            movies = self.max_movie(),
            features = self.config.num_features,
            learn_rate = self.config.learn_rate,
            k_factor = self.config.k_factor,
            path = ?self.config.execution,
            "training factorization"
        );
        for epoch in 0..epochs {
            self.update_all_features()?;
            if self.config.verbose {
                let rmse = self.rmse(&self.train_points)?;
                info!(epoch, rmse, "epoch finished");
            } else {
                debug!(epoch, "epoch finished");
            }
        }
        Ok(())
    }

    /// Root-mean-square error of predictions against the ratings in `points`.
    pub fn rmse(&self, points: &Ratings) -> Result<f64> {
        let predictions = self.predict(points)?;
        let targets: Vec<f64> = points.rating_column();
        metrics::rmse(&targets, &predictions)
    }

    /// Predictions for `points` in contiguous chunks of `batch_size` records.
    ///
    /// Concatenating the chunks gives the same output as [`Model::predict`].
    pub fn predict_batches(&self, points: &Ratings, batch_size: usize) -> Result<Vec<Vec<f64>>> {
        points
            .batches(batch_size)
            .map(|batch| {
                batch
                    .iter()
                    .map(|r| self.calculate_prediction(r.user, r.movie))
                    .collect::<Result<Vec<f64>>>()
            })
            .collect()
    }

    /// Copies the learned matrices and hyperparameters for persistence.
    ///
    /// # Errors
    /// [`FactorError::IllegalState`] if the matrices are not initialized.
    pub fn extract_params(&self) -> Result<FactorParams> {
        let factors = self.factors()?;
        Ok(FactorParams::from_factors(self.config, factors))
    }

    /// Restores an engine ready for prediction from saved factors and a baseline.
    ///
    /// The restored engine holds no training points: `train_more(None, ..)` is an
    /// [`FactorError::IllegalState`], and `train_more` with new points
    /// re-initializes it as usual.
    pub fn from_params(params: FactorParams, stats: Arc<dyn Baseline>) -> Result<Self> {
        let config = params.config;
        let factors = params.into_factors()?;
        Ok(Self {
            config,
            stats: Some(stats),
            factors: Some(factors),
            state: EngineState::Trained,
            ..Self::default()
        })
    }
}

impl Model for SvdEngine {
    /// Replaces the training set and drops the matrices sized from the old one.
    fn set_train_points(&mut self, train_points: Ratings) {
        self.train_points = train_points;
        self.point_cache = None;
        self.factors = None;
        self.state = EngineState::Uninitialized;
    }

    fn set_stats(&mut self, stats: Arc<dyn Baseline>) {
        self.stats = Some(stats);
        self.point_cache = None;
    }

    fn train(
        &mut self,
        train_points: Ratings,
        stats: Arc<dyn Baseline>,
        epochs: usize,
    ) -> Result<()> {
        self.set_train_points(train_points);
        self.set_stats(stats);
        self.initialize_users_and_movies()?;
        self.run_epochs(epochs)
    }

    fn train_more(&mut self, train_points: Option<Ratings>, epochs: usize) -> Result<()> {
        match train_points {
            Some(points) => {
                self.set_train_points(points);
                self.initialize_users_and_movies()?;
            }
            None if !self.state.has_factors() => {
                if self.train_points.is_empty() {
                    return Err(FactorError::IllegalState(
                        "train_more without training points on an untrained engine".into(),
                    ));
                }
                self.initialize_users_and_movies()?;
            }
            None if self.train_points.is_empty() => {
                return Err(FactorError::IllegalState(
                    "train_more without training points: the engine was restored from saved factors"
                        .into(),
                ));
            }
            None => {}
        }
        self.run_epochs(epochs)
    }

    fn predict(&self, points: &Ratings) -> Result<Vec<f64>> {
        if !self.state.has_factors() {
            return Err(FactorError::IllegalState(
                "cannot predict before the feature matrices are initialized".into(),
            ));
        }
        points
            .iter()
            .map(|r| self.calculate_prediction(r.user, r.movie))
            .collect()
    }
}
