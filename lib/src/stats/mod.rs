//! Regularized baseline ratings.
//!
//! [`BaselineStats`] estimates every rating as
//! `movie_baseline[movie] + user_offset[user]`, where both terms are blended
//! averages: a movie's mean rating shrunk toward the global mean, and a user's
//! mean residual (rating minus movie baseline) shrunk toward the mean of all
//! residuals. The two-stage prior is deliberate and changes numeric output
//! compared with shrinking offsets toward zero.
//!
//! # Example
//!
//! ```rust
//! use cinefactor::dataset::{RatingRecord, Ratings};
//! use cinefactor::stats::{Baseline, BaselineStats};
//!
//! let ratings = Ratings::new(vec![
//!     RatingRecord::new(0, 0, 0, 4.0),
//!     RatingRecord::new(1, 0, 0, 2.0),
//!     RatingRecord::new(1, 1, 0, 5.0),
//! ]);
//!
//! let mut stats = BaselineStats::new();
//! stats.load(ratings).unwrap();
//! stats.compute().unwrap();
//!
//! let estimate = stats.get_baseline(0, 1).unwrap();
//! assert!(estimate.is_finite());
//! ```

use tracing::{debug, info};

use crate::config::StatsConfig;
use crate::dataset::Ratings;
use crate::error::{FactorError, IdKind, Result};

pub mod aggregate;
mod snapshot;

pub use snapshot::StatsSnapshot;

use aggregate::{blended_averages, indexed_sum_and_count, offsets, pooled_average};

/// Anything able to produce a baseline rating estimate for a `(user, movie)` pair.
///
/// Implemented by a computed [`BaselineStats`] and by a reloaded [`StatsSnapshot`].
/// Implementors are read-only once built and may be shared between engines.
pub trait Baseline: Send + Sync + std::fmt::Debug {
    /// `movie_baseline[movie] + user_offset[user]`.
    ///
    /// # Errors
    /// - [`FactorError::IllegalState`] if the aggregates have not been computed.
    /// - [`FactorError::UnknownId`] if an id lies outside the training set's range.
    fn get_baseline(&self, user: usize, movie: usize) -> Result<f64>;
}

/// Aggregates produced by [`BaselineStats::compute`].
#[derive(Debug, Clone)]
struct Computed {
    global_average: f64,
    offset_global_average: f64,
    movie_baseline: Vec<f64>,
    movie_rating_sum: Vec<f64>,
    movie_rating_count: Vec<u32>,
    user_offset: Vec<f64>,
    user_offset_sum: Vec<f64>,
    user_rating_count: Vec<u32>,
}

/// Baseline statistics over a training set.
///
/// Created empty, loaded once with a training set, computed once, and
/// read-only afterwards. [`BaselineStats::snapshot`] drops the training set
/// and keeps only the aggregate arrays for persistence.
#[derive(Debug, Clone, Default)]
pub struct BaselineStats {
    config: StatsConfig,
    data_set: Option<Ratings>,
    num_users: usize,
    num_movies: usize,
    computed: Option<Computed>,
}

impl BaselineStats {
    /// Empty stats with the default blending ratio.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StatsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Records the training set and sizes the user / movie arrays from it.
    ///
    /// Replaces any previously loaded set and discards earlier aggregates.
    ///
    /// # Errors
    /// [`FactorError::EmptyData`] if the set holds no records.
    pub fn load(&mut self, data_set: Ratings) -> Result<()> {
        self.num_users = data_set.user_bound()?;
        self.num_movies = data_set.movie_bound()?;
        self.data_set = Some(data_set);
        self.computed = None;
        Ok(())
    }

    /// Computes global, per-movie, and per-user aggregates from the loaded set.
    ///
    /// # Errors
    /// - [`FactorError::IllegalState`] if no training set is loaded.
    /// - [`FactorError::Shape`] if internal index / value arrays disagree in length.
    /// - [`FactorError::Numeric`] if the average of offsets is undefined.
    pub fn compute(&mut self) -> Result<()> {
        let data_set = self.data_set.as_ref().ok_or_else(|| {
            FactorError::IllegalState(
                "no data set loaded: call BaselineStats::load before compute".into(),
            )
        })?;
        let ratio = self.config.blending_ratio;
        let movies = data_set.movie_column();
        let users = data_set.user_column();
        let ratings = data_set.rating_column();

        let (movie_rating_sum, movie_rating_count) = indexed_sum_and_count(&movies, &ratings)?;
        let global_average = ratings.iter().sum::<f64>() / ratings.len() as f64;
        let movie_baseline =
            blended_averages(&movie_rating_sum, &movie_rating_count, global_average, ratio);

        let residuals = offsets(&movies, &ratings, &movie_baseline)?;
        let (user_offset_sum, user_rating_count) = indexed_sum_and_count(&users, &residuals)?;
        let offset_global_average = pooled_average(&user_offset_sum, &user_rating_count)?;
        let user_offset = blended_averages(
            &user_offset_sum,
            &user_rating_count,
            offset_global_average,
            ratio,
        );

        info!(
            records = data_set.len(),
            users = self.num_users,
            movies = self.num_movies,
            global_average,
            offset_global_average,
            "computed baseline stats"
        );
        debug!(blending_ratio = ratio, "blended movie and user averages");

        self.computed = Some(Computed {
            global_average,
            offset_global_average,
            movie_baseline,
            movie_rating_sum,
            movie_rating_count,
            user_offset,
            user_offset_sum,
            user_rating_count,
        });
        Ok(())
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// The loaded training set, if any.
    pub fn data_set(&self) -> Option<&Ratings> {
        self.data_set.as_ref()
    }

    /// `1 + max(user id)` of the loaded set (zero before loading).
    pub fn num_users(&self) -> usize {
        self.num_users
    }

    /// `1 + max(movie id)` of the loaded set (zero before loading).
    pub fn num_movies(&self) -> usize {
        self.num_movies
    }

    fn computed(&self) -> Result<&Computed> {
        self.computed.as_ref().ok_or_else(|| {
            FactorError::IllegalState(
                "baseline stats not computed: call BaselineStats::compute first".into(),
            )
        })
    }

    /// Mean rating over the whole training set.
    pub fn global_average(&self) -> Result<f64> {
        Ok(self.computed()?.global_average)
    }

    /// Mean of all per-record residuals; the prior for user offsets.
    pub fn offset_global_average(&self) -> Result<f64> {
        Ok(self.computed()?.offset_global_average)
    }

    pub fn movie_baseline(&self) -> Result<&[f64]> {
        Ok(&self.computed()?.movie_baseline)
    }

    pub fn user_offset(&self) -> Result<&[f64]> {
        Ok(&self.computed()?.user_offset)
    }

    pub fn movie_rating_sum(&self) -> Result<&[f64]> {
        Ok(&self.computed()?.movie_rating_sum)
    }

    pub fn movie_rating_count(&self) -> Result<&[u32]> {
        Ok(&self.computed()?.movie_rating_count)
    }

    pub fn user_offset_sum(&self) -> Result<&[f64]> {
        Ok(&self.computed()?.user_offset_sum)
    }

    pub fn user_rating_count(&self) -> Result<&[u32]> {
        Ok(&self.computed()?.user_rating_count)
    }

    /// Copies the aggregates into a persistable snapshot without the training set.
    ///
    /// # Errors
    /// [`FactorError::IllegalState`] if the aggregates have not been computed.
    pub fn snapshot(&self) -> Result<StatsSnapshot> {
        let computed = self.computed()?;
        Ok(StatsSnapshot {
            global_average: computed.global_average,
            offset_global_average: computed.offset_global_average,
            movie_baseline: computed.movie_baseline.clone(),
            user_offset: computed.user_offset.clone(),
            movie_rating_count: computed.movie_rating_count.clone(),
            user_rating_count: computed.user_rating_count.clone(),
        })
    }
}

impl Baseline for BaselineStats {
    fn get_baseline(&self, user: usize, movie: usize) -> Result<f64> {
        let computed = self.computed()?;
        lookup_baseline(&computed.movie_baseline, &computed.user_offset, user, movie)
    }
}

pub(crate) fn lookup_baseline(
    movie_baseline: &[f64],
    user_offset: &[f64],
    user: usize,
    movie: usize,
) -> Result<f64> {
    let movie_avg = movie_baseline.get(movie).ok_or(FactorError::UnknownId {
        kind: IdKind::Movie,
        id: movie,
        bound: movie_baseline.len(),
    })?;
    let user_off = user_offset.get(user).ok_or(FactorError::UnknownId {
        kind: IdKind::User,
        id: user,
        bound: user_offset.len(),
    })?;
    Ok(movie_avg + user_off)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::DEFAULT_BLENDING_RATIO;
    use crate::dataset::RatingRecord;
    use approx::assert_abs_diff_eq;

    pub(crate) fn simple_train_points() -> Ratings {
        [
            (1, 2, 1.0),
            (3, 4, 2.0),
            (5, 1, 3.0),
            (2, 3, 4.0),
            (4, 5, 5.0),
            (1, 3, 1.0),
            (5, 2, 2.0),
        ]
        .into_iter()
        .map(|(user, movie, rating)| RatingRecord::new(user, movie, 0, rating))
        .collect()
    }

    pub(crate) fn simple_stats() -> BaselineStats {
        let mut stats = BaselineStats::new();
        stats.load(simple_train_points()).unwrap();
        stats.compute().unwrap();
        stats
    }

    #[test]
    fn test_load_sizes_arrays() {
        let mut stats = BaselineStats::new();
        stats.load(simple_train_points()).unwrap();
        assert_eq!(stats.num_users(), 6);
        assert_eq!(stats.num_movies(), 6);
        assert!(!stats.is_computed());
    }

    #[test]
    fn test_load_empty_set_fails() {
        let mut stats = BaselineStats::new();
        let err = stats.load(Ratings::default()).unwrap_err();
        assert!(matches!(err, FactorError::EmptyData(_)));
    }

    #[test]
    fn test_compute_without_load_is_illegal_state() {
        let mut stats = BaselineStats::new();
        assert!(matches!(stats.compute(), Err(FactorError::IllegalState(_))));
    }

    #[test]
    fn test_get_baseline_before_compute_is_illegal_state() {
        let mut stats = BaselineStats::new();
        assert!(matches!(
            stats.get_baseline(1, 2),
            Err(FactorError::IllegalState(_))
        ));
        stats.load(simple_train_points()).unwrap();
        assert!(matches!(
            stats.get_baseline(1, 2),
            Err(FactorError::IllegalState(_))
        ));
    }

    #[test]
    fn test_global_average_is_mean_rating() {
        let stats = simple_stats();
        assert_abs_diff_eq!(stats.global_average().unwrap(), 18.0 / 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_movie_sums_and_counts() {
        let stats = simple_stats();
        assert_eq!(
            stats.movie_rating_sum().unwrap(),
            &[0.0, 3.0, 3.0, 5.0, 2.0, 5.0]
        );
        assert_eq!(stats.movie_rating_count().unwrap(), &[0, 1, 2, 2, 1, 1]);
    }

    #[test]
    fn test_movie_baseline_blends_toward_global_average() {
        let stats = simple_stats();
        let g = 18.0 / 7.0;
        let b = DEFAULT_BLENDING_RATIO;
        let expected_movie_3 = (g * b + 5.0) / (b + 2.0);
        assert_abs_diff_eq!(stats.movie_baseline().unwrap()[3], expected_movie_3, epsilon = 1e-12);
    }

    #[test]
    fn test_movie_without_ratings_equals_global_average() {
        let stats = simple_stats();
        // movie 0 never appears in the training set
        assert_eq!(stats.movie_rating_count().unwrap()[0], 0);
        assert_eq!(
            stats.movie_baseline().unwrap()[0],
            stats.global_average().unwrap()
        );
    }

    #[test]
    fn test_user_offsets_use_average_offset_as_prior() {
        let stats = simple_stats();
        let baselines = stats.movie_baseline().unwrap().to_vec();
        let b = DEFAULT_BLENDING_RATIO;

        let residuals: Vec<f64> = simple_train_points()
            .iter()
            .map(|r| r.rating as f64 - baselines[r.movie])
            .collect();
        let prior = residuals.iter().sum::<f64>() / residuals.len() as f64;
        assert_abs_diff_eq!(stats.offset_global_average().unwrap(), prior, epsilon = 1e-12);

        // user 1 rated movies 2 and 3 (records 0 and 5)
        let user_1 = (prior * b + residuals[0] + residuals[5]) / (b + 2.0);
        assert_abs_diff_eq!(stats.user_offset().unwrap()[1], user_1, epsilon = 1e-12);

        // user 0 never rated anything
        assert_eq!(stats.user_offset().unwrap()[0], prior);
    }

    #[test]
    fn test_get_baseline_sums_movie_and_user_terms() {
        let stats = simple_stats();
        let expected = stats.movie_baseline().unwrap()[4] + stats.user_offset().unwrap()[3];
        assert_eq!(stats.get_baseline(3, 4).unwrap(), expected);
    }

    #[test]
    fn test_get_baseline_unknown_ids() {
        let stats = simple_stats();
        assert!(matches!(
            stats.get_baseline(0, 6),
            Err(FactorError::UnknownId { kind: IdKind::Movie, id: 6, bound: 6 })
        ));
        assert!(matches!(
            stats.get_baseline(9, 1),
            Err(FactorError::UnknownId { kind: IdKind::User, .. })
        ));
    }

    #[test]
    fn test_custom_blending_ratio() {
        let mut stats = BaselineStats::with_config(StatsConfig { blending_ratio: 0.0 });
        stats.load(simple_train_points()).unwrap();
        stats.compute().unwrap();
        // without blending, a rated movie's baseline is its plain mean
        assert_abs_diff_eq!(stats.movie_baseline().unwrap()[2], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_reload_discards_previous_aggregates() {
        let mut stats = simple_stats();
        stats
            .load(Ratings::new(vec![RatingRecord::new(0, 0, 0, 3.0)]))
            .unwrap();
        assert!(!stats.is_computed());
        assert_eq!(stats.num_users(), 1);
    }

    #[test]
    fn test_snapshot_before_compute_fails() {
        let stats = BaselineStats::new();
        assert!(matches!(stats.snapshot(), Err(FactorError::IllegalState(_))));
    }
}
