use serde::{Deserialize, Serialize};

use super::{lookup_baseline, Baseline};
use crate::error::Result;
use crate::serialization::Persist;

/// Persistable copy of computed baseline stats, without the training set.
///
/// A snapshot answers [`Baseline::get_baseline`] directly; reloading one never
/// requires `compute()` again. It is not meant for further computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub global_average: f64,
    pub offset_global_average: f64,
    pub movie_baseline: Vec<f64>,
    pub user_offset: Vec<f64>,
    pub movie_rating_count: Vec<u32>,
    pub user_rating_count: Vec<u32>,
}

impl StatsSnapshot {
    pub fn num_users(&self) -> usize {
        self.user_offset.len()
    }

    pub fn num_movies(&self) -> usize {
        self.movie_baseline.len()
    }
}

impl Baseline for StatsSnapshot {
    fn get_baseline(&self, user: usize, movie: usize) -> Result<f64> {
        lookup_baseline(&self.movie_baseline, &self.user_offset, user, movie)
    }
}

impl Persist for StatsSnapshot {}
