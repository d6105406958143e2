//! Accelerated feature sweep.
//!
//! During a sweep over feature `f` only column `f` of the user and movie
//! matrices changes, so every record's baseline plus its dot product over the
//! other features is fixed for the whole sweep. This path caches the point
//! columns and baselines once per training set, computes those partial
//! predictions in one pass, and then runs the same simultaneous update as the
//! reference path over the two feature columns alone.

use ndarray::{Array2, ArrayView2};

use crate::dataset::Ratings;
use crate::error::Result;
use crate::stats::Baseline;

/// Training points split into columns, with their baselines resolved.
#[derive(Debug, Clone, Default)]
pub(crate) struct PointColumns {
    users: Vec<usize>,
    movies: Vec<usize>,
    ratings: Vec<f32>,
    baselines: Vec<f64>,
}

impl PointColumns {
    pub(crate) fn build(points: &Ratings, stats: &dyn Baseline) -> Result<Self> {
        let baselines = points
            .iter()
            .map(|r| stats.get_baseline(r.user, r.movie))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            users: points.user_column(),
            movies: points.movie_column(),
            ratings: points.iter().map(|r| r.rating).collect(),
            baselines,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }
}

/// Sweeps `feature` over every cached point exactly once, in point order.
pub(crate) fn sweep_feature(
    users: &mut Array2<f32>,
    movies: &mut Array2<f32>,
    points: &PointColumns,
    feature: usize,
    learn_rate: f32,
    k_factor: f32,
) {
    let partial = partial_dots(users.view(), movies.view(), points, feature);
    let mut user_col = users.column_mut(feature);
    let mut movie_col = movies.column_mut(feature);

    for (i, &rest) in partial.iter().enumerate() {
        let (user, movie) = (points.users[i], points.movies[i]);
        let u = user_col[user];
        let m = movie_col[movie];
        let prediction = points.baselines[i] + (rest + u * m) as f64;
        let error = (points.ratings[i] as f64 - prediction) as f32;
        user_col[user] = u + learn_rate * (error * m - k_factor * u);
        movie_col[movie] = m + learn_rate * (error * u - k_factor * m);
    }
}

/// Dot product of each point's user and movie rows, skipping `feature`.
fn partial_dots(
    users: ArrayView2<'_, f32>,
    movies: ArrayView2<'_, f32>,
    points: &PointColumns,
    feature: usize,
) -> Vec<f32> {
    points
        .users
        .iter()
        .zip(&points.movies)
        .map(|(&user, &movie)| {
            users
                .row(user)
                .iter()
                .zip(movies.row(movie).iter())
                .enumerate()
                .filter(|&(g, _)| g != feature)
                .map(|(_, (u, m))| u * m)
                .sum()
        })
        .collect()
}
