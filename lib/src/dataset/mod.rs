//! Rating records and in-memory rating sets.
//!
//! A rating set is an ordered sequence of `(user, movie, time, rating)` records.
//! User and movie ids are dense, zero-based array indices: everything sized from
//! a set uses `max_id + 1` entries.
//!
//! # Example
//!
//! ```rust
//! use cinefactor::config::ColumnLayout;
//! use cinefactor::dataset::Ratings;
//!
//! let rows = [[1.0, 2.0, 0.0, 4.0], [3.0, 1.0, 0.0, 5.0]];
//! let ratings = Ratings::from_rows(&rows, &ColumnLayout::default()).unwrap();
//!
//! assert_eq!(ratings.len(), 2);
//! assert_eq!(ratings.user_bound().unwrap(), 4);
//! assert_eq!(ratings.movie_bound().unwrap(), 3);
//! ```

use crate::error::{FactorError, Result};

mod rows;

/// One observed (or to-be-predicted) rating event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingRecord {
    pub user: usize,
    pub movie: usize,
    /// Carried through but unused by the baseline and factorization math.
    pub time: i64,
    pub rating: f32,
}

impl RatingRecord {
    pub fn new(user: usize, movie: usize, time: i64, rating: f32) -> Self {
        Self {
            user,
            movie,
            time,
            rating,
        }
    }
}

/// An ordered, in-memory set of rating records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ratings {
    records: Vec<RatingRecord>,
}

impl Ratings {
    pub fn new(records: Vec<RatingRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RatingRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RatingRecord> {
        self.records.iter()
    }

    /// `1 + max(user id)`: the number of rows needed to index every user.
    ///
    /// # Errors
    /// - [`FactorError::EmptyData`] if the set holds no records.
    /// - [`FactorError::InvalidRecord`] if the largest id is `usize::MAX`.
    pub fn user_bound(&self) -> Result<usize> {
        self.records
            .iter()
            .map(|r| r.user)
            .max()
            .ok_or_else(|| FactorError::EmptyData("no records to size users from".into()))
            .and_then(|max| id_bound("user", max))
    }

    /// `1 + max(movie id)`: the number of rows needed to index every movie.
    ///
    /// # Errors
    /// - [`FactorError::EmptyData`] if the set holds no records.
    /// - [`FactorError::InvalidRecord`] if the largest id is `usize::MAX`.
    pub fn movie_bound(&self) -> Result<usize> {
        self.records
            .iter()
            .map(|r| r.movie)
            .max()
            .ok_or_else(|| FactorError::EmptyData("no records to size movies from".into()))
            .and_then(|max| id_bound("movie", max))
    }

    pub fn user_column(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.user).collect()
    }

    pub fn movie_column(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.movie).collect()
    }

    /// Ratings widened to `f64` for aggregate statistics.
    pub fn rating_column(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.rating as f64).collect()
    }

    /// Consecutive chunks of at most `batch_size` records (the last may be shorter).
    ///
    /// A `batch_size` of zero is treated as one.
    pub fn batches(&self, batch_size: usize) -> std::slice::Chunks<'_, RatingRecord> {
        self.records.chunks(batch_size.max(1))
    }
}

fn id_bound(kind: &str, max: usize) -> Result<usize> {
    max.checked_add(1).ok_or_else(|| {
        FactorError::InvalidRecord(format!("{kind} id {max} is too large to size an array"))
    })
}

impl From<Vec<RatingRecord>> for Ratings {
    fn from(records: Vec<RatingRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<RatingRecord> for Ratings {
    fn from_iter<I: IntoIterator<Item = RatingRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Ratings {
    type Item = &'a RatingRecord;
    type IntoIter = std::slice::Iter<'a, RatingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
