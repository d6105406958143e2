//! Construction of [`Ratings`] from fixed-width numeric rows.

use ndarray::ArrayView2;

use super::{RatingRecord, Ratings};
use crate::config::ColumnLayout;
use crate::error::{FactorError, Result};

impl Ratings {
    /// Builds a rating set from row slices laid out according to `layout`.
    ///
    /// # Errors
    /// - [`FactorError::Shape`] if a row is narrower than the layout requires.
    /// - [`FactorError::InvalidRecord`] if an id is negative or fractional, or a
    ///   value is not finite.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], layout: &ColumnLayout) -> Result<Self> {
        let width = layout.width();
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                let row = row.as_ref();
                if row.len() < width {
                    return Err(FactorError::Shape {
                        expected: format!("rows of at least {width} columns"),
                        got: format!("row {i} with {} columns", row.len()),
                    });
                }
                record_from_values(i, |col| row[col], layout)
            })
            .collect::<Result<Vec<_>>>()
            .map(Ratings::new)
    }

    /// Builds a rating set from a 2-D array with one record per row.
    ///
    /// Accepts any element type that widens losslessly to `f64` (e.g. `i32`, `f32`).
    ///
    /// # Errors
    /// Same as [`Ratings::from_rows`].
    pub fn from_array<T>(array: ArrayView2<'_, T>, layout: &ColumnLayout) -> Result<Self>
    where
        T: Copy + Into<f64>,
    {
        let (n_rows, n_cols) = array.dim();
        let width = layout.width();
        if n_cols < width {
            return Err(FactorError::Shape {
                expected: format!("(_, {width})"),
                got: format!("({n_rows}, {n_cols})"),
            });
        }
        array
            .outer_iter()
            .enumerate()
            .map(|(i, row)| record_from_values(i, |col| row[col].into(), layout))
            .collect::<Result<Vec<_>>>()
            .map(Ratings::new)
    }
}

fn record_from_values<F>(row: usize, value: F, layout: &ColumnLayout) -> Result<RatingRecord>
where
    F: Fn(usize) -> f64,
{
    let user = to_index(row, "user", value(layout.user))?;
    let movie = to_index(row, "movie", value(layout.movie))?;
    let time = value(layout.time);
    let rating = value(layout.rating);
    if !time.is_finite() || !rating.is_finite() {
        return Err(FactorError::InvalidRecord(format!(
            "row {row}: time {time} and rating {rating} must be finite"
        )));
    }
    Ok(RatingRecord::new(user, movie, time as i64, rating as f32))
}

/// Largest id a numeric row may carry.
const MAX_ID: f64 = u32::MAX as f64;

fn to_index(row: usize, what: &str, value: f64) -> Result<usize> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(FactorError::InvalidRecord(format!(
            "row {row}: {what} id {value} is not a non-negative integer"
        )));
    }
    if value > MAX_ID {
        return Err(FactorError::InvalidRecord(format!(
            "row {row}: {what} id {value} exceeds {MAX_ID}"
        )));
    }
    Ok(value as usize)
}
