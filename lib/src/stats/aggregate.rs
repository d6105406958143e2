//! Indexed accumulation and blended (shrunk) averages.

use crate::error::{FactorError, Result};

/// Sums and counts `values` per index: `sum[indices[i]] += values[i]`, `count[indices[i]] += 1`.
///
/// Both output vectors have `max(indices) + 1` entries; an empty input yields
/// empty outputs.
///
/// # Errors
/// [`FactorError::Shape`] if `indices` and `values` differ in length.
pub fn indexed_sum_and_count(indices: &[usize], values: &[f64]) -> Result<(Vec<f64>, Vec<u32>)> {
    if indices.len() != values.len() {
        return Err(FactorError::Shape {
            expected: format!("{} values to match the index array", indices.len()),
            got: format!("{} values", values.len()),
        });
    }
    let len = indices.iter().max().map_or(0, |max| max + 1);
    let mut sum = vec![0.0; len];
    let mut count = vec![0u32; len];
    for (&index, &value) in indices.iter().zip(values) {
        sum[index] += value;
        count[index] += 1;
    }
    Ok((sum, count))
}

/// Per-record residual `values[i] - averages[indices[i]]`.
///
/// # Errors
/// - [`FactorError::Shape`] if `indices` and `values` differ in length.
/// - [`FactorError::Shape`] if an index falls outside `averages`.
pub fn offsets(indices: &[usize], values: &[f64], averages: &[f64]) -> Result<Vec<f64>> {
    if indices.len() != values.len() {
        return Err(FactorError::Shape {
            expected: format!("{} values to match the index array", indices.len()),
            got: format!("{} values", values.len()),
        });
    }
    indices
        .iter()
        .zip(values)
        .map(|(&index, &value)| {
            averages
                .get(index)
                .map(|avg| value - avg)
                .ok_or_else(|| FactorError::Shape {
                    expected: format!("indices below {}", averages.len()),
                    got: format!("index {index}"),
                })
        })
        .collect()
}

/// `(prior * ratio + sum) / (ratio + count)`: `ratio` virtual observations equal
/// to `prior` pull sparse averages toward it.
///
/// An entry with no observations is exactly `prior`.
pub fn blended_average(sum: f64, count: u32, prior: f64, ratio: f64) -> f64 {
    if count == 0 {
        return prior;
    }
    (prior * ratio + sum) / (ratio + count as f64)
}

/// [`blended_average`] applied element-wise.
pub fn blended_averages(sums: &[f64], counts: &[u32], prior: f64, ratio: f64) -> Vec<f64> {
    sums.iter()
        .zip(counts)
        .map(|(&sum, &count)| blended_average(sum, count, prior, ratio))
        .collect()
}

/// `sum(sums) / sum(counts)`.
///
/// # Errors
/// [`FactorError::Numeric`] if the total count is zero or the ratio is not finite.
pub fn pooled_average(sums: &[f64], counts: &[u32]) -> Result<f64> {
    let total_count: u64 = counts.iter().map(|&c| c as u64).sum();
    if total_count == 0 {
        return Err(FactorError::Numeric(
            "average of offsets is undefined: zero total count".into(),
        ));
    }
    let average = sums.iter().sum::<f64>() / total_count as f64;
    if !average.is_finite() {
        return Err(FactorError::Numeric(format!(
            "average of offsets is not finite: {average}"
        )));
    }
    Ok(average)
}
