//! Error metrics for rating predictions.

use crate::error::{FactorError, Result};

fn check_lengths(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(FactorError::Shape {
            expected: format!("{} predictions", y_true.len()),
            got: format!("{} predictions", y_pred.len()),
        });
    }
    Ok(())
}

/// Mean Squared Error.
///
/// MSE = mean((y_true - y_pred)^2), zero for empty input.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let sum_sq: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    Ok(sum_sq / y_true.len() as f64)
}

/// Root Mean Squared Error, in rating units.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    Ok(mse(y_true, y_pred)?.sqrt())
}

/// Mean Absolute Error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let sum_abs: f64 = y_true.iter().zip(y_pred).map(|(&t, &p)| (t - p).abs()).sum();
    Ok(sum_abs / y_true.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(mse(&y, &y).unwrap(), 0.0);
        assert_eq!(rmse(&y, &y).unwrap(), 0.0);
        assert_eq!(mae(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_known_values() {
        let y_true = [1.0, 2.0, 3.0, 4.0];
        let y_pred = [2.0, 2.0, 1.0, 4.0];
        // errors: -1, 0, 2, 0
        assert_relative_eq!(mse(&y_true, &y_pred).unwrap(), 1.25);
        assert_relative_eq!(rmse(&y_true, &y_pred).unwrap(), 1.25f64.sqrt());
        assert_relative_eq!(mae(&y_true, &y_pred).unwrap(), 0.75);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(rmse(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            mse(&[1.0, 2.0], &[1.0]),
            Err(FactorError::Shape { .. })
        ));
    }
}
