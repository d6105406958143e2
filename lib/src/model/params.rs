use ndarray::{Array2, ShapeBuilder};
use serde::{Deserialize, Serialize};

use super::svd::Factors;
use crate::config::SvdConfig;
use crate::error::{FactorError, Result};
use crate::serialization::Persist;

/// Learned state of an [`SvdEngine`](super::SvdEngine) in a serializable form.
///
/// Matrices are flattened column-major, `num_users * num_features` and
/// `num_movies * num_features` entries long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorParams {
    pub config: SvdConfig,
    pub num_users: usize,
    pub num_movies: usize,
    pub users: Vec<f32>,
    pub movies: Vec<f32>,
}

impl FactorParams {
    pub(crate) fn from_factors(config: SvdConfig, factors: &Factors) -> Self {
        Self {
            config,
            num_users: factors.users.nrows(),
            num_movies: factors.movies.nrows(),
            users: factors.users.t().iter().copied().collect(),
            movies: factors.movies.t().iter().copied().collect(),
        }
    }

    pub(crate) fn into_factors(self) -> Result<Factors> {
        let k = self.config.num_features;
        let users = Array2::from_shape_vec((self.num_users, k).f(), self.users)
            .map_err(|e| shape_error("user", self.num_users, k, e))?;
        let movies = Array2::from_shape_vec((self.num_movies, k).f(), self.movies)
            .map_err(|e| shape_error("movie", self.num_movies, k, e))?;
        Ok(Factors { users, movies })
    }
}

fn shape_error(which: &str, rows: usize, cols: usize, err: ndarray::ShapeError) -> FactorError {
    FactorError::Shape {
        expected: format!("{which} matrix of {rows}x{cols}"),
        got: err.to_string(),
    }
}

impl Persist for FactorParams {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, SvdEngine};
    use crate::serialization::SerializableParams;
    use crate::stats::tests::{simple_stats, simple_train_points};
    use std::sync::Arc;

    fn trained_params() -> FactorParams {
        let mut engine = SvdEngine::default();
        engine
            .train(simple_train_points(), Arc::new(simple_stats()), 3)
            .unwrap();
        engine.extract_params().unwrap()
    }

    #[test]
    fn test_params_flatten_column_major() {
        let params = trained_params();
        let factors = params.clone().into_factors().unwrap();

        assert_eq!(params.users.len(), params.num_users * params.config.num_features);
        // second element of the flat vector is row 1 of feature 0
        assert_eq!(params.users[1], factors.users[(1, 0)]);
        assert_eq!(params.movies[params.num_movies], factors.movies[(0, 1)]);
    }

    #[test]
    fn test_params_bytes_roundtrip() {
        let params = trained_params();
        let bytes = params.to_bytes().unwrap();
        assert_eq!(FactorParams::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn test_params_file_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let params = trained_params();
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("factors.bin");

        params.save_to_file(&path)?;
        let loaded = FactorParams::load_from_file(&path)?;

        assert_eq!(loaded, params);
        Ok(())
    }

    #[test]
    fn test_truncated_params_are_shape_error() {
        let mut params = trained_params();
        params.movies.pop();
        assert!(matches!(
            params.into_factors(),
            Err(FactorError::Shape { .. })
        ));
    }
}
