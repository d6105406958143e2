//! Column layout, default hyperparameters, and engine configuration.
//!
//! Nothing in the crate reads ambient globals: the column layout is handed to
//! [`Ratings`](crate::dataset::Ratings) constructors, the blending ratio lives in
//! [`StatsConfig`], and the factorization hyperparameters in [`SvdConfig`].

use serde::{Deserialize, Serialize};

/// Default number of latent features per user / movie.
pub const DEFAULT_NUM_FEATURES: usize = 3;
/// Default SGD step size.
pub const DEFAULT_LEARN_RATE: f32 = 0.001;
/// Default value every feature entry starts from.
pub const DEFAULT_FEATURE_INITIAL: f32 = 0.1;
/// Default L2 regularization coefficient applied in each update.
pub const DEFAULT_K_FACTOR: f32 = 0.015;
/// Default number of virtual prior ratings used when blending averages.
pub const DEFAULT_BLENDING_RATIO: f64 = 25.0;

/// Positions of the four record fields within a fixed-width numeric row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub user: usize,
    pub movie: usize,
    pub time: usize,
    pub rating: usize,
}

impl ColumnLayout {
    /// Minimum row width able to hold every column of this layout.
    pub fn width(&self) -> usize {
        1 + self.user.max(self.movie).max(self.time).max(self.rating)
    }
}

impl Default for ColumnLayout {
    /// `(user, movie, time, rating)` in that order.
    fn default() -> Self {
        Self {
            user: 0,
            movie: 1,
            time: 2,
            rating: 3,
        }
    }
}

/// Which implementation runs a per-feature sweep.
///
/// Both paths follow the same numeric contract and agree to four decimal
/// places given identical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionPath {
    /// Record-by-record sweep through the engine's own prediction and update methods.
    #[default]
    Reference,
    /// Columnar sweep over cached point data and contiguous feature columns.
    Accelerated,
}

/// Settings for [`BaselineStats`](crate::stats::BaselineStats).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Number of pseudo-ratings equal to the prior mean blended into each average.
    pub blending_ratio: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            blending_ratio: DEFAULT_BLENDING_RATIO,
        }
    }
}

/// Hyperparameters of the SGD factorization engine, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvdConfig {
    pub num_features: usize,
    pub learn_rate: f32,
    pub feature_initial: f32,
    pub k_factor: f32,
    pub execution: ExecutionPath,
    /// Log the training RMSE after every epoch.
    pub verbose: bool,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            num_features: DEFAULT_NUM_FEATURES,
            learn_rate: DEFAULT_LEARN_RATE,
            feature_initial: DEFAULT_FEATURE_INITIAL,
            k_factor: DEFAULT_K_FACTOR,
            execution: ExecutionPath::Reference,
            verbose: false,
        }
    }
}

impl SvdConfig {
    /// Starts a fluent builder from the defaults.
    pub fn builder() -> SvdConfigBuilder {
        SvdConfigBuilder::new()
    }
}

/// Fluent builder for [`SvdConfig`].
///
/// Defaults:
/// - `num_features`: 3
/// - `learn_rate`: 0.001
/// - `feature_initial`: 0.1
/// - `k_factor`: 0.015
/// - `execution`: `Reference`
/// - `verbose`: false
#[derive(Debug, Clone, Default)]
pub struct SvdConfigBuilder {
    config: SvdConfig,
}

impl SvdConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_features(mut self, num_features: usize) -> Self {
        self.config.num_features = num_features;
        self
    }

    pub fn learn_rate(mut self, learn_rate: f32) -> Self {
        self.config.learn_rate = learn_rate;
        self
    }

    pub fn feature_initial(mut self, feature_initial: f32) -> Self {
        self.config.feature_initial = feature_initial;
        self
    }

    pub fn k_factor(mut self, k_factor: f32) -> Self {
        self.config.k_factor = k_factor;
        self
    }

    /// Selects the sweep implementation.
    pub fn execution(mut self, execution: ExecutionPath) -> Self {
        self.config.execution = execution;
        self
    }

    /// Shorthand for `execution(ExecutionPath::Accelerated)` when `true`.
    pub fn run_accelerated(self, accelerated: bool) -> Self {
        self.execution(if accelerated {
            ExecutionPath::Accelerated
        } else {
            ExecutionPath::Reference
        })
    }

    /// When `true`, the engine computes and logs training RMSE per epoch.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> SvdConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_user_movie_time_rating() {
        let layout = ColumnLayout::default();
        assert_eq!(
            (layout.user, layout.movie, layout.time, layout.rating),
            (0, 1, 2, 3)
        );
        assert_eq!(layout.width(), 4);
    }

    #[test]
    fn test_layout_width_follows_highest_column() {
        let layout = ColumnLayout {
            user: 4,
            movie: 0,
            time: 2,
            rating: 1,
        };
        assert_eq!(layout.width(), 5);
    }

    #[test]
    fn test_svd_config_defaults() {
        let config = SvdConfig::default();
        assert_eq!(config.num_features, 3);
        assert_eq!(config.learn_rate, 0.001);
        assert_eq!(config.feature_initial, DEFAULT_FEATURE_INITIAL);
        assert_eq!(config.k_factor, DEFAULT_K_FACTOR);
        assert_eq!(config.execution, ExecutionPath::Reference);
        assert!(!config.verbose);
    }

    #[test]
    fn test_builder_chaining() {
        let config = SvdConfig::builder()
            .num_features(8)
            .learn_rate(0.01)
            .feature_initial(0.2)
            .k_factor(0.5)
            .run_accelerated(true)
            .verbose(true)
            .build();

        assert_eq!(config.num_features, 8);
        assert_eq!(config.learn_rate, 0.01);
        assert_eq!(config.feature_initial, 0.2);
        assert_eq!(config.k_factor, 0.5);
        assert_eq!(config.execution, ExecutionPath::Accelerated);
        assert!(config.verbose);
    }

    #[test]
    fn test_builder_custom_feature_count_keeps_default_initial() {
        let config = SvdConfig::builder().num_features(11).build();
        assert_eq!(config.feature_initial, DEFAULT_FEATURE_INITIAL);
    }

    #[test]
    fn test_run_accelerated_false_selects_reference() {
        let config = SvdConfig::builder()
            .execution(ExecutionPath::Accelerated)
            .run_accelerated(false)
            .build();
        assert_eq!(config.execution, ExecutionPath::Reference);
    }

    #[test]
    fn test_stats_config_default_ratio() {
        assert_eq!(StatsConfig::default().blending_ratio, DEFAULT_BLENDING_RATIO);
    }
}
