/// Lifecycle of a factorization engine.
///
/// `Uninitialized → (set_train_points, set_stats, initialize) → Initialized → (train / train_more) → Trained`.
///
/// Prediction is valid from `Initialized` on. Replacing the training set drops
/// the feature matrices and returns the engine to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No feature matrices exist.
    #[default]
    Uninitialized,
    /// Matrices are allocated and filled with the initial feature value.
    Initialized,
    /// At least one epoch has run since the last initialization.
    Trained,
}

impl EngineState {
    /// Whether feature matrices exist (and predictions can be made).
    pub fn has_factors(self) -> bool {
        !matches!(self, EngineState::Uninitialized)
    }
}

/// Counters describing the work an engine has done.
///
/// Cumulative over the engine's lifetime; re-initialization does not reset them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingProgress {
    /// Completed `update_all_features` calls.
    pub epochs: usize,
    /// Feature sweeps run by the reference path.
    pub reference_sweeps: usize,
    /// Feature sweeps run by the accelerated path.
    pub accelerated_sweeps: usize,
    /// Times the feature matrices were (re)allocated.
    pub initializations: usize,
}
