use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits for the numerical engine.
///
/// The closed-form engine ignores these; they bound the interior-point solve
/// so that it reports non-convergence instead of running indefinitely.
///
/// # Examples
///
/// ```
/// use fxo_solver::config::SolverConfig;
/// use std::time::Duration;
///
/// let config = SolverConfig {
///     max_iter: 50,
///     time_limit: Duration::from_millis(250),
/// };
/// assert!(config.max_iter < SolverConfig::default().max_iter);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SolverConfig {
    /// Maximum number of interior-point iterations
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,

    /// Wall-clock limit for a single solve
    #[serde(default = "default_time_limit", with = "humantime_serde")]
    pub time_limit: Duration,
}

fn default_max_iter() -> u32 {
    200
}

fn default_time_limit() -> Duration {
    Duration::from_secs(5)
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            time_limit: default_time_limit(),
        }
    }
}
