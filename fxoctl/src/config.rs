//! Application configuration management.
//!
//! Configuration is merged from defaults, an optional TOML file and
//! environment variables, in increasing order of precedence.

use crate::Cli;
use fxo_analytics::{
    analysis::{Period, TrendMetric},
    optimizer::VolumeModel,
    stats::Variance,
};
use fxo_solver::config::SolverConfig;
use fxo_sqlite::config::SqliteConfig;
use serde::{Deserialize, Serialize};

/// The main application configuration that composes all component configs
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Database configuration (file path, locking)
    #[serde(default)]
    pub database: SqliteConfig,

    /// Limits for the numerical engine
    #[serde(default)]
    pub solver: SolverConfig,

    /// Defaults for the performance analysis
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Defaults for the efficiency optimizer
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Analysis settings the command line can override.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
pub struct AnalysisConfig {
    /// The measure whose trend is estimated
    #[serde(default)]
    pub trend_metric: TrendMetric,

    /// The trend's bucket width
    #[serde(default)]
    pub period: Period,

    /// The comparison's variance assumption
    #[serde(default)]
    pub variance: Variance,
}

/// Optimizer settings the command line can override.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
pub struct OptimizerConfig {
    /// How exchange volume responds to allocated units
    #[serde(default)]
    pub volume_model: VolumeModel,
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest priority)
    /// 2. Config file given by the CLI
    /// 3. Default values (lowest priority)
    ///
    /// Environment variables are mapped using the pattern:
    /// `APP_<SECTION>__<KEY>` maps to `<section>.<key>`
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Persist to a file instead of memory
    /// export APP_DATABASE__DATABASE_PATH="/data/exchange.db"
    ///
    /// # Bound the conic solver
    /// export APP_SOLVER__TIME_LIMIT="500ms"
    ///
    /// # Daily trends by default
    /// export APP_ANALYSIS__PERIOD="day"
    /// ```
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) if path.exists() => Some(config::File::from(path.as_path())),
            Some(path) => {
                return Err(anyhow::anyhow!(
                    "Config file {} does not exist",
                    path.display()
                ));
            }
            None => None,
        };
        Self::layered(file)
    }

    fn layered<S>(file: Option<S>) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut config = config::Config::builder();

        // Start with default values
        config = config.add_source(config::Config::try_from(&Self::default())?);

        if let Some(file) = file {
            config = config.add_source(file);
        }

        // This maps APP_SOLVER__MAX_ITER to solver.max_iter
        config = config.add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        config.build()?.try_deserialize().map_err(Into::into)
    }
}
