//! Command-line interface definition and parsing.

use crate::{IOArgs, OutputArgs};
use clap::{Parser, Subcommand, ValueEnum};
use fxo_analytics::{
    analysis::{Period, TrendMetric},
    stats::Variance,
};
use fxo_core::{
    failure::ValidationError,
    models::{CurrencyCode, Date, parse_date},
};
use std::path::PathBuf;
use uuid::Uuid;

/// Command-line arguments for the exchange analytics pipeline.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "APP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Commands,
}

/// The pipeline stages, plus the flat-file tools.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recompute derived process fields and reconcile transactions with the store
    Sync {
        /// Where the report goes
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Report KPIs, correlations, a currency comparison and a trend
    Analyze {
        /// Transactions from this currency form the first comparison sample
        #[arg(value_parser = currency)]
        currency_a: CurrencyCode,

        /// Transactions from this currency form the second comparison sample
        #[arg(value_parser = currency)]
        currency_b: CurrencyCode,

        /// Ignore activity before this date (YYYY-MM-DD, inclusive)
        #[arg(long, value_parser = parse_date)]
        since: Option<Date>,

        /// Ignore activity after this date (YYYY-MM-DD, inclusive)
        #[arg(long, value_parser = parse_date)]
        until: Option<Date>,

        /// The measure whose trend is estimated (overrides the configuration)
        #[arg(long)]
        metric: Option<MetricArg>,

        /// The trend's bucket width (overrides the configuration)
        #[arg(long)]
        period: Option<PeriodArg>,

        /// Use Welch's test instead of the pooled-variance test
        #[arg(long)]
        welch: bool,

        /// Where the result goes
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Recommend a resource allocation for a process
    Optimize {
        /// The process identifier
        process: Uuid,

        /// The budget to allocate
        #[arg(long, allow_hyphen_values = true)]
        budget: f64,

        /// Efficiency improvement in percent
        #[arg(
            long,
            allow_hyphen_values = true,
            required_unless_present = "recorded",
            conflicts_with = "recorded"
        )]
        efficiency: Option<f64>,

        /// Take the efficiency improvement from the latest optimization record
        #[arg(long)]
        recorded: bool,

        /// Saturate volume with this marginal decay per unit (overrides the configuration)
        #[arg(long)]
        decay: Option<f64>,

        /// Where the allocation goes
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Work on flat CSV files instead of the store
    File {
        /// Which file tool to run
        #[command(subcommand)]
        command: FileCommands,
    },
}

/// Flat-file counterparts of the pipeline stages.
#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Normalize dates, add month and year, round metrics and drop duplicates
    Etl {
        /// Raw CSV in, normalized CSV out
        #[command(flatten)]
        io: IOArgs,
    },

    /// Report KPIs, correlations, a scenario comparison and a monthly trend
    Analyze {
        /// CSV in, JSON out
        #[command(flatten)]
        io: IOArgs,

        /// The metric column whose daily total and trend are reported
        #[arg(long)]
        metric: String,

        /// First scenario column
        #[arg(long)]
        scenario_a: String,

        /// Second scenario column
        #[arg(long)]
        scenario_b: String,

        /// Use Welch's test instead of the pooled-variance test
        #[arg(long)]
        welch: bool,

        /// Cost columns summed into a total cost, comma separated
        #[arg(long = "cost", value_delimiter = ',')]
        cost_columns: Vec<String>,
    },
}

/// Trend measures selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MetricArg {
    /// Summed amounts
    Volume,
    /// Mean rate
    Rate,
}

impl From<MetricArg> for TrendMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Volume => Self::Volume,
            MetricArg::Rate => Self::Rate,
        }
    }
}

/// Trend periods selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PeriodArg {
    /// Calendar days
    Day,
    /// Calendar months
    Month,
}

impl From<PeriodArg> for Period {
    fn from(value: PeriodArg) -> Self {
        match value {
            PeriodArg::Day => Self::Day,
            PeriodArg::Month => Self::Month,
        }
    }
}

pub(crate) fn variance(welch: bool, configured: Variance) -> Variance {
    if welch { Variance::Welch } else { configured }
}

fn currency(value: &str) -> Result<CurrencyCode, ValidationError> {
    CurrencyCode::new(value.trim().to_ascii_uppercase())
}
