#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod cli;
pub use cli::{Cli, Commands, FileCommands, MetricArg, PeriodArg};

mod commands;

mod config;
pub use config::{AnalysisConfig, AppConfig, OptimizerConfig};

mod io;
pub use io::{IOArgs, OutputArgs};
