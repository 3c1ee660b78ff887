use crate::{AppConfig, Cli, Commands, FileCommands, cli::variance};
use fxo_analytics::{
    analysis::{AnalysisScope, analyze},
    etl::synchronize,
    legacy::{FileAnalysisOptions, file_analyze, file_etl},
    optimizer::{EfficiencyOptimizer, VolumeModel},
};
use fxo_core::models::{DatasetQuery, ProcessId};
use fxo_solver::AutoEngine;
use fxo_sqlite::Db;

impl Cli {
    /// Run the selected command against the layered configuration
    pub async fn evaluate(self) -> anyhow::Result<()> {
        let config = AppConfig::load(&self)?;
        tracing::debug!(?config, "configuration loaded");
        let AppConfig {
            database,
            solver,
            analysis,
            optimizer,
        } = config;

        match self.command {
            Commands::Sync { output } => {
                let db = Db::open(&database).await?;
                let report = synchronize(&db).await?;
                output.json(&report)?;
            }

            Commands::Analyze {
                currency_a,
                currency_b,
                since,
                until,
                metric,
                period,
                welch,
                output,
            } => {
                let scope = AnalysisScope {
                    window: DatasetQuery { since, until },
                    currency_a,
                    currency_b,
                    trend_metric: metric.map_or(analysis.trend_metric, Into::into),
                    period: period.map_or(analysis.period, Into::into),
                    variance: variance(welch, analysis.variance),
                };

                let db = Db::open(&database).await?;
                let result = analyze(&db, &scope).await?;
                output.json(&result)?;
            }

            Commands::Optimize {
                process,
                budget,
                efficiency,
                decay,
                output,
                ..
            } => {
                let volume_model = match decay {
                    Some(decay) => VolumeModel::DiminishingReturns { decay },
                    None => optimizer.volume_model,
                };
                let optimizer = EfficiencyOptimizer::new(AutoEngine::new(&solver))
                    .with_volume_model(volume_model);
                let process_id = ProcessId::from(process);

                let db = Db::open(&database).await?;
                // clap guarantees exactly one of --efficiency and --recorded
                let result = match efficiency {
                    Some(pct) => optimizer.optimize(&db, process_id, budget, pct).await?,
                    None => optimizer.optimize_recorded(&db, process_id, budget).await?,
                };
                output.json(&result)?;
            }

            Commands::File { command } => match command {
                FileCommands::Etl { io } => {
                    file_etl(io.read()?, io.output().write()?)?;
                }
                FileCommands::Analyze {
                    io,
                    metric,
                    scenario_a,
                    scenario_b,
                    welch,
                    cost_columns,
                } => {
                    let options = FileAnalysisOptions {
                        metric,
                        scenario_a,
                        scenario_b,
                        variance: variance(welch, analysis.variance),
                        cost_columns,
                    };
                    let result = file_analyze(io.read()?, &options)?;
                    io.output().json(&result)?;
                }
            },
        }

        Ok(())
    }
}
