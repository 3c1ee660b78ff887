//! The efficiency optimizer.
//!
//! Given a process, a budget and an efficiency improvement, find the
//! allocation of units that maximizes exchange volume while the cost, priced
//! at the process's exchange rate, stays within the budget.

use crate::PipelineError;
use fxo_core::{
    failure::{NotFound, ValidationError},
    models::{AllocationProblem, CostCurve, CurrencyCode, ProcessId, VolumeCurve},
    ports::{AllocationEngine, ProcessRepository},
};
use fxo_solver::AutoEngine;
use serde::{Deserialize, Serialize};

/// How exchange volume responds to allocated units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VolumeModel {
    /// Every unit yields `1 + pct/100` volume
    #[default]
    Linear,
    /// The marginal yield falls by `decay` per unit, so volume saturates
    DiminishingReturns {
        /// Loss of marginal volume per allocated unit
        decay: f64,
    },
}

impl VolumeModel {
    fn curve(self, efficiency_improvement_pct: f64) -> VolumeCurve {
        let linear = VolumeCurve::from_efficiency(efficiency_improvement_pct);
        match (self, linear) {
            (Self::DiminishingReturns { decay }, VolumeCurve::Linear { gain }) => {
                VolumeCurve::Quadratic { gain, decay }
            }
            (_, curve) => curve,
        }
    }
}

/// The recommended allocation for a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Units of resource to allocate
    pub optimal_resource_allocation: f64,
    /// The exchange volume those units yield
    pub max_exchange_volume: f64,
    /// What those units cost
    pub total_cost: f64,
    /// Source currency of the process's first transaction
    pub from_currency: CurrencyCode,
    /// Target currency of the process's first transaction
    pub to_currency: CurrencyCode,
    /// The rate used to price a unit
    pub exchange_rate: f64,
}

/// Allocates budgets to processes with a pluggable engine.
pub struct EfficiencyOptimizer<E = AutoEngine> {
    engine: E,
    volume_model: VolumeModel,
}

impl Default for EfficiencyOptimizer {
    fn default() -> Self {
        Self::new(AutoEngine::default())
    }
}

impl<E: AllocationEngine> EfficiencyOptimizer<E> {
    /// An optimizer with a linear volume model
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            volume_model: VolumeModel::default(),
        }
    }

    /// Replace the volume model
    pub fn with_volume_model(mut self, volume_model: VolumeModel) -> Self {
        self.volume_model = volume_model;
        self
    }

    /// Optimize the allocation for a process.
    ///
    /// The unit price is the latest rate, published on or before the process
    /// start, for the currency pair of the process's first transaction.
    ///
    /// # Errors
    ///
    /// - `Validation` for a negative or non-finite budget, a non-finite
    ///   percentage, or a negative rate with a zero budget
    /// - `NotFound` when the process, its first transaction or the rate is missing
    /// - `Infeasible` for a non-positive rate or a solver that does not converge
    #[tracing::instrument(skip(self, store))]
    pub async fn optimize<S: ProcessRepository>(
        &self,
        store: &S,
        process_id: ProcessId,
        budget: f64,
        efficiency_improvement_pct: f64,
    ) -> Result<AllocationResult, PipelineError<S::Error>> {
        if !budget.is_finite() {
            return Err(ValidationError::NonFinite("budget").into());
        }
        if budget < 0.0 {
            return Err(ValidationError::NegativeBudget(budget).into());
        }
        if !efficiency_improvement_pct.is_finite() {
            return Err(ValidationError::NonFinite("efficiency_improvement").into());
        }

        let process = store
            .get_process(process_id)
            .await
            .map_err(PipelineError::Store)?
            .ok_or(NotFound::Process(process_id))?;

        let first = store
            .first_transaction(process_id)
            .await
            .map_err(PipelineError::Store)?
            .ok_or(NotFound::Transaction(process_id))?;

        let rate = store
            .rate_on_or_before(&first.from_currency, &first.to_currency, process.start_date)
            .await
            .map_err(PipelineError::Store)?
            .ok_or_else(|| NotFound::Rate {
                from: first.from_currency.clone(),
                to: first.to_currency.clone(),
                date: process.start_date,
            })?;

        let problem = AllocationProblem {
            volume: self.volume_model.curve(efficiency_improvement_pct),
            cost: CostCurve::Linear { rate: rate.rate },
            budget,
        };
        let allocation = self.engine.solve(&problem)?;

        tracing::debug!(
            units = allocation.units,
            volume = allocation.volume,
            rate = rate.rate,
            "allocated"
        );

        Ok(AllocationResult {
            optimal_resource_allocation: allocation.units,
            max_exchange_volume: allocation.volume,
            total_cost: allocation.cost,
            from_currency: rate.from,
            to_currency: rate.to,
            exchange_rate: rate.rate,
        })
    }

    /// Optimize with the efficiency improvement of the process's latest
    /// optimization record.
    #[tracing::instrument(skip(self, store))]
    pub async fn optimize_recorded<S: ProcessRepository>(
        &self,
        store: &S,
        process_id: ProcessId,
        budget: f64,
    ) -> Result<AllocationResult, PipelineError<S::Error>> {
        let optimization = store
            .latest_optimization(process_id)
            .await
            .map_err(PipelineError::Store)?;

        match optimization {
            Some(optimization) => {
                self.optimize(store, process_id, budget, optimization.efficiency_improvement)
                    .await
            }
            // distinguish a missing process from a process without records
            None => match store
                .get_process(process_id)
                .await
                .map_err(PipelineError::Store)?
            {
                Some(_) => Err(NotFound::Optimization(process_id).into()),
                None => Err(NotFound::Process(process_id).into()),
            },
        }
    }
}
