use crate::{clarabel::ClarabelEngine, closed_form::ClosedForm, config::SolverConfig};
use fxo_core::{
    failure::SolveFailure,
    models::{Allocation, AllocationProblem},
    ports::AllocationEngine,
};

/// Dispatches linear problems to the closed form and everything else to Clarabel.
#[derive(Default)]
pub struct AutoEngine {
    closed_form: ClosedForm,
    general: ClarabelEngine,
}

impl AutoEngine {
    /// Create a dispatcher whose general engine honors the given limits
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            closed_form: ClosedForm,
            general: ClarabelEngine::new(config),
        }
    }
}

impl AllocationEngine for AutoEngine {
    fn supports(&self, _problem: &AllocationProblem) -> bool {
        true
    }

    fn solve(&self, problem: &AllocationProblem) -> Result<Allocation, SolveFailure> {
        if self.closed_form.supports(problem) {
            tracing::debug!("solving linear allocation in closed form");
            self.closed_form.solve(problem)
        } else {
            tracing::debug!("solving nonlinear allocation with clarabel");
            self.general.solve(problem)
        }
    }
}
