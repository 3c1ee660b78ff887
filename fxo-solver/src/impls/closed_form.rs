use fxo_core::{
    failure::{SolveFailure, ValidationError},
    models::{Allocation, AllocationProblem, VolumeCurve},
    ports::AllocationEngine,
};

/// Exact solver for linear volume and linear cost.
///
/// With `volume(x) = g * x` and `cost(x) = r * x`, r > 0, the objective grows
/// without bound while the constraint caps x at `budget / r`. For g > 0 the
/// optimum therefore sits on the budget boundary with the constraint active;
/// otherwise spending nothing is optimal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedForm;

impl AllocationEngine for ClosedForm {
    fn supports(&self, problem: &AllocationProblem) -> bool {
        problem.is_linear()
    }

    fn solve(&self, problem: &AllocationProblem) -> Result<Allocation, SolveFailure> {
        problem.validate()?;

        let gain = match problem.volume {
            VolumeCurve::Linear { gain } => gain,
            VolumeCurve::Quadratic { gain, decay } if decay == 0.0 => gain,
            _ => {
                return Err(ValidationError::Curve(
                    "the closed form only applies to linear volume curves".into(),
                )
                .into());
            }
        };
        if !problem.cost.is_linear() {
            return Err(ValidationError::Curve(
                "the closed form only applies to linear cost curves".into(),
            )
            .into());
        }

        if gain <= 0.0 || problem.budget == 0.0 {
            return Ok(Allocation {
                units: 0.0,
                volume: 0.0,
                cost: 0.0,
            });
        }

        let units = problem.budget / problem.cost.rate();
        Ok(Allocation {
            units,
            volume: gain * units,
            // the constraint is active at the optimum
            cost: problem.budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spends_the_whole_budget() {
        let problem = AllocationProblem::linear(1.25, 1000.0, 10.0);
        let allocation = ClosedForm.solve(&problem).unwrap();
        assert_eq!(allocation.units, 800.0);
        assert_eq!(allocation.cost, 1000.0);
        assert!((allocation.volume - 880.0).abs() < 1e-9);
    }

    #[test]
    fn shrinking_volume_means_no_allocation() {
        let problem = AllocationProblem::linear(1.25, 1000.0, -150.0);
        let allocation = ClosedForm.solve(&problem).unwrap();
        assert_eq!(allocation.units, 0.0);
        assert_eq!(allocation.cost, 0.0);
    }

    #[test]
    fn refuses_curved_problems() {
        let mut problem = AllocationProblem::linear(1.0, 10.0, 0.0);
        problem.volume = VolumeCurve::Quadratic {
            gain: 1.0,
            decay: 0.5,
        };
        assert!(!ClosedForm.supports(&problem));
        assert!(matches!(
            ClosedForm.solve(&problem),
            Err(SolveFailure::Invalid(ValidationError::Curve(_)))
        ));
    }
}
