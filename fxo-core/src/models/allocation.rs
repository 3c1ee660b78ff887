use crate::failure::{Infeasible, SolveFailure, ValidationError};

/// A breakpoint of a piecewise-linear volume curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Allocated resource units
    pub units: f64,
    /// Exchange volume produced by that many units
    pub volume: f64,
}

/// Exchange volume as a function of allocated units.
///
/// Every variant is concave and non-decreasing near zero, so maximizing it
/// under a convex cost constraint is a convex program.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum VolumeCurve {
    /// `volume(x) = gain * x`
    Linear {
        /// Volume per unit
        gain: f64,
    },
    /// `volume(x) = gain * x - decay * x^2 / 2`, i.e. diminishing returns
    Quadratic {
        /// Marginal volume of the first unit
        gain: f64,
        /// How quickly the marginal volume falls, must be non-negative
        decay: f64,
    },
    /// Linear interpolation between breakpoints starting at zero units.
    /// Slopes must be non-increasing; the curve is undefined past the last point.
    Piecewise(Vec<Point>),
}

impl VolumeCurve {
    /// Volume curve for a process whose efficiency improved by `pct` percent
    pub fn from_efficiency(pct: f64) -> Self {
        Self::Linear {
            gain: 1.0 + pct / 100.0,
        }
    }

    /// Whether the curve is linear in the allocation
    pub fn is_linear(&self) -> bool {
        match self {
            Self::Linear { .. } => true,
            Self::Quadratic { decay, .. } => *decay == 0.0,
            Self::Piecewise(_) => false,
        }
    }

    /// Evaluate the curve at `units`
    pub fn evaluate(&self, units: f64) -> f64 {
        match self {
            Self::Linear { gain } => gain * units,
            Self::Quadratic { gain, decay } => gain * units - decay * units * units / 2.0,
            Self::Piecewise(points) => {
                let Some(first) = points.first() else {
                    return 0.0;
                };
                let mut volume = first.volume;
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if units <= a.units {
                        break;
                    }
                    let upto = units.min(b.units);
                    volume += (upto - a.units) * (b.volume - a.volume) / (b.units - a.units);
                }
                volume
            }
        }
    }

    /// Check that the curve is finite and concave
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Linear { gain } => finite("gain", *gain),
            Self::Quadratic { gain, decay } => {
                finite("gain", *gain)?;
                finite("decay", *decay)?;
                if *decay < 0.0 {
                    return Err(ValidationError::Curve("decay must be non-negative".into()));
                }
                Ok(())
            }
            Self::Piecewise(points) => {
                let Some(first) = points.first() else {
                    return Err(ValidationError::Curve("no breakpoints provided".into()));
                };
                if first.units != 0.0 {
                    return Err(ValidationError::Curve("first breakpoint must be at zero units".into()));
                }
                let mut slope = f64::INFINITY;
                for point in points.iter() {
                    finite("units", point.units)?;
                    finite("volume", point.volume)?;
                }
                for pair in points.windows(2) {
                    let dx = pair[1].units - pair[0].units;
                    if dx <= 0.0 {
                        return Err(ValidationError::Curve("breakpoints must strictly increase".into()));
                    }
                    let next = (pair[1].volume - pair[0].volume) / dx;
                    if next > slope {
                        return Err(ValidationError::Curve("slopes must be non-increasing".into()));
                    }
                    slope = next;
                }
                Ok(())
            }
        }
    }

    /// The largest allocation the curve is defined for
    pub fn max_units(&self) -> f64 {
        match self {
            Self::Piecewise(points) => points.last().map(|p| p.units).unwrap_or(0.0),
            _ => f64::INFINITY,
        }
    }
}

/// Cost of an allocation, in the budget's currency.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CostCurve {
    /// `cost(x) = rate * x`
    Linear {
        /// Cost per unit, normally the applicable exchange rate
        rate: f64,
    },
    /// `cost(x) = rate * x + curvature * x^2 / 2`
    Quadratic {
        /// Cost of the first unit
        rate: f64,
        /// Growth of the marginal cost, must be non-negative
        curvature: f64,
    },
}

impl CostCurve {
    /// Whether the cost is linear in the allocation
    pub fn is_linear(&self) -> bool {
        match self {
            Self::Linear { .. } => true,
            Self::Quadratic { curvature, .. } => *curvature == 0.0,
        }
    }

    /// The per-unit cost at zero
    pub fn rate(&self) -> f64 {
        match self {
            Self::Linear { rate } | Self::Quadratic { rate, .. } => *rate,
        }
    }

    /// Evaluate the cost at `units`
    pub fn evaluate(&self, units: f64) -> f64 {
        match self {
            Self::Linear { rate } => rate * units,
            Self::Quadratic { rate, curvature } => rate * units + curvature * units * units / 2.0,
        }
    }
}

/// Maximize `volume(x)` subject to `cost(x) <= budget` and `x >= 0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationProblem {
    /// Objective
    pub volume: VolumeCurve,
    /// Constraint function
    pub cost: CostCurve,
    /// Upper bound on cost
    pub budget: f64,
}

impl AllocationProblem {
    /// The budget-constrained problem for a single exchange rate
    pub fn linear(rate: f64, budget: f64, efficiency_improvement_pct: f64) -> Self {
        Self {
            volume: VolumeCurve::from_efficiency(efficiency_improvement_pct),
            cost: CostCurve::Linear { rate },
            budget,
        }
    }

    /// Whether both the objective and the constraint are linear
    pub fn is_linear(&self) -> bool {
        self.volume.is_linear() && self.cost.is_linear()
    }

    /// Reject problems no engine should attempt.
    ///
    /// A non-positive rate makes the allocation unbounded for any positive
    /// budget, which is infeasible rather than infinite. A negative rate is
    /// only a validation error when the budget is zero, since then nothing
    /// would be spent either way.
    pub fn validate(&self) -> Result<(), SolveFailure> {
        if !self.budget.is_finite() {
            return Err(ValidationError::NonFinite("budget").into());
        }
        if self.budget < 0.0 {
            return Err(ValidationError::NegativeBudget(self.budget).into());
        }

        let rate = self.cost.rate();
        finite("rate", rate)?;
        if rate < 0.0 && self.budget == 0.0 {
            return Err(ValidationError::NegativeRate(rate).into());
        }
        if rate <= 0.0 {
            return Err(Infeasible::NonPositiveRate {
                rate,
                budget: self.budget,
            }
            .into());
        }
        if let CostCurve::Quadratic { curvature, .. } = self.cost {
            finite("curvature", curvature)?;
            if curvature < 0.0 {
                return Err(ValidationError::Curve("curvature must be non-negative".into()).into());
            }
        }

        self.volume.validate()?;
        Ok(())
    }
}

/// The solution of an [`AllocationProblem`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Allocation {
    /// Allocated resource units
    pub units: f64,
    /// Volume at that allocation
    pub volume: f64,
    /// Cost at that allocation
    pub cost: f64,
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piecewise_curves_interpolate_and_flatten() {
        let curve = VolumeCurve::Piecewise(vec![
            Point {
                units: 0.0,
                volume: 0.0,
            },
            Point {
                units: 10.0,
                volume: 20.0,
            },
            Point {
                units: 20.0,
                volume: 25.0,
            },
        ]);
        assert!(curve.validate().is_ok());
        assert_eq!(curve.evaluate(5.0), 10.0);
        assert_eq!(curve.evaluate(15.0), 22.5);
        assert_eq!(curve.evaluate(30.0), 25.0);
        assert_eq!(curve.max_units(), 20.0);
    }

    #[test]
    fn convex_volume_curves_are_rejected() {
        let curve = VolumeCurve::Piecewise(vec![
            Point {
                units: 0.0,
                volume: 0.0,
            },
            Point {
                units: 10.0,
                volume: 5.0,
            },
            Point {
                units: 20.0,
                volume: 25.0,
            },
        ]);
        assert!(matches!(curve.validate(), Err(ValidationError::Curve(_))));
    }

    #[test]
    fn rate_and_budget_are_checked_before_solving() {
        let negative_budget = AllocationProblem::linear(1.25, -1.0, 10.0);
        assert!(matches!(
            negative_budget.validate(),
            Err(SolveFailure::Invalid(ValidationError::NegativeBudget(_)))
        ));

        let zero_rate = AllocationProblem::linear(0.0, 1000.0, 10.0);
        assert!(matches!(
            zero_rate.validate(),
            Err(SolveFailure::Infeasible(Infeasible::NonPositiveRate { .. }))
        ));

        let negative_rate_no_budget = AllocationProblem::linear(-2.0, 0.0, 10.0);
        assert!(matches!(
            negative_rate_no_budget.validate(),
            Err(SolveFailure::Invalid(ValidationError::NegativeRate(_)))
        ));

        assert!(AllocationProblem::linear(1.25, 1000.0, 10.0).is_linear());
    }
}
