use crate::config::SolverConfig;
use clarabel::{algebra::*, solver::*};
use fxo_core::{
    failure::{Infeasible, SolveFailure},
    models::{Allocation, AllocationProblem, CostCurve, VolumeCurve},
    ports::AllocationEngine,
};

/// General engine backed by the Clarabel interior point solver.
///
/// The allocation problem is posed as a conic program over the variables
/// `[x, y_1..y_k, t]`, where `x` is the allocation, the `y_i` are the fill
/// levels of piecewise volume segments (present only for piecewise curves),
/// and `t` bounds `x^2` through a second-order cone (present only for a
/// quadratic cost).
pub struct ClarabelEngine(DefaultSettings<f64>);

impl ClarabelEngine {
    /// Create an engine bounded by the given limits
    pub fn new(config: &SolverConfig) -> Self {
        let mut settings = DefaultSettings::default();
        settings.verbose = false;
        settings.max_iter = config.max_iter;
        settings.time_limit = config.time_limit.as_secs_f64();
        Self(settings)
    }
}

impl Default for ClarabelEngine {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

impl AllocationEngine for ClarabelEngine {
    fn supports(&self, _problem: &AllocationProblem) -> bool {
        true
    }

    fn solve(&self, problem: &AllocationProblem) -> Result<Allocation, SolveFailure> {
        problem.validate()?;

        if problem.budget == 0.0 {
            return Ok(Allocation {
                units: 0.0,
                volume: problem.volume.evaluate(0.0),
                cost: 0.0,
            });
        }

        let Program { p, q, a, b, cones } = Program::build(problem);

        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, self.0.clone())
            .map_err(|error| Infeasible::Setup(format!("{error:?}")))?;
        solver.solve();

        let iterations = solver.solution.iterations;
        match &solver.solution.status {
            SolverStatus::Solved => {}
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return Err(Infeasible::Unbounded.into());
            }
            status => {
                tracing::warn!(?status, iterations, "allocation solve did not converge");
                return Err(Infeasible::NotConverged {
                    status: format!("{status:?}"),
                    iterations,
                }
                .into());
            }
        }

        // Interior point solutions approach the bounds from inside, so we clip
        // the tiny violations that remain.
        let units = solver.solution.x[0].clamp(0.0, problem.volume.max_units());

        Ok(Allocation {
            units,
            volume: problem.volume.evaluate(units),
            cost: problem.cost.evaluate(units),
        })
    }
}

/// The conic form `min 1/2 z'Pz + q'z  s.t.  Az + s = b, s in K`.
struct Program {
    p: CscMatrix<f64>,
    q: Vec<f64>,
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl Program {
    fn build(problem: &AllocationProblem) -> Self {
        // Piecewise curves contribute one variable per segment
        let segments: Vec<(f64, f64)> = match &problem.volume {
            VolumeCurve::Piecewise(points) => points
                .windows(2)
                .map(|pair| {
                    let width = pair[1].units - pair[0].units;
                    (width, (pair[1].volume - pair[0].volume) / width)
                })
                .collect(),
            _ => Vec::new(),
        };

        let curvature = match problem.cost {
            CostCurve::Quadratic { curvature, .. } if curvature > 0.0 => Some(curvature),
            _ => None,
        };

        let x = 0;
        let y = |i: usize| 1 + i;
        let t = 1 + segments.len();
        let n = t + usize::from(curvature.is_some());

        // Maximizing volume means minimizing its negation. Our quadratic term
        // is diagonal, so we only record its non-zero entries.
        let mut p = Vec::new();
        let mut q = vec![0.0; n];
        match &problem.volume {
            VolumeCurve::Linear { gain } => q[x] = -gain,
            VolumeCurve::Quadratic { gain, decay } => {
                q[x] = -gain;
                if *decay > 0.0 {
                    p.push((x, x, *decay));
                }
            }
            VolumeCurve::Piecewise(_) => {
                for (i, (_, slope)) in segments.iter().enumerate() {
                    q[y(i)] = -slope;
                }
            }
        }

        // Rows must be grouped by cone, in the order the cones are declared.
        let mut a = Vec::new();
        let mut b = Vec::new();
        let mut cones = Vec::new();

        // x = sum of segment fills
        if !segments.is_empty() {
            a.push((b.len(), x, 1.0));
            for i in 0..segments.len() {
                a.push((b.len(), y(i), -1.0));
            }
            b.push(0.0);
            cones.push(ZeroConeT(1));
        }

        let nonneg_start = b.len();

        // x >= 0; the signs are wonky because the cone is s >= 0 with s = b - Az
        a.push((b.len(), x, -1.0));
        b.push(0.0);

        // rate * x + curvature/2 * t <= budget
        a.push((b.len(), x, problem.cost.rate()));
        if let Some(curvature) = curvature {
            a.push((b.len(), t, curvature / 2.0));
        }
        b.push(problem.budget);

        // 0 <= y_i <= width_i
        for (i, (width, _)) in segments.iter().enumerate() {
            a.push((b.len(), y(i), -1.0));
            b.push(0.0);
            a.push((b.len(), y(i), 1.0));
            b.push(*width);
        }

        cones.push(NonnegativeConeT(b.len() - nonneg_start));

        // t >= x^2 as the rotated cone (t + 1, 2x, t - 1) in SOC(3)
        if curvature.is_some() {
            a.push((b.len(), t, -1.0));
            b.push(1.0);
            a.push((b.len(), x, -2.0));
            b.push(0.0);
            a.push((b.len(), t, -1.0));
            b.push(-1.0);
            cones.push(SecondOrderConeT(3));
        }

        Self {
            p: csc(n, n, p),
            q,
            a: csc(b.len(), n, a),
            b,
            cones,
        }
    }
}

/// Assemble a compressed-sparse-column matrix from (row, column, value) entries.
fn csc(m: usize, n: usize, mut entries: Vec<(usize, usize, f64)>) -> CscMatrix<f64> {
    entries.sort_by_key(|&(row, col, _)| (col, row));

    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::with_capacity(entries.len());
    let mut nzval = Vec::with_capacity(entries.len());

    let mut next = 0;
    for col in 0..n {
        colptr.push(rowval.len());
        while next < entries.len() && entries[next].1 == col {
            rowval.push(entries[next].0);
            nzval.push(entries[next].2);
            next += 1;
        }
    }
    colptr.push(rowval.len());

    CscMatrix {
        m,
        n,
        colptr,
        rowval,
        nzval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxo_core::models::Point;

    #[test]
    fn csc_orders_entries_by_column() {
        let matrix = csc(2, 3, vec![(1, 2, 5.0), (0, 0, 1.0), (1, 0, 2.0)]);
        assert_eq!(matrix.colptr, vec![0, 2, 2, 3]);
        assert_eq!(matrix.rowval, vec![0, 1, 1]);
        assert_eq!(matrix.nzval, vec![1.0, 2.0, 5.0]);
        assert!(matrix.check_format().is_ok());
    }

    #[test]
    fn piecewise_programs_link_segments_to_the_allocation() {
        let problem = AllocationProblem {
            volume: VolumeCurve::Piecewise(vec![
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
            ]),
            cost: CostCurve::Linear { rate: 1.0 },
            budget: 15.0,
        };
        let program = Program::build(&problem);

        // x, y_1, y_2
        assert_eq!(program.q, vec![0.0, -2.0, -0.5]);
        // one linking row, x >= 0, budget, two bounds per segment
        assert_eq!(program.b, vec![0.0, 0.0, 15.0, 0.0, 10.0, 0.0, 10.0]);
        assert_eq!(program.a.m, 7);
        assert!(program.a.check_format().is_ok());
    }
}
