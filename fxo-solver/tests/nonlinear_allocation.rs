use approx::assert_relative_eq;
use fxo_core::{
    failure::{Infeasible, SolveFailure},
    models::{AllocationProblem, CostCurve, Point, VolumeCurve},
    ports::AllocationEngine,
};
use fxo_solver::{AutoEngine, clarabel::ClarabelEngine, config::SolverConfig};
use std::time::Duration;

fn diminishing(budget: f64) -> AllocationProblem {
    AllocationProblem {
        volume: VolumeCurve::Quadratic {
            gain: 2.0,
            decay: 0.1,
        },
        cost: CostCurve::Linear { rate: 1.0 },
        budget,
    }
}

#[test]
fn diminishing_returns_stop_before_the_budget() {
    // marginal volume reaches zero at gain / decay = 20 units
    let allocation = ClarabelEngine::default().solve(&diminishing(100.0)).unwrap();
    assert_relative_eq!(allocation.units, 20.0, max_relative = 1e-5);
    assert_relative_eq!(allocation.volume, 20.0, max_relative = 1e-5);
    assert!(allocation.cost < 100.0);
}

#[test]
fn diminishing_returns_with_a_binding_budget() {
    let allocation = AutoEngine::default().solve(&diminishing(10.0)).unwrap();
    assert_relative_eq!(allocation.units, 10.0, max_relative = 1e-5);
    assert_relative_eq!(allocation.volume, 15.0, max_relative = 1e-5);
    assert_relative_eq!(allocation.cost, 10.0, max_relative = 1e-5);
}

#[test]
fn piecewise_volume_fills_segments_in_order() {
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

    let engine = ClarabelEngine::default();

    let within = engine
        .solve(&AllocationProblem {
            volume: curve.clone(),
            cost: CostCurve::Linear { rate: 1.0 },
            budget: 15.0,
        })
        .unwrap();
    assert_relative_eq!(within.units, 15.0, max_relative = 1e-5);
    assert_relative_eq!(within.volume, 22.5, max_relative = 1e-5);

    // the curve ends at 20 units, so a larger budget is left unspent
    let beyond = engine
        .solve(&AllocationProblem {
            volume: curve,
            cost: CostCurve::Linear { rate: 1.0 },
            budget: 100.0,
        })
        .unwrap();
    assert_relative_eq!(beyond.units, 20.0, max_relative = 1e-5);
    assert_relative_eq!(beyond.volume, 25.0, max_relative = 1e-5);
}

#[test]
fn quadratic_cost_binds_at_its_root() {
    // x + x^2 <= 12 admits at most x = 3
    let problem = AllocationProblem {
        volume: VolumeCurve::Linear { gain: 1.0 },
        cost: CostCurve::Quadratic {
            rate: 1.0,
            curvature: 2.0,
        },
        budget: 12.0,
    };
    let allocation = AutoEngine::default().solve(&problem).unwrap();
    assert_relative_eq!(allocation.units, 3.0, max_relative = 1e-4);
    assert_relative_eq!(allocation.cost, 12.0, max_relative = 1e-4);
}

#[test]
fn exhausted_iterations_are_reported() {
    let engine = ClarabelEngine::new(&SolverConfig {
        max_iter: 1,
        time_limit: Duration::from_secs(5),
    });
    assert!(matches!(
        engine.solve(&diminishing(10.0)),
        Err(SolveFailure::Infeasible(Infeasible::NotConverged { .. }))
    ));
}

#[test]
fn solver_config_reads_human_durations() {
    let config: SolverConfig =
        serde_json::from_str(r#"{ "max_iter": 25, "time_limit": "250ms" }"#).unwrap();
    assert_eq!(config.max_iter, 25);
    assert_eq!(config.time_limit, Duration::from_millis(250));

    let defaults: SolverConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults.max_iter, SolverConfig::default().max_iter);
}
