#![allow(unused_macros)]
use rstest_reuse::template;

// This creates a testing "template" to allow for the injection of each engine
// implementation

#[template]
#[rstest]
#[case::closed_form(fxo_solver::closed_form::ClosedForm)]
#[case::clarabel(fxo_solver::clarabel::ClarabelEngine::default())]
#[case::auto(fxo_solver::AutoEngine::default())]
pub fn all_engines(#[case] engine: impl fxo_core::ports::AllocationEngine) -> () {}
