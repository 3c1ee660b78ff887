use crate::failure::SolveFailure;
use crate::models::{Allocation, AllocationProblem};

/// Interface for numerical backends that solve budget-constrained allocations.
///
/// An engine maximizes the problem's volume curve subject to its cost curve
/// staying within budget and the allocation staying non-negative. Engines
/// must report failure to converge instead of returning their starting point.
pub trait AllocationEngine {
    /// Whether this engine can solve `problem` at all.
    ///
    /// Specialized engines (such as a closed form for linear problems) return
    /// false for problems outside their reach.
    fn supports(&self, problem: &AllocationProblem) -> bool;

    /// Solve the problem
    fn solve(&self, problem: &AllocationProblem) -> Result<Allocation, SolveFailure>;
}
