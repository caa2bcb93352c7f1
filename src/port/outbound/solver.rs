//! Solver port for mixed-integer linear programming.
//!
//! Defines the interface the exact allocation solver formulates against.
//! Backends (HiGHS today) live in `adapter::solver`.
//!
//! # Overview
//!
//! - [`MilpSolver`]: Core MILP solver interface
//! - [`MilpProblem`]: Problem definition
//! - [`MilpSolution`]: Solution representation
//! - [`SolveLimits`]: Wall-clock, gap and thread limits for one solve

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::constraint::{Constraint, VariableKind};
use crate::error::SolverError;

/// Mixed-integer linear programming solver.
///
/// Implementations wrap specific solver backends (HiGHS, CBC, etc.)
/// and provide a unified interface for optimization problems.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so one backend can
/// serve concurrent optimization runs.
///
/// # Implementation Notes
///
/// - Honour [`SolveLimits::time_limit`]; the call is the only blocking
///   section of a run.
/// - On hitting the time limit, return the best incumbent with
///   [`SolutionStatus::TimeLimited`] instead of failing.
pub trait MilpSolver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Minimize the objective subject to the constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails in a way that leaves no
    /// status to report (e.g. the model could not be built).
    fn solve(&self, problem: &MilpProblem, limits: &SolveLimits)
        -> Result<MilpSolution, SolverError>;
}

/// Mixed-integer linear program in minimization form.
///
/// ```text
/// minimize    c^T * x + offset
/// subject to  constraints
///             x[i] in kinds[i]
/// ```
#[derive(Debug, Clone, Default)]
pub struct MilpProblem {
    /// Objective coefficients, one per variable.
    pub objective: Vec<f64>,
    /// Constant added to the objective value.
    pub offset: f64,
    /// Domain of each variable.
    pub kinds: Vec<VariableKind>,
    /// Linear constraints over the variables.
    pub constraints: Vec<Constraint>,
}

impl MilpProblem {
    /// Add a variable and return its index.
    pub fn add_variable(&mut self, kind: VariableKind, cost: f64) -> usize {
        self.objective.push(cost);
        self.kinds.push(kind);
        self.objective.len() - 1
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Return the number of decision variables.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Objective value of an assignment, offset included.
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.offset
            + self
                .objective
                .iter()
                .zip(values)
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }
}

/// Limits applied to one solve.
#[derive(Debug, Clone, Default)]
pub struct SolveLimits {
    /// Wall-clock budget.
    pub time_limit: Option<Duration>,
    /// Relative MIP gap at which the backend may stop.
    pub mip_gap: Option<f64>,
    /// Backend worker threads.
    pub threads: Option<usize>,
}

/// Solution to a mixed-integer program.
#[derive(Debug, Clone)]
pub struct MilpSolution {
    /// Value of each decision variable.
    pub values: Vec<f64>,
    /// Objective value, offset included.
    pub objective: f64,
    /// Termination status of the solver.
    pub status: SolutionStatus,
}

impl MilpSolution {
    /// Return `true` if the solver proved optimality.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Return `true` if `values` hold a usable assignment.
    #[must_use]
    pub fn has_incumbent(&self) -> bool {
        matches!(
            self.status,
            SolutionStatus::Optimal | SolutionStatus::TimeLimited
        ) && !self.values.is_empty()
    }
}

/// Termination status of an optimization solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    /// Solver found a globally optimal solution.
    Optimal,

    /// Time limit reached; values hold the best incumbent, if any.
    TimeLimited,

    /// No feasible solution exists.
    Infeasible,

    /// Objective function is unbounded.
    Unbounded,

    /// Solver encountered an internal error.
    Error,
}
