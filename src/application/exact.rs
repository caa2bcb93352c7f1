//! Exact allocation via mixed-integer programming.
//!
//! # Formulation
//!
//! ```text
//! x[u,l]  binary   unit u is filled from listing l (l eligible for u)
//! y[s]    binary   seller s is used
//! short   >= 0     sellers missing below the minimum
//!
//! minimize  sum (unit_cost[l] - P_missing) * x[u,l] + P_missing * U
//!         + P_missing * short
//!
//! s.t.  sum_l x[u,l]               <= 1            for every unit u
//!       sum_u x[u,l] - cap[l] y[s] <= 0            for every listing l of s
//!       y[s] - sum x[.,l of s]     <= 0            for every seller s
//!       sum_s y[s] + short         >= min_sellers
//!       sum_s y[s]                 <= max_sellers
//! ```
//!
//! Leaving a unit empty is always allowed, so the model is feasible for any
//! input, including a hard seller maximum. The minimum is only slack when it
//! cannot be reached at all; `short` costs as much as a missing unit so the
//! backend never trades a seller for money. The constant `P_missing * U`
//! makes the objective equal the cost reported by the scoring policy.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use crate::domain::constraint::{Constraint, VariableKind};
use crate::domain::{Allocation, Evaluator, Gene, ListingIdx, Problem, ScoreVector, ScoringPolicy};
use crate::error::SolverError;
use crate::port::{MilpProblem, MilpSolver, SolutionStatus, SolveLimits};

/// Variables with a value above this are read as 1.
const BINARY_THRESHOLD: f64 = 0.5;

/// Best allocation the MILP produced.
#[derive(Debug, Clone)]
pub struct ExactOutcome {
    pub allocation: Allocation,
    pub score: ScoreVector,
    /// The backend proved optimality (false after a time-out).
    pub optimal: bool,
    pub status: SolutionStatus,
    pub variables: usize,
    pub constraints: usize,
}

/// MILP together with the mapping from variables back to assignments.
#[derive(Debug)]
pub struct AllocationModel {
    pub milp: MilpProblem,
    /// Per demand unit, the `(listing, variable)` pairs it may take.
    assign: Vec<Vec<(ListingIdx, usize)>>,
}

impl AllocationModel {
    /// Formulate the allocation problem.
    #[must_use]
    pub fn build(problem: &Problem, policy: &ScoringPolicy) -> Self {
        let evaluator = Evaluator::new(problem, policy);
        let weights = &policy.weights;
        let mut milp = MilpProblem::default();

        let units = problem.unit_count();
        let mut assign = Vec::with_capacity(units);
        let mut per_listing: Vec<Vec<usize>> = vec![Vec::new(); problem.listings().len()];

        for unit in 0..units {
            let row: Vec<(ListingIdx, usize)> = problem
                .eligible_for_unit(unit)
                .iter()
                .map(|idx| {
                    let cost = evaluator.unit_cost(idx.index()) - weights.missing_unit_penalty;
                    let var = milp.add_variable(VariableKind::Binary, cost);
                    per_listing[idx.index()].push(var);
                    (*idx, var)
                })
                .collect();
            if !row.is_empty() {
                let terms = row.iter().map(|(_, var)| (*var, 1.0)).collect();
                milp.add_constraint(Constraint::leq(terms, 1.0));
            }
            assign.push(row);
        }
        milp.offset = weights.missing_unit_penalty * units as f64;

        let mut seller_vars = Vec::new();
        for seller in problem.seller_indices() {
            let listings: Vec<ListingIdx> = problem
                .listings_by_seller(seller)
                .iter()
                .copied()
                .filter(|l| !per_listing[l.index()].is_empty())
                .collect();
            if listings.is_empty() {
                continue;
            }

            let y = milp.add_variable(VariableKind::Binary, 0.0);
            seller_vars.push(y);

            let mut link = vec![(y, 1.0)];
            for l in listings {
                let vars = &per_listing[l.index()];
                let cap = f64::from(problem.listing(l).quantity);
                let mut terms: Vec<(usize, f64)> = vars.iter().map(|v| (*v, 1.0)).collect();
                terms.push((y, -cap));
                milp.add_constraint(Constraint::leq(terms, 0.0));
                link.extend(vars.iter().map(|v| (*v, -1.0)));
            }
            milp.add_constraint(Constraint::leq(link, 0.0));
        }

        let bounds = policy.seller_bounds;
        if bounds.min > 0 && units > 0 {
            let short = milp.add_variable(VariableKind::non_negative(), weights.missing_unit_penalty);
            let mut terms: Vec<(usize, f64)> = seller_vars.iter().map(|y| (*y, 1.0)).collect();
            terms.push((short, 1.0));
            milp.add_constraint(Constraint::geq(terms, bounds.min as f64));
        }
        if let Some(max) = bounds.max {
            if seller_vars.len() > max {
                let terms = seller_vars.iter().map(|y| (*y, 1.0)).collect();
                milp.add_constraint(Constraint::leq(terms, max as f64));
            }
        }

        Self { milp, assign }
    }

    /// Read a genome back out of variable values.
    #[must_use]
    pub fn decode(&self, values: &[f64]) -> Vec<Gene> {
        self.assign
            .iter()
            .map(|row| {
                row.iter()
                    .find(|(_, var)| values.get(*var).copied().unwrap_or(0.0) > BINARY_THRESHOLD)
                    .map(|(idx, _)| *idx)
            })
            .collect()
    }
}

/// Solve the allocation problem exactly.
///
/// Cancellation is checked immediately before and after the blocking solve.
///
/// # Errors
///
/// - [`SolverError::Cancelled`] if the token is raised around the solve.
/// - [`SolverError::Infeasible`] if the backend proves infeasibility.
/// - [`SolverError::Timeout`] if the time limit passes with no incumbent.
/// - [`SolverError::Backend`] for any other backend failure.
pub fn solve_exact(
    problem: &Problem,
    policy: &ScoringPolicy,
    solver: &dyn MilpSolver,
    limits: &SolveLimits,
    cancel: &CancelToken,
) -> Result<ExactOutcome, SolverError> {
    if cancel.is_cancelled() {
        return Err(SolverError::Cancelled);
    }

    let model = AllocationModel::build(problem, policy);
    let variables = model.milp.num_vars();
    let constraints = model.milp.constraints.len();
    debug!(
        backend = solver.name(),
        variables,
        constraints,
        units = problem.unit_count(),
        "MILP formulated"
    );

    let started = Instant::now();
    let solution = solver.solve(&model.milp, limits)?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if cancel.is_cancelled() {
        return Err(SolverError::Cancelled);
    }

    match solution.status {
        SolutionStatus::Optimal | SolutionStatus::TimeLimited if solution.has_incumbent() => {}
        SolutionStatus::Optimal if variables == 0 => {}
        SolutionStatus::TimeLimited | SolutionStatus::Optimal => {
            warn!(elapsed_ms, "MILP stopped without an incumbent");
            return Err(SolverError::Timeout {
                limit: limits.time_limit.unwrap_or_default(),
            });
        }
        SolutionStatus::Infeasible => return Err(SolverError::Infeasible),
        SolutionStatus::Unbounded | SolutionStatus::Error => {
            return Err(SolverError::Backend {
                backend: solver.name(),
                message: format!("solver finished with status {:?}", solution.status),
            });
        }
    }

    let genes = model.decode(&solution.values);
    let evaluator = Evaluator::new(problem, policy);
    let (allocation, score) = evaluator.evaluate_genome(&genes);
    let optimal = solution.is_optimal();

    info!(
        backend = solver.name(),
        optimal,
        cost = score.total_cost,
        sellers = score.seller_count,
        unfulfilled = allocation.unfulfilled_units(),
        elapsed_ms,
        "MILP solved"
    );

    Ok(ExactOutcome {
        allocation,
        score,
        optimal,
        status: solution.status,
        variables,
        constraints,
    })
}
