//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! This implementation wraps it using the good_lp crate for ergonomic Rust usage.

use std::time::Instant;

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel, Variable,
};
use tracing::debug;

use crate::domain::constraint::{Constraint, ConstraintSense, VariableKind};
use crate::error::SolverError;
use crate::port::{MilpProblem, MilpSolution, MilpSolver, SolutionStatus, SolveLimits};

/// Feasibility tolerance used to vet incumbents returned after a time-out.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// HiGHS-based MILP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver;

impl HiGHSSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(
        &self,
        problem: &MilpProblem,
        limits: &SolveLimits,
    ) -> Result<MilpSolution, SolverError> {
        solve_with_good_lp(problem, limits)
    }
}

fn linear(vars: &[Variable], terms: &[(usize, f64)]) -> Expression {
    terms.iter().map(|(i, c)| *c * vars[*i]).sum()
}

/// Internal solver implementation using good_lp.
fn solve_with_good_lp(
    problem: &MilpProblem,
    limits: &SolveLimits,
) -> Result<MilpSolution, SolverError> {
    let n = problem.num_vars();

    // Handle empty problem
    if n == 0 {
        return Ok(MilpSolution {
            values: vec![],
            objective: problem.offset,
            status: SolutionStatus::Optimal,
        });
    }

    let mut vars = variables!();
    let mut var_list = Vec::with_capacity(n);
    for kind in &problem.kinds {
        let v = match *kind {
            VariableKind::Binary => variable().binary(),
            VariableKind::Continuous { lower, upper } => {
                let mut v = variable();
                if let Some(lb) = lower {
                    v = v.min(lb);
                }
                if let Some(ub) = upper {
                    v = v.max(ub);
                }
                v
            }
        };
        var_list.push(vars.add(v));
    }

    let objective: Expression = var_list
        .iter()
        .zip(problem.objective.iter())
        .map(|(v, c)| *c * *v)
        .sum();

    let mut model = vars
        .minimise(objective)
        .using(highs)
        .set_option("output_flag", false);
    if let Some(limit) = limits.time_limit {
        model = model.set_option("time_limit", limit.as_secs_f64());
    }
    if let Some(gap) = limits.mip_gap {
        model = model.set_option("mip_rel_gap", gap);
    }
    if let Some(threads) = limits.threads {
        model = model.set_option("threads", i32::try_from(threads).unwrap_or(i32::MAX));
    }

    for constr in &problem.constraints {
        let lhs = linear(&var_list, &constr.terms);
        let rhs = constr.rhs;
        model = match constr.sense {
            ConstraintSense::GreaterEqual => model.with(constraint!(lhs >= rhs)),
            ConstraintSense::LessEqual => model.with(constraint!(lhs <= rhs)),
            ConstraintSense::Equal => model.with(constraint!(lhs == rhs)),
        };
    }

    let started = Instant::now();
    let outcome = model.solve();
    let elapsed = started.elapsed();
    let timed_out = limits.time_limit.is_some_and(|limit| elapsed >= limit);

    debug!(
        vars = n,
        constraints = problem.constraints.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        timed_out,
        "HiGHS solve finished"
    );

    match outcome {
        Ok(solution) => {
            let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();

            // HiGHS hands back whatever it holds when the clock runs out;
            // vet it before calling it an incumbent.
            if timed_out && !satisfies_all(&problem.constraints, &values) {
                return Ok(MilpSolution {
                    values: vec![],
                    objective: 0.0,
                    status: SolutionStatus::TimeLimited,
                });
            }

            Ok(MilpSolution {
                objective: problem.evaluate(&values),
                values,
                status: if timed_out {
                    SolutionStatus::TimeLimited
                } else {
                    SolutionStatus::Optimal
                },
            })
        }
        Err(err) => {
            let status = match err {
                _ if timed_out => SolutionStatus::TimeLimited,
                ResolutionError::Infeasible => SolutionStatus::Infeasible,
                ResolutionError::Unbounded => SolutionStatus::Unbounded,
                _ => SolutionStatus::Error,
            };
            debug!(error = %err, ?status, "HiGHS returned no solution");
            Ok(MilpSolution {
                values: vec![],
                objective: 0.0,
                status,
            })
        }
    }
}

fn satisfies_all(constraints: &[Constraint], values: &[f64]) -> bool {
    constraints
        .iter()
        .all(|c| c.is_satisfied(values, FEASIBILITY_TOLERANCE))
}
