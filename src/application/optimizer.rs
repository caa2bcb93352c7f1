//! Optimizer facade.
//!
//! Validates the configuration, dispatches on [`Strategy`], and turns the
//! resulting Pareto front into purchase plans inside an
//! [`OptimizationResult`]. Solver failures and panics are recovered here and
//! never reach the caller as errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, info_span, warn};

use super::cancel::CancelToken;
use super::config::{OptimizationConfig, Strategy};
use super::evolution::{EvolutionParams, EvolutionarySolver, StopReason};
use super::exact::solve_exact;
use super::result::{Diagnostics, OptimizationResult, RunStatus};
use crate::adapter::solver::HiGHSSolver;
use crate::domain::policy::score;
use crate::domain::{
    Allocation, FrontMember, ParetoFront, Problem, PurchasePlan, RunId, ScoringPolicy,
    SellerBounds,
};
use crate::error::{ConfigError, SolverError};
use crate::port::{MilpSolver, SolveLimits};

/// What a strategy produced before it is rendered as plans.
#[derive(Debug, Default)]
struct Search {
    front: ParetoFront,
    fallback: bool,
    timed_out: bool,
    cancelled: bool,
    /// Evolutionary search hit the generation cap before converging.
    capped: bool,
    diagnostics: Diagnostics,
}

/// Entry point for optimization runs.
#[derive(Clone)]
pub struct Optimizer {
    milp: Arc<dyn MilpSolver>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(Arc::new(HiGHSSolver::new()))
    }
}

impl std::fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Optimizer")
            .field("milp", &self.milp.name())
            .finish()
    }
}

impl Optimizer {
    /// Create an optimizer using the given MILP backend.
    #[must_use]
    pub fn new(milp: Arc<dyn MilpSolver>) -> Self {
        Self { milp }
    }

    /// Run one optimization.
    ///
    /// # Errors
    ///
    /// Returns an error only when the configuration cannot be repaired.
    /// Every other failure is reported through the returned envelope.
    pub fn optimize(
        &self,
        problem: &Problem,
        config: &OptimizationConfig,
        cancel: &CancelToken,
    ) -> Result<OptimizationResult, ConfigError> {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let clock = Instant::now();
        let span = info_span!("optimize", run_id = %run_id, strategy = %config.strategy);
        let _enter = span.enter();

        let (config, corrections) = config.validated()?;
        for correction in &corrections {
            warn!(correction = %correction, "configuration corrected");
        }

        let filtered;
        let problem = if config.excluded_sellers.is_empty() {
            problem
        } else {
            filtered = problem.excluding_sellers(&config.excluded_sellers);
            &filtered
        };
        let policy = config.scoring_policy();

        info!(
            units = problem.unit_count(),
            listings = problem.listings().len(),
            sellers = problem.sellers().len(),
            "optimization started"
        );

        if problem.is_empty() {
            let mut result = empty_result(problem, &policy, &config, run_id, started_at);
            result.diagnostics.corrections = corrections;
            result.execution_time_ms = clock.elapsed().as_millis() as u64;
            info!(status = %result.status, "empty problem, nothing to optimize");
            return Ok(result);
        }

        let algorithm = config.strategy.as_str();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.search(problem, &policy, &config, cancel)
        }))
        .unwrap_or_else(|payload| {
            Err(SolverError::Internal {
                algorithm,
                message: panic_message(payload.as_ref()),
            })
        });

        let mut result = match outcome {
            Ok(search) => render(search, problem, &config, run_id, started_at),
            Err(err) => failure(err, &config, run_id, started_at),
        };
        result.diagnostics.corrections = corrections;
        result.execution_time_ms = clock.elapsed().as_millis() as u64;

        match result.status {
            RunStatus::Failed => warn!(
                message = result.message.as_deref().unwrap_or_default(),
                elapsed_ms = result.execution_time_ms,
                "optimization failed"
            ),
            _ => info!(
                status = %result.status,
                strategy_used = %result.strategy_used,
                cost = result.recommended.as_ref().map_or(0.0, |p| p.score.total_cost),
                alternatives = result.alternatives.len(),
                elapsed_ms = result.execution_time_ms,
                "optimization finished"
            ),
        }
        Ok(result)
    }

    fn search(
        &self,
        problem: &Problem,
        policy: &ScoringPolicy,
        config: &OptimizationConfig,
        cancel: &CancelToken,
    ) -> Result<Search, SolverError> {
        match config.strategy {
            Strategy::Exact => self.run_exact(problem, policy, config, cancel),
            Strategy::Evolutionary => run_evolutionary(problem, policy, config, None, cancel),
            Strategy::Hybrid => self.run_hybrid(problem, policy, config, cancel),
        }
    }

    fn run_exact(
        &self,
        problem: &Problem,
        policy: &ScoringPolicy,
        config: &OptimizationConfig,
        cancel: &CancelToken,
    ) -> Result<Search, SolverError> {
        let _span = info_span!("exact", backend = self.milp.name()).entered();
        let limits = solve_limits(config, config.limits.milp_time_limit());
        let outcome = solve_exact(problem, policy, self.milp.as_ref(), &limits, cancel)?;

        let mut front = ParetoFront::new();
        front.insert(outcome.allocation, outcome.score);
        Ok(Search {
            front,
            timed_out: !outcome.optimal,
            diagnostics: Diagnostics {
                algorithm: Strategy::Exact.as_str().to_string(),
                milp_status: Some(outcome.status),
                milp_variables: Some(outcome.variables),
                ..Diagnostics::default()
            },
            ..Search::default()
        })
    }

    fn run_hybrid(
        &self,
        problem: &Problem,
        policy: &ScoringPolicy,
        config: &OptimizationConfig,
        cancel: &CancelToken,
    ) -> Result<Search, SolverError> {
        let limits = solve_limits(config, config.limits.hybrid_milp_budget());
        let exact = {
            let _span = info_span!("exact", backend = self.milp.name()).entered();
            solve_exact(problem, policy, self.milp.as_ref(), &limits, cancel)
        };

        let mut notes: Vec<String> = Vec::new();
        let (seed, milp_status, milp_variables) = match exact {
            Ok(outcome) => {
                if !outcome.optimal {
                    notes.push("MILP stage hit its budget; seeding with its incumbent".into());
                }
                (Some(outcome.allocation), Some(outcome.status), Some(outcome.variables))
            }
            Err(SolverError::Cancelled) => return Err(SolverError::Cancelled),
            Err(err) => {
                warn!(error = %err, "MILP stage failed, falling back to unseeded search");
                notes.push(format!(
                    "MILP stage failed ({err}); fell back to unseeded evolutionary search"
                ));
                (None, None, None)
            }
        };

        let fallback = seed.is_none();
        let mut search = run_evolutionary(problem, policy, config, seed.as_ref(), cancel)?;
        search.fallback = fallback;
        search.diagnostics.algorithm = if fallback {
            Strategy::Evolutionary.as_str().to_string()
        } else {
            Strategy::Hybrid.as_str().to_string()
        };
        search.diagnostics.milp_status = milp_status;
        search.diagnostics.milp_variables = milp_variables;
        search.diagnostics.notes.extend(notes);
        Ok(search)
    }
}

fn solve_limits(config: &OptimizationConfig, budget: Duration) -> SolveLimits {
    SolveLimits {
        time_limit: Some(budget),
        mip_gap: config.limits.mip_gap,
        threads: Some(config.worker_threads()),
    }
}

fn run_evolutionary(
    problem: &Problem,
    policy: &ScoringPolicy,
    config: &OptimizationConfig,
    seed: Option<&Allocation>,
    cancel: &CancelToken,
) -> Result<Search, SolverError> {
    let _span = info_span!("evolutionary", seeded = seed.is_some()).entered();
    let params = EvolutionParams::from_config(config);
    let population_size = params.population_size;
    let outcome = EvolutionarySolver::new(problem, policy, params).run(seed, cancel)?;

    let capped = outcome.stop == StopReason::GenerationCap;
    let mut notes = Vec::new();
    if capped {
        notes.push(format!(
            "generation cap of {} reached before convergence; returning best plan found",
            outcome.generations
        ));
    }

    Ok(Search {
        timed_out: outcome.stop == StopReason::TimeLimit,
        cancelled: outcome.stop == StopReason::Cancelled,
        capped,
        diagnostics: Diagnostics {
            algorithm: Strategy::Evolutionary.as_str().to_string(),
            generations: outcome.generations,
            population_size,
            evaluations: outcome.evaluations,
            converged: Some(outcome.converged()),
            stop_reason: Some(outcome.stop),
            notes,
            ..Diagnostics::default()
        },
        front: outcome.front,
        ..Search::default()
    })
}

/// Member to recommend.
///
/// Only members whose seller count lies inside `bounds` are considered,
/// unless there are none. Among those, the cheapest fully available member
/// wins, fewest sellers on ties; the cheapest member when none is fully
/// available.
#[must_use]
pub fn recommend<'a>(front: &'a ParetoFront, bounds: &SellerBounds) -> Option<&'a FrontMember> {
    let in_bounds: Vec<&FrontMember> = front
        .members()
        .iter()
        .filter(|m| bounds.contains(m.score.seller_count))
        .collect();
    if in_bounds.is_empty() {
        cheapest(front.members().iter())
    } else {
        cheapest(in_bounds.into_iter())
    }
}

fn cheapest<'a>(members: impl Iterator<Item = &'a FrontMember> + Clone) -> Option<&'a FrontMember> {
    let by_cost_then_sellers = |a: &&FrontMember, b: &&FrontMember| {
        a.score
            .total_cost
            .total_cmp(&b.score.total_cost)
            .then(a.score.seller_count.cmp(&b.score.seller_count))
    };
    members
        .clone()
        .filter(|m| m.score.is_fully_available())
        .min_by(by_cost_then_sellers)
        .or_else(|| members.min_by(by_cost_then_sellers))
}

fn render(
    search: Search,
    problem: &Problem,
    config: &OptimizationConfig,
    run_id: RunId,
    started_at: chrono::DateTime<Utc>,
) -> OptimizationResult {
    let requested = config.strategy;
    let strategy_used = if search.fallback {
        Strategy::Evolutionary
    } else {
        requested
    };
    let mut diagnostics = search.diagnostics;
    diagnostics.front_size = search.front.len();

    let bounds = config.scoring_policy().seller_bounds;
    let Some(best) = recommend(&search.front, &bounds) else {
        let mut result = OptimizationResult::failed(
            run_id,
            started_at,
            requested,
            &diagnostics.algorithm,
            "solver produced no allocation",
        );
        result.strategy_used = strategy_used;
        result.fallback = search.fallback;
        result.diagnostics = diagnostics;
        return result;
    };

    let recommended = PurchasePlan::from_allocation(&best.allocation, best.score, problem);
    let mut kept = search.front.truncated(config.max_front_size);
    if !kept.iter().any(|m| m.score.same_as(&best.score)) {
        kept.pop();
        kept.push(best.clone());
        kept.sort_by(|a, b| a.score.total_cost.total_cmp(&b.score.total_cost));
    }
    let alternatives = kept
        .iter()
        .map(|m| PurchasePlan::from_allocation(&m.allocation, m.score, problem))
        .collect();

    let (status, message) = if search.cancelled {
        (RunStatus::Failed, Some("run cancelled".to_string()))
    } else if search.timed_out {
        (
            RunStatus::TimedOut,
            Some("time limit reached; returning best plan found".to_string()),
        )
    } else {
        (RunStatus::Completed, None)
    };
    if recommended.unfulfilled_units > 0 {
        diagnostics.notes.push(format!(
            "{} wanted units cannot be sourced from the catalog",
            recommended.unfulfilled_units
        ));
    }

    OptimizationResult {
        run_id,
        started_at,
        status,
        message,
        strategy_requested: requested,
        strategy_used,
        fallback: search.fallback,
        partial: search.cancelled
            || search.timed_out
            || search.capped
            || !recommended.is_complete(),
        execution_time_ms: 0,
        recommended: Some(recommended),
        alternatives,
        diagnostics,
    }
}

fn failure(
    err: SolverError,
    config: &OptimizationConfig,
    run_id: RunId,
    started_at: chrono::DateTime<Utc>,
) -> OptimizationResult {
    let algorithm = match &err {
        SolverError::Internal { algorithm, .. } => *algorithm,
        _ => config.strategy.as_str(),
    };
    let mut result = OptimizationResult::failed(
        run_id,
        started_at,
        config.strategy,
        algorithm,
        err.to_string(),
    );
    if matches!(err, SolverError::Timeout { .. }) {
        result.status = RunStatus::TimedOut;
        result.partial = true;
    }
    result
}

fn empty_result(
    problem: &Problem,
    policy: &ScoringPolicy,
    config: &OptimizationConfig,
    run_id: RunId,
    started_at: chrono::DateTime<Utc>,
) -> OptimizationResult {
    let allocation = Allocation::unfulfilled(problem.unit_count());
    let score = score(&allocation, problem, policy);
    let plan = PurchasePlan::from_allocation(&allocation, score, problem);
    let note = if problem.unit_count() == 0 {
        "buylist is empty"
    } else {
        "listing catalog is empty"
    };

    OptimizationResult {
        run_id,
        started_at,
        status: RunStatus::Completed,
        message: Some(note.to_string()),
        strategy_requested: config.strategy,
        strategy_used: config.strategy,
        fallback: false,
        partial: !plan.is_complete(),
        execution_time_ms: 0,
        recommended: Some(plan.clone()),
        alternatives: vec![plan],
        diagnostics: Diagnostics {
            algorithm: "none".to_string(),
            front_size: 1,
            notes: vec![note.to_string()],
            ..Diagnostics::default()
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "solver panicked".to_string()
    }
}

/// Run one optimization with the HiGHS backend and no cancellation.
///
/// # Errors
///
/// Returns an error only when the configuration cannot be repaired.
pub fn optimize(
    problem: &Problem,
    config: &OptimizationConfig,
) -> Result<OptimizationResult, ConfigError> {
    Optimizer::default().optimize(problem, config, &CancelToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Listing, QualityTier, WantedItem};
    use crate::domain::SellerBounds;
    use crate::port::{MilpProblem, MilpSolution, SolutionStatus};
    use rust_decimal_macros::dec;

    fn problem() -> Problem {
        Problem::new(
            vec![WantedItem::try_new("Lightning Bolt", 2, QualityTier::NearMint).unwrap()],
            vec![
                Listing::try_new("a", "Lightning Bolt", "A", dec!(1.00), QualityTier::NearMint, 4)
                    .unwrap(),
                Listing::try_new("b", "Lightning Bolt", "B", dec!(0.50), QualityTier::LightlyPlayed, 4)
                    .unwrap(),
            ],
        )
        .unwrap()
    }

    fn config(strategy: Strategy) -> OptimizationConfig {
        OptimizationConfig {
            strategy,
            population_size: 16,
            generations: 20,
            seed: Some(3),
            threads: Some(1),
            ..OptimizationConfig::default()
        }
    }

    struct FailingSolver;

    impl MilpSolver for FailingSolver {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn solve(&self, _: &MilpProblem, _: &SolveLimits) -> Result<MilpSolution, SolverError> {
            Err(SolverError::Backend {
                backend: "failing",
                message: "license expired".into(),
            })
        }
    }

    struct StalledSolver;

    impl MilpSolver for StalledSolver {
        fn name(&self) -> &'static str {
            "stalled"
        }

        fn solve(&self, milp: &MilpProblem, _: &SolveLimits) -> Result<MilpSolution, SolverError> {
            Ok(MilpSolution {
                values: vec![0.0; milp.num_vars()],
                objective: milp.offset,
                status: SolutionStatus::TimeLimited,
            })
        }
    }

    struct PanickingSolver;

    impl MilpSolver for PanickingSolver {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn solve(&self, _: &MilpProblem, _: &SolveLimits) -> Result<MilpSolution, SolverError> {
            panic!("backend exploded")
        }
    }

    #[test]
    fn exact_strategy_recommends_optimal_plan() {
        let result = optimize(&problem(), &config(Strategy::Exact)).unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        let plan = result.recommended.unwrap();
        assert_eq!(plan.total_cost, dec!(2.00));
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].seller_id.as_str(), "A");
        assert_eq!(result.alternatives.len(), 1);
    }

    #[test]
    fn hybrid_falls_back_when_milp_fails() {
        let optimizer = Optimizer::new(Arc::new(FailingSolver));
        let result = optimizer
            .optimize(&problem(), &config(Strategy::Hybrid), &CancelToken::new())
            .unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert!(result.fallback);
        assert_eq!(result.strategy_requested, Strategy::Hybrid);
        assert_eq!(result.strategy_used, Strategy::Evolutionary);
        assert!(result.diagnostics.notes.iter().any(|n| n.contains("fell back")));
        assert!(result.recommended.is_some());
    }

    #[test]
    fn hybrid_seeds_with_a_time_limited_incumbent() {
        let optimizer = Optimizer::new(Arc::new(StalledSolver));
        let result = optimizer
            .optimize(&problem(), &config(Strategy::Hybrid), &CancelToken::new())
            .unwrap();

        assert!(!result.fallback);
        assert_eq!(result.strategy_used, Strategy::Hybrid);
        assert_eq!(result.diagnostics.algorithm, "hybrid");
        assert_eq!(result.diagnostics.milp_status, Some(SolutionStatus::TimeLimited));
        assert!(result
            .diagnostics
            .notes
            .iter()
            .any(|n| n.contains("hit its budget")));
        assert!(result.recommended.unwrap().is_complete());
    }

    #[test]
    fn generation_cap_marks_the_run_partial() {
        let config = OptimizationConfig {
            generations: 1,
            convergence_patience: 50,
            ..config(Strategy::Evolutionary)
        };
        let result = optimize(&problem(), &config).unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert!(result.partial);
        assert_eq!(result.diagnostics.stop_reason, Some(StopReason::GenerationCap));
        assert!(result
            .diagnostics
            .notes
            .iter()
            .any(|n| n.contains("generation cap")));
    }

    #[test]
    fn recommendation_respects_the_seller_bound() {
        let mut front = ParetoFront::new();
        let score = |cost: f64, sellers: usize| crate::domain::ScoreVector {
            total_cost: cost,
            quality_score: 1.0,
            availability_score: 1,
            seller_count: sellers,
        };
        front.insert(Allocation::unfulfilled(0), score(2.25, 2));
        front.insert(Allocation::unfulfilled(0), score(101.0, 1));

        let capped = SellerBounds { min: 1, max: Some(1) };
        assert_eq!(recommend(&front, &capped).unwrap().score.seller_count, 1);
        assert_eq!(
            recommend(&front, &SellerBounds::default()).unwrap().score.seller_count,
            2
        );

        let unreachable = SellerBounds { min: 5, max: None };
        assert!((recommend(&front, &unreachable).unwrap().score.total_cost - 2.25).abs() < 1e-9);
    }

    #[test]
    fn exact_failure_becomes_failed_envelope() {
        let optimizer = Optimizer::new(Arc::new(FailingSolver));
        let result = optimizer
            .optimize(&problem(), &config(Strategy::Exact), &CancelToken::new())
            .unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert!(result.message.unwrap().contains("license expired"));
        assert!(result.recommended.is_none());
    }

    #[test]
    fn solver_panic_is_contained() {
        let optimizer = Optimizer::new(Arc::new(PanickingSolver));
        let result = optimizer
            .optimize(&problem(), &config(Strategy::Exact), &CancelToken::new())
            .unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.diagnostics.algorithm, "exact");
        assert!(result.message.unwrap().contains("backend exploded"));
        assert_eq!(result.diagnostics.evaluations, 0);
    }

    #[test]
    fn empty_buylist_is_a_structured_result() {
        let problem = Problem::new(vec![], problem().listings().to_vec()).unwrap();
        let result = optimize(&problem, &config(Strategy::Hybrid)).unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert!(!result.partial);
        assert!(result.recommended.unwrap().lines.is_empty());
    }

    #[test]
    fn empty_catalog_leaves_demand_unmet() {
        let problem = Problem::new(problem().wanted().to_vec(), vec![]).unwrap();
        let result = optimize(&problem, &config(Strategy::Exact)).unwrap();

        assert_eq!(result.status, RunStatus::Completed);
        assert!(result.partial);
        assert_eq!(result.unfulfilled_units(), 2);
    }

    #[test]
    fn unrepairable_config_is_an_error() {
        let config = OptimizationConfig {
            generations: 0,
            ..config(Strategy::Evolutionary)
        };
        assert!(optimize(&problem(), &config).is_err());
    }

    #[test]
    fn corrections_are_reported() {
        let config = OptimizationConfig {
            mutation_probability: 3.0,
            ..config(Strategy::Exact)
        };
        let result = optimize(&problem(), &config).unwrap();
        assert_eq!(result.diagnostics.corrections.len(), 1);
    }

    #[test]
    fn cancelled_run_fails_cleanly() {
        let token = CancelToken::new();
        token.cancel();
        let result = Optimizer::default()
            .optimize(&problem(), &config(Strategy::Evolutionary), &token)
            .unwrap();

        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.message.as_deref(), Some("run cancelled"));
        assert!(result.partial);
    }

    #[test]
    fn excluded_sellers_are_not_used() {
        let config = OptimizationConfig {
            excluded_sellers: vec!["A".into()],
            ..config(Strategy::Exact)
        };
        let result = optimize(&problem(), &config).unwrap();

        // Only seller A meets the quality floor.
        assert_eq!(result.unfulfilled_units(), 2);
        assert!(result.partial);
    }
}
