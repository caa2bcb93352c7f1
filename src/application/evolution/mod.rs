//! Multi-objective evolutionary search (NSGA-II).
//!
//! An individual carries one gene per demand unit. Each generation:
//!
//! 1. Parents are drawn by binary tournament on (front rank, crowding).
//! 2. Pairs are recombined by uniform crossover, then mutated per gene.
//! 3. Offspring whose genes changed are scored in parallel.
//! 4. Every scored offspring is offered to the running [`ParetoFront`].
//! 5. Parents and offspring compete for the next generation: the cheapest
//!    `elite_count` survive outright, the rest by rank and crowding.
//!
//! The run ends at the generation cap, when the best cost stops improving
//! for `convergence_patience` generations, at the optional wall-clock limit,
//! or when the cancel token is raised.

mod convergence;
mod operators;
mod population;
mod selection;

pub use convergence::ConvergenceTracker;
pub use operators::{mutate, random_genome, sample_gene, uniform_crossover};
pub use population::Population;
pub use selection::{non_dominated_sort, survivors, tournament, Ranking};

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::config::OptimizationConfig;
use crate::domain::{
    Allocation, Evaluator, Gene, ParetoFront, Problem, ScoreVector, ScoringPolicy,
};
use crate::error::SolverError;

const ALGORITHM: &str = "evolutionary";

/// Search parameters, taken from a validated [`OptimizationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionParams {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub convergence_threshold: f64,
    pub convergence_patience: usize,
    pub elite_count: usize,
    pub seed: Option<u64>,
    pub threads: usize,
    pub time_limit: Option<Duration>,
}

impl EvolutionParams {
    #[must_use]
    pub fn from_config(config: &OptimizationConfig) -> Self {
        Self {
            population_size: config.population_size,
            generations: config.generations,
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            convergence_threshold: config.convergence_threshold,
            convergence_patience: config.convergence_patience,
            elite_count: config.elite_count,
            seed: config.seed,
            threads: config.worker_threads(),
            time_limit: config.limits.evolution_time_limit(),
        }
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Converged,
    GenerationCap,
    TimeLimit,
    Cancelled,
}

/// Result of one evolutionary run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Every non-dominated allocation seen during the run.
    pub front: ParetoFront,
    /// Generations completed after the initial population.
    pub generations: usize,
    /// Individuals scored, initial population included.
    pub evaluations: usize,
    pub stop: StopReason,
}

impl EvolutionOutcome {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.stop == StopReason::Converged
    }
}

/// NSGA-II over one problem.
pub struct EvolutionarySolver<'a> {
    evaluator: Evaluator<'a>,
    params: EvolutionParams,
}

impl<'a> EvolutionarySolver<'a> {
    #[must_use]
    pub fn new(problem: &'a Problem, policy: &'a ScoringPolicy, params: EvolutionParams) -> Self {
        Self {
            evaluator: Evaluator::new(problem, policy),
            params,
        }
    }

    #[must_use]
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Run the search, optionally injecting `seed` into generation 0.
    ///
    /// A raised cancel token ends the run at the next generation boundary
    /// with [`StopReason::Cancelled`]; the front gathered so far is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Internal`] if the evaluation pool cannot be
    /// created.
    pub fn run(
        &self,
        seed: Option<&Allocation>,
        cancel: &CancelToken,
    ) -> Result<EvolutionOutcome, SolverError> {
        let params = &self.params;
        let problem = self.evaluator.problem();
        let width = problem.unit_count();
        let size = params.population_size.max(1);
        let started = Instant::now();

        let pool = ThreadPoolBuilder::new()
            .num_threads(params.threads)
            .thread_name(|i| format!("cardplan-eval-{i}"))
            .build()
            .map_err(|e| SolverError::Internal {
                algorithm: ALGORITHM,
                message: format!("failed to build evaluation pool: {e}"),
            })?;
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut population = Population::with_capacity(width, size);
        let mut genome = Vec::with_capacity(width);
        for _ in 0..size {
            genome.clear();
            random_genome(problem, &mut rng, &mut genome);
            population.push(&genome);
        }
        if let Some(seed) = seed {
            if seed.len() == width {
                let slot = rng.gen_range(0..size);
                population
                    .genome_mut(slot)
                    .copy_from_slice(seed.assignments());
                debug!(slot, "seeded generation 0");
            } else {
                warn!(
                    seed_units = seed.len(),
                    units = width,
                    "seed allocation does not match the problem, ignored"
                );
            }
        }

        let mut evaluations = population.evaluate(&self.evaluator, &pool);
        let mut front = ParetoFront::new();
        self.record(&mut front, &population);

        let mut tracker =
            ConvergenceTracker::new(params.convergence_threshold, params.convergence_patience);
        tracker.observe(population.best_cost());

        let mut generations = 0;
        let stop = loop {
            if generations >= params.generations {
                break StopReason::GenerationCap;
            }
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if params
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break StopReason::TimeLimit;
            }

            let offspring = self.breed(&population, &mut rng);
            evaluations += self.evaluate(&mut population, offspring, &pool, &mut front);

            let keep = survivors(&population.scores(), size, params.elite_count);
            population = population.select(&keep);
            generations += 1;

            let best = population.best_cost();
            debug!(
                generation = generations,
                best_cost = best,
                front = front.len(),
                "generation complete"
            );
            if tracker.observe(best) {
                break StopReason::Converged;
            }
        };

        info!(
            generations,
            evaluations,
            front = front.len(),
            best_cost = tracker.best().unwrap_or(f64::INFINITY),
            stop = ?stop,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evolutionary search finished"
        );

        Ok(EvolutionOutcome {
            front,
            generations,
            evaluations,
            stop,
        })
    }

    /// One offspring per population slot.
    fn breed(&self, population: &Population, rng: &mut StdRng) -> Population {
        let params = &self.params;
        let problem = self.evaluator.problem();
        let size = population.len();
        let ranking = Ranking::new(&population.scores());
        let mut offspring = Population::with_capacity(problem.unit_count(), size);

        while offspring.len() < size {
            let a = tournament(&ranking, rng);
            let b = tournament(&ranking, rng);
            let mut child_a = population.genome(a).to_vec();
            let mut child_b = population.genome(b).to_vec();

            let mut swapped = 0;
            if rng.gen_bool(params.crossover_probability) {
                swapped = uniform_crossover(&mut child_a, &mut child_b, rng);
            }
            let changed_a = swapped + mutate(&mut child_a, problem, params.mutation_probability, rng);
            let changed_b = swapped + mutate(&mut child_b, problem, params.mutation_probability, rng);

            push_child(&mut offspring, &child_a, changed_a, population.score(a));
            if offspring.len() < size {
                push_child(&mut offspring, &child_b, changed_b, population.score(b));
            }
        }
        offspring
    }

    /// Score the offspring, offer them to the front, and merge them into the
    /// population. Returns the number of evaluations performed.
    fn evaluate(
        &self,
        population: &mut Population,
        mut offspring: Population,
        pool: &ThreadPool,
        front: &mut ParetoFront,
    ) -> usize {
        let evaluated = offspring.evaluate(&self.evaluator, pool);
        self.record(front, &offspring);
        population.append(offspring);
        evaluated
    }

    fn record(&self, front: &mut ParetoFront, population: &Population) {
        let problem = self.evaluator.problem();
        for i in 0..population.len() {
            let Some(score) = population.score(i) else {
                continue;
            };
            if front.admits(&score) {
                front.insert(Allocation::decode(population.genome(i), problem), score);
            }
        }
    }
}

/// Unchanged children inherit the parent's cached score.
fn push_child(
    offspring: &mut Population,
    genome: &[Gene],
    changed: usize,
    parent_score: Option<ScoreVector>,
) {
    match parent_score {
        Some(score) if changed == 0 => offspring.push_scored(genome, score),
        _ => offspring.push(genome),
    }
}
