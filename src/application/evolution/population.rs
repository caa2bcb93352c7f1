//! Population arena.
//!
//! Genomes live back to back in one `Vec<Gene>`; individual `i` occupies
//! `genes[i * width..(i + 1) * width]`. Scores are cached per individual and
//! cleared whenever a genome is handed out mutably.

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::domain::{Evaluator, Gene, ScoreVector};

/// Placeholder score for individuals not yet evaluated; worse than any real
/// score in every objective.
const UNSCORED: ScoreVector = ScoreVector {
    total_cost: f64::INFINITY,
    quality_score: f64::NEG_INFINITY,
    availability_score: 0,
    seller_count: usize::MAX,
};

#[derive(Debug, Clone)]
pub struct Population {
    width: usize,
    genes: Vec<Gene>,
    fitness: Vec<Option<ScoreVector>>,
}

impl Population {
    /// Empty population of genomes with `width` genes each.
    #[must_use]
    pub fn with_capacity(width: usize, individuals: usize) -> Self {
        Self {
            width,
            genes: Vec::with_capacity(width * individuals),
            fitness: Vec::with_capacity(individuals),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    #[must_use]
    pub fn genome(&self, i: usize) -> &[Gene] {
        &self.genes[i * self.width..(i + 1) * self.width]
    }

    /// Mutable genome; its cached score is dropped.
    pub fn genome_mut(&mut self, i: usize) -> &mut [Gene] {
        self.fitness[i] = None;
        &mut self.genes[i * self.width..(i + 1) * self.width]
    }

    /// Append an unevaluated genome.
    pub fn push(&mut self, genome: &[Gene]) {
        debug_assert_eq!(genome.len(), self.width);
        self.genes.extend_from_slice(genome);
        self.fitness.push(None);
    }

    /// Append a genome whose score is already known.
    pub fn push_scored(&mut self, genome: &[Gene], score: ScoreVector) {
        self.push(genome);
        if let Some(slot) = self.fitness.last_mut() {
            *slot = Some(score);
        }
    }

    /// Cached score, if evaluated.
    #[must_use]
    pub fn score(&self, i: usize) -> Option<ScoreVector> {
        self.fitness[i]
    }

    /// Scores in individual order; unevaluated entries rank last.
    #[must_use]
    pub fn scores(&self) -> Vec<ScoreVector> {
        self.fitness.iter().map(|s| s.unwrap_or(UNSCORED)).collect()
    }

    /// Lowest total cost among evaluated individuals.
    #[must_use]
    pub fn best_cost(&self) -> f64 {
        self.fitness
            .iter()
            .flatten()
            .map(|s| s.total_cost)
            .fold(f64::INFINITY, f64::min)
    }

    /// Score every individual without a cached score, in parallel on `pool`.
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate(&mut self, evaluator: &Evaluator<'_>, pool: &ThreadPool) -> usize {
        let pending = self.fitness.iter().filter(|s| s.is_none()).count();
        if pending == 0 {
            return 0;
        }

        if self.width == 0 {
            let empty = evaluator.evaluate_genome(&[]).1;
            for slot in self.fitness.iter_mut().filter(|s| s.is_none()) {
                *slot = Some(empty);
            }
            return pending;
        }

        let width = self.width;
        let genes = &self.genes;
        let fitness = &mut self.fitness;
        pool.install(|| {
            genes
                .par_chunks(width)
                .zip(fitness.par_iter_mut())
                .filter(|(_, slot)| slot.is_none())
                .for_each(|(genome, slot)| {
                    *slot = Some(evaluator.evaluate_genome(genome).1);
                });
        });
        pending
    }

    /// New population holding copies of the given individuals, scores kept.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut next = Self::with_capacity(self.width, indices.len());
        for &i in indices {
            next.genes.extend_from_slice(self.genome(i));
            next.fitness.push(self.fitness[i]);
        }
        next
    }

    /// Move every individual of `other` into this population.
    pub fn append(&mut self, mut other: Self) {
        debug_assert_eq!(other.width, self.width);
        self.genes.append(&mut other.genes);
        self.fitness.append(&mut other.fitness);
    }
}
