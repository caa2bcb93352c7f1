//! Variation operators over raw genomes.
//!
//! Genes only ever take values from the eligible set of their demand unit
//! (or `None` when that set is empty). Capacity is not enforced here.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Gene, Problem};

/// Uniformly chosen eligible listing for one demand unit.
pub fn sample_gene<R: Rng + ?Sized>(problem: &Problem, unit: usize, rng: &mut R) -> Gene {
    problem.eligible_for_unit(unit).choose(rng).copied()
}

/// Append one random genome to `out`.
pub fn random_genome<R: Rng + ?Sized>(problem: &Problem, rng: &mut R, out: &mut Vec<Gene>) {
    out.extend((0..problem.unit_count()).map(|unit| sample_gene(problem, unit, rng)));
}

/// Uniform crossover: swap each gene position with probability 1/2.
///
/// Returns the number of positions whose genes actually changed.
pub fn uniform_crossover<R: Rng + ?Sized>(a: &mut [Gene], b: &mut [Gene], rng: &mut R) -> usize {
    let mut changed = 0;
    for (x, y) in a.iter_mut().zip(b.iter_mut()) {
        if rng.gen_bool(0.5) && x != y {
            std::mem::swap(x, y);
            changed += 1;
        }
    }
    changed
}

/// Resample each gene with probability `probability`.
///
/// Returns the number of genes whose value changed.
pub fn mutate<R: Rng + ?Sized>(
    genome: &mut [Gene],
    problem: &Problem,
    probability: f64,
    rng: &mut R,
) -> usize {
    if probability <= 0.0 {
        return 0;
    }
    let mut changed = 0;
    for (unit, gene) in genome.iter_mut().enumerate() {
        if rng.gen_bool(probability) {
            let fresh = sample_gene(problem, unit, rng);
            if fresh != *gene {
                *gene = fresh;
                changed += 1;
            }
        }
    }
    changed
}
