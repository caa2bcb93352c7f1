//! Assignment of demand units to listings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::problem::{ListingIdx, Problem, SellerIdx};

/// Listing chosen for one demand unit, or `None` for unfulfilled.
pub type Gene = Option<ListingIdx>;

/// One candidate answer: a listing (or nothing) per demand unit.
///
/// Allocations produced by [`Allocation::decode`] never draw more copies
/// from a listing than it offers. Raw genomes handled by the evolutionary
/// search may over-subscribe; decoding turns the excess into unfulfilled
/// units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Allocation {
    assignments: Vec<Gene>,
}

impl Allocation {
    /// Allocation leaving every unit unfulfilled.
    #[must_use]
    pub fn unfulfilled(units: usize) -> Self {
        Self {
            assignments: vec![None; units],
        }
    }

    /// Wrap assignments verbatim, without a capacity check.
    #[must_use]
    pub fn from_assignments(assignments: Vec<Gene>) -> Self {
        Self { assignments }
    }

    /// Build a capacity-respecting allocation from a raw genome.
    ///
    /// Units are served in gene order; once a listing's copies are used up,
    /// later units pointing at it become unfulfilled.
    #[must_use]
    pub fn decode(genes: &[Gene], problem: &Problem) -> Self {
        let mut drawn: HashMap<ListingIdx, u32> = HashMap::with_capacity(genes.len());
        let assignments = genes
            .iter()
            .map(|gene| {
                let idx = (*gene)?;
                let used = drawn.entry(idx).or_insert(0);
                if *used < problem.listing(idx).quantity {
                    *used += 1;
                    Some(idx)
                } else {
                    None
                }
            })
            .collect();
        Self { assignments }
    }

    /// Per-unit assignments in [`Problem::units`] order.
    #[must_use]
    pub fn assignments(&self) -> &[Gene] {
        &self.assignments
    }

    /// Number of demand units covered by this allocation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// True when there is no demand at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Units assigned to some listing.
    #[must_use]
    pub fn fulfilled_units(&self) -> usize {
        self.assignments.iter().filter(|g| g.is_some()).count()
    }

    /// Units left without a listing.
    #[must_use]
    pub fn unfulfilled_units(&self) -> usize {
        self.len() - self.fulfilled_units()
    }

    /// Copies drawn per listing.
    #[must_use]
    pub fn usage(&self) -> BTreeMap<ListingIdx, u32> {
        let mut usage = BTreeMap::new();
        for idx in self.assignments.iter().flatten() {
            *usage.entry(*idx).or_insert(0) += 1;
        }
        usage
    }

    /// No listing is drawn beyond its available quantity.
    #[must_use]
    pub fn respects_capacity(&self, problem: &Problem) -> bool {
        self.usage()
            .iter()
            .all(|(idx, used)| *used <= problem.listing(*idx).quantity)
    }

    /// Distinct sellers referenced by the allocation.
    #[must_use]
    pub fn sellers(&self, problem: &Problem) -> BTreeSet<SellerIdx> {
        self.assignments
            .iter()
            .flatten()
            .map(|idx| problem.seller_of(*idx))
            .collect()
    }

    /// Unfulfilled copies per wanted item, in buylist order.
    #[must_use]
    pub fn missing_by_wanted(&self, problem: &Problem) -> Vec<u32> {
        let mut missing = vec![0u32; problem.wanted().len()];
        for (unit, gene) in problem.units().iter().zip(&self.assignments) {
            if gene.is_none() {
                missing[unit.wanted] += 1;
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Listing, QualityTier, WantedItem};
    use rust_decimal_macros::dec;

    fn problem() -> Problem {
        Problem::new(
            vec![WantedItem::try_new("Opt", 3, QualityTier::Damaged).unwrap()],
            vec![
                Listing::try_new("1", "Opt", "a", dec!(0.10), QualityTier::NearMint, 1).unwrap(),
                Listing::try_new("2", "Opt", "b", dec!(0.20), QualityTier::NearMint, 5).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn decode_trims_oversubscription() {
        let problem = problem();
        let first = problem.eligible_for(0)[0];
        let genes = vec![Some(first), Some(first), Some(first)];

        let allocation = Allocation::decode(&genes, &problem);

        assert!(allocation.respects_capacity(&problem));
        assert_eq!(allocation.fulfilled_units(), 1);
        assert_eq!(allocation.missing_by_wanted(&problem), vec![2]);
    }

    #[test]
    fn raw_assignments_can_break_capacity() {
        let problem = problem();
        let first = problem.eligible_for(0)[0];
        let allocation = Allocation::from_assignments(vec![Some(first), Some(first), None]);
        assert!(!allocation.respects_capacity(&problem));
    }

    #[test]
    fn counts_distinct_sellers() {
        let problem = problem();
        let [a, b] = [problem.eligible_for(0)[0], problem.eligible_for(0)[1]];
        let allocation = Allocation::decode(&[Some(a), Some(b), Some(b)], &problem);
        assert_eq!(allocation.sellers(&problem).len(), 2);
        assert_eq!(allocation.usage().get(&b), Some(&2));
    }

    #[test]
    fn unfulfilled_allocation_has_no_sellers() {
        let problem = problem();
        let allocation = Allocation::unfulfilled(problem.unit_count());
        assert_eq!(allocation.unfulfilled_units(), 3);
        assert!(allocation.sellers(&problem).is_empty());
    }
}
