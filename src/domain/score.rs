//! Multi-objective score attached to an allocation.
//!
//! # Objectives
//!
//! | dimension            | direction |
//! |----------------------|-----------|
//! | `total_cost`         | minimize  |
//! | `quality_score`      | maximize  |
//! | `availability_score` | maximize  |
//! | `seller_count`       | minimize  |
//!
//! Comparison goes through [`ScoreVector::objectives`], which flips the
//! maximized dimensions so every entry is minimized.

use serde::{Deserialize, Serialize};

/// Direction of one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Objective names and directions, in [`ScoreVector::objectives`] order.
pub const OBJECTIVES: [(&str, Direction); 4] = [
    ("total_cost", Direction::Minimize),
    ("quality_score", Direction::Maximize),
    ("availability_score", Direction::Maximize),
    ("seller_count", Direction::Minimize),
];

/// Costs closer than this are treated as equal when deduplicating.
const COST_EPSILON: f64 = 1e-6;

/// Score of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    /// Spend plus language surcharge plus missing-demand and seller-bound
    /// penalties.
    pub total_cost: f64,
    /// Mean quality weight over all demand units, 0 for unfulfilled ones.
    pub quality_score: f64,
    /// 1 when every wanted item is fully covered, else 0.
    pub availability_score: u8,
    /// Distinct sellers used.
    pub seller_count: usize,
}

impl ScoreVector {
    /// All four objectives as values to minimize.
    #[must_use]
    pub fn objectives(&self) -> [f64; 4] {
        [
            self.total_cost,
            -self.quality_score,
            -f64::from(self.availability_score),
            self.seller_count as f64,
        ]
    }

    /// Strict Pareto dominance.
    ///
    /// `self` dominates `other` when it is no worse in every dimension and
    /// strictly better in at least one. Irreflexive and asymmetric.
    #[must_use]
    pub fn dominates(&self, other: &Self) -> bool {
        let mine = self.objectives();
        let theirs = other.objectives();
        let mut strictly_better = false;
        for (a, b) in mine.iter().zip(theirs.iter()) {
            if a > b {
                return false;
            }
            if a < b {
                strictly_better = true;
            }
        }
        strictly_better
    }

    /// Score equality used to deduplicate the Pareto front.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        (self.total_cost - other.total_cost).abs() < COST_EPSILON
            && (self.quality_score - other.quality_score).abs() < COST_EPSILON
            && self.availability_score == other.availability_score
            && self.seller_count == other.seller_count
    }

    /// Every wanted item is fully covered.
    #[must_use]
    pub const fn is_fully_available(&self) -> bool {
        self.availability_score == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(cost: f64, quality: f64, available: u8, sellers: usize) -> ScoreVector {
        ScoreVector {
            total_cost: cost,
            quality_score: quality,
            availability_score: available,
            seller_count: sellers,
        }
    }

    #[test]
    fn dominance_is_irreflexive() {
        let a = score(10.0, 0.8, 1, 2);
        assert!(!a.dominates(&a));
    }

    #[test]
    fn dominance_is_asymmetric() {
        let a = score(10.0, 0.8, 1, 2);
        let b = score(12.0, 0.8, 1, 2);
        assert!(a.dominates(&b));
        assert!(!b.dominates(&a));
    }

    #[test]
    fn respects_maximize_directions() {
        let better_quality = score(10.0, 0.9, 1, 2);
        let worse_quality = score(10.0, 0.7, 1, 2);
        assert!(better_quality.dominates(&worse_quality));

        let available = score(10.0, 0.8, 1, 2);
        let unavailable = score(10.0, 0.8, 0, 2);
        assert!(available.dominates(&unavailable));
    }

    #[test]
    fn trade_offs_do_not_dominate() {
        let cheap = score(5.0, 0.6, 1, 3);
        let few_sellers = score(8.0, 0.6, 1, 1);
        assert!(!cheap.dominates(&few_sellers));
        assert!(!few_sellers.dominates(&cheap));
    }

    #[test]
    fn objectives_table_matches_vector_order() {
        assert_eq!(OBJECTIVES.len(), score(0.0, 0.0, 0, 0).objectives().len());
        assert_eq!(OBJECTIVES[1].1, Direction::Maximize);
    }

    #[test]
    fn same_as_ignores_float_noise() {
        let a = score(10.0, 0.8, 1, 2);
        let b = score(10.0 + 1e-9, 0.8, 1, 2);
        assert!(a.same_as(&b));
        assert!(!a.same_as(&score(10.1, 0.8, 1, 2)));
    }
}
