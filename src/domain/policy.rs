//! Constraint and scoring policy.
//!
//! Pure functions from an [`Allocation`] to a [`ScoreVector`]. Both solvers
//! score through here so that the MILP objective and the evolutionary cost
//! dimension agree.
//!
//! # Cost
//!
//! ```text
//! cost = sum(unit price + language surcharge)
//!      + missing units * missing_unit_penalty
//!      + sellers outside [min, max] * seller_bound_penalty
//!
//! language surcharge = max(price * (language_multiplier - 1), language_surcharge_floor)
//! ```
//!
//! The penalties are ordered missing-demand >> language >> seller-bound so
//! that satisfying demand always outranks saving money, and keeping to the
//! preferred language outranks consolidating sellers. The surcharge floor
//! keeps the second ordering for cheap cards, where the multiplier alone
//! would add only a few cents.

use serde::{Deserialize, Serialize};

use super::allocation::{Allocation, Gene};
use super::item::Listing;
use super::money;
use super::problem::Problem;
use super::quality::QualityTier;
use super::score::ScoreVector;

/// Per-tier weights for the quality objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub nm: f64,
    pub lp: f64,
    pub mp: f64,
    pub hp: f64,
    pub dmg: f64,
}

impl QualityWeights {
    /// Weight of one tier.
    #[must_use]
    pub const fn weight(&self, tier: QualityTier) -> f64 {
        match tier {
            QualityTier::NearMint => self.nm,
            QualityTier::LightlyPlayed => self.lp,
            QualityTier::ModeratelyPlayed => self.mp,
            QualityTier::HeavilyPlayed => self.hp,
            QualityTier::Damaged => self.dmg,
        }
    }

    fn all(&self) -> [f64; 5] {
        [self.nm, self.lp, self.mp, self.hp, self.dmg]
    }
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            nm: 1.0,
            lp: 0.8,
            mp: 0.6,
            hp: 0.4,
            dmg: 0.2,
        }
    }
}

/// Penalty magnitudes and quality weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Added to cost per unfulfilled demand unit.
    pub missing_unit_penalty: f64,
    /// Price multiplier for copies not in the preferred language.
    pub language_multiplier: f64,
    /// Smallest surcharge per copy not in the preferred language.
    pub language_surcharge_floor: f64,
    /// Added to cost per seller below the minimum or above the maximum.
    pub seller_bound_penalty: f64,
    /// Quality objective weights.
    pub quality: QualityWeights,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            missing_unit_penalty: 10_000.0,
            language_multiplier: 1.5,
            language_surcharge_floor: 0.5,
            seller_bound_penalty: 0.25,
            quality: QualityWeights::default(),
        }
    }
}

impl ScoringWeights {
    /// Every weight is finite and no penalty is negative.
    #[must_use]
    pub fn is_sane(&self) -> bool {
        let scalars = [
            self.missing_unit_penalty,
            self.language_multiplier,
            self.language_surcharge_floor,
            self.seller_bound_penalty,
        ];
        scalars.iter().all(|w| w.is_finite() && *w >= 0.0)
            && self.quality.all().iter().all(|w| w.is_finite())
    }
}

/// Inclusive bound on the number of distinct sellers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerBounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl SellerBounds {
    /// Number of sellers by which `count` falls outside the bound.
    #[must_use]
    pub fn violation(&self, count: usize) -> usize {
        let below = self.min.saturating_sub(count);
        let above = self.max.map_or(0, |max| count.saturating_sub(max));
        below + above
    }

    /// `count` lies inside the bound.
    #[must_use]
    pub fn contains(&self, count: usize) -> bool {
        self.violation(count) == 0
    }
}

impl Default for SellerBounds {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

/// Everything the scoring functions need besides the allocation itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringPolicy {
    pub weights: ScoringWeights,
    pub preferred_language: Option<String>,
    pub seller_bounds: SellerBounds,
}

impl ScoringPolicy {
    /// Effective cost of one copy from a listing.
    #[must_use]
    pub fn unit_cost(&self, listing: &Listing) -> f64 {
        let price = money::to_f64(listing.price);
        match &self.preferred_language {
            Some(lang) if !listing.language.eq_ignore_ascii_case(lang) => {
                price + self.language_surcharge(price)
            }
            _ => price,
        }
    }

    /// Surcharge on one copy at `price` that is not in the preferred language.
    #[must_use]
    pub fn language_surcharge(&self, price: f64) -> f64 {
        let weights = &self.weights;
        (price * (weights.language_multiplier - 1.0)).max(weights.language_surcharge_floor)
    }

    /// Allocation honours listing capacities and the seller-count bound.
    ///
    /// Infeasible allocations are still scored; this predicate only
    /// classifies them.
    #[must_use]
    pub fn is_feasible(&self, allocation: &Allocation, problem: &Problem) -> bool {
        allocation.respects_capacity(problem)
            && self
                .seller_bounds
                .contains(allocation.sellers(problem).len())
    }
}

/// Score one allocation.
#[must_use]
pub fn score(allocation: &Allocation, problem: &Problem, policy: &ScoringPolicy) -> ScoreVector {
    Evaluator::new(problem, policy).score(allocation)
}

/// Scoring with per-listing cost and quality tables precomputed.
///
/// Shared read-only across evaluation threads.
#[derive(Debug)]
pub struct Evaluator<'a> {
    problem: &'a Problem,
    policy: &'a ScoringPolicy,
    unit_cost: Vec<f64>,
    unit_quality: Vec<f64>,
}

impl<'a> Evaluator<'a> {
    /// Precompute the tables for one problem.
    #[must_use]
    pub fn new(problem: &'a Problem, policy: &'a ScoringPolicy) -> Self {
        let unit_cost = problem
            .listings()
            .iter()
            .map(|l| policy.unit_cost(l))
            .collect();
        let unit_quality = problem
            .listings()
            .iter()
            .map(|l| policy.weights.quality.weight(l.quality))
            .collect();
        Self {
            problem,
            policy,
            unit_cost,
            unit_quality,
        }
    }

    /// Problem being scored.
    #[must_use]
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Policy being applied.
    #[must_use]
    pub fn policy(&self) -> &'a ScoringPolicy {
        self.policy
    }

    /// Effective cost of one copy of the listing at `index`.
    #[must_use]
    pub fn unit_cost(&self, index: usize) -> f64 {
        self.unit_cost[index]
    }

    /// Score an allocation.
    #[must_use]
    pub fn score(&self, allocation: &Allocation) -> ScoreVector {
        let units = allocation.len();
        let mut spend = 0.0;
        let mut quality = 0.0;
        for idx in allocation.assignments().iter().flatten() {
            spend += self.unit_cost[idx.index()];
            quality += self.unit_quality[idx.index()];
        }

        let missing = allocation.unfulfilled_units();
        let sellers = allocation.sellers(self.problem).len();
        let violation = if units == 0 {
            0
        } else {
            self.policy.seller_bounds.violation(sellers)
        };
        let weights = &self.policy.weights;
        let total_cost = spend
            + missing as f64 * weights.missing_unit_penalty
            + violation as f64 * weights.seller_bound_penalty;

        ScoreVector {
            total_cost,
            quality_score: if units == 0 {
                0.0
            } else {
                quality / units as f64
            },
            availability_score: u8::from(missing == 0),
            seller_count: sellers,
        }
    }

    /// Decode a raw genome and score the result.
    #[must_use]
    pub fn evaluate_genome(&self, genes: &[Gene]) -> (Allocation, ScoreVector) {
        let allocation = Allocation::decode(genes, self.problem);
        let score = self.score(&allocation);
        (allocation, score)
    }
}
