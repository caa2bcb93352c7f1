//! Purchase plans: the caller-facing rendering of an allocation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::Allocation;
use super::id::{ListingId, SellerId};
use super::money::Price;
use super::problem::{ListingIdx, Problem};
use super::quality::QualityTier;
use super::score::ScoreVector;

/// Copies bought from one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLine {
    pub card_name: String,
    pub listing_id: ListingId,
    pub seller_id: SellerId,
    pub seller_name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub quality: QualityTier,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    pub line_total: Price,
}

/// Spend with one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerSubtotal {
    pub seller_id: SellerId,
    pub seller_name: String,
    pub items: u32,
    pub subtotal: Price,
}

/// Copies of a wanted item the plan could not source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub card_name: String,
    pub requested: u32,
    pub missing: u32,
}

/// Line items plus aggregate totals for one allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub lines: Vec<PlanLine>,
    /// Money actually spent, without penalties.
    pub total_cost: Price,
    pub seller_count: usize,
    /// Fulfilled units over demanded units, 1.0 for an empty buylist.
    pub fulfilled_fraction: f64,
    pub unfulfilled_units: usize,
    pub shortfalls: Vec<Shortfall>,
    pub sellers: Vec<SellerSubtotal>,
    /// Score the solver ranked this plan by.
    pub score: ScoreVector,
}

impl PurchasePlan {
    /// Render an allocation as a plan.
    ///
    /// Lines are grouped per listing and ordered by buylist position, then
    /// by catalog position.
    #[must_use]
    pub fn from_allocation(allocation: &Allocation, score: ScoreVector, problem: &Problem) -> Self {
        let mut per_listing: BTreeMap<(usize, ListingIdx), u32> = BTreeMap::new();
        for (unit, gene) in problem.units().iter().zip(allocation.assignments()) {
            if let Some(idx) = gene {
                *per_listing.entry((unit.wanted, *idx)).or_insert(0) += 1;
            }
        }

        let lines: Vec<PlanLine> = per_listing
            .into_iter()
            .map(|((_, idx), quantity)| {
                let listing = problem.listing(idx);
                PlanLine {
                    card_name: listing.card_name.clone(),
                    listing_id: listing.id.clone(),
                    seller_id: listing.seller_id.clone(),
                    seller_name: listing.seller_name.clone(),
                    quantity,
                    unit_price: listing.price,
                    quality: listing.quality,
                    language: listing.language.clone(),
                    set_code: listing.set_code.clone(),
                    line_total: listing.price * Decimal::from(quantity),
                }
            })
            .collect();

        let mut subtotals: BTreeMap<SellerId, SellerSubtotal> = BTreeMap::new();
        for line in &lines {
            let entry = subtotals
                .entry(line.seller_id.clone())
                .or_insert_with(|| SellerSubtotal {
                    seller_id: line.seller_id.clone(),
                    seller_name: line.seller_name.clone(),
                    items: 0,
                    subtotal: Decimal::ZERO,
                });
            entry.items += line.quantity;
            entry.subtotal += line.line_total;
        }

        let shortfalls = problem
            .wanted()
            .iter()
            .zip(allocation.missing_by_wanted(problem))
            .filter(|(_, missing)| *missing > 0)
            .map(|(item, missing)| Shortfall {
                card_name: item.card_name.clone(),
                requested: item.quantity,
                missing,
            })
            .collect();

        let total_cost = lines.iter().map(|l| l.line_total).sum();
        let units = allocation.len();
        let fulfilled_fraction = if units == 0 {
            1.0
        } else {
            allocation.fulfilled_units() as f64 / units as f64
        };

        Self {
            lines,
            total_cost,
            seller_count: subtotals.len(),
            fulfilled_fraction,
            unfulfilled_units: allocation.unfulfilled_units(),
            shortfalls,
            sellers: subtotals.into_values().collect(),
            score,
        }
    }

    /// Every wanted copy is sourced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unfulfilled_units == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::{score, ScoringPolicy};
    use crate::domain::{Listing, WantedItem};
    use rust_decimal_macros::dec;

    #[test]
    fn groups_units_into_lines() {
        let problem = Problem::new(
            vec![
                WantedItem::try_new("Opt", 3, QualityTier::Damaged).unwrap(),
                WantedItem::try_new("Brainstorm", 2, QualityTier::Damaged).unwrap(),
            ],
            vec![
                Listing::try_new("1", "Opt", "a", dec!(0.10), QualityTier::NearMint, 2).unwrap(),
                Listing::try_new("2", "Opt", "b", dec!(0.25), QualityTier::NearMint, 5).unwrap(),
                Listing::try_new("3", "Brainstorm", "a", dec!(1.00), QualityTier::NearMint, 1)
                    .unwrap(),
            ],
        )
        .unwrap();
        let opt = problem.eligible_for(0);
        let storm = problem.eligible_for(1);
        let allocation = Allocation::decode(
            &[Some(opt[0]), Some(opt[0]), Some(opt[1]), Some(storm[0]), Some(storm[0])],
            &problem,
        );
        let score = score(&allocation, &problem, &ScoringPolicy::default());

        let plan = PurchasePlan::from_allocation(&allocation, score, &problem);

        assert_eq!(plan.lines.len(), 3);
        assert_eq!(plan.lines[0].card_name, "Opt");
        assert_eq!(plan.lines[0].quantity, 2);
        assert_eq!(plan.total_cost, dec!(0.20) + dec!(0.25) + dec!(1.00));
        assert_eq!(plan.seller_count, 2);
        assert_eq!(plan.unfulfilled_units, 1);
        assert_eq!(
            plan.shortfalls,
            vec![Shortfall {
                card_name: "Brainstorm".into(),
                requested: 2,
                missing: 1
            }]
        );
        assert!((plan.fulfilled_fraction - 0.8).abs() < 1e-9);
        let a = plan.sellers.iter().find(|s| s.seller_id.as_str() == "a").unwrap();
        assert_eq!(a.items, 3);
        assert_eq!(a.subtotal, dec!(1.20));
    }

    #[test]
    fn empty_allocation_is_complete() {
        let problem = Problem::new(vec![], vec![]).unwrap();
        let allocation = Allocation::unfulfilled(0);
        let score = score(&allocation, &problem, &ScoringPolicy::default());
        let plan = PurchasePlan::from_allocation(&allocation, score, &problem);
        assert!(plan.is_complete());
        assert_eq!(plan.total_cost, Decimal::ZERO);
    }
}
