//! Builders for domain records used across tests.
//!
//! Provides concise factory functions for [`WantedItem`], [`Listing`] and
//! [`Problem`] so tests focus on assertions rather than construction
//! boilerplate. Every builder panics on invalid input.

use rust_decimal::Decimal;

use crate::domain::{Listing, Problem, QualityTier, WantedItem};

/// A wanted item with the loosest condition floor.
pub fn want(card: &str, quantity: u32) -> WantedItem {
    want_at(card, quantity, QualityTier::Damaged)
}

/// A wanted item with the given condition floor.
pub fn want_at(card: &str, quantity: u32, min_quality: QualityTier) -> WantedItem {
    WantedItem::try_new(card, quantity, min_quality).expect("valid wanted item")
}

/// A Near Mint English listing.
///
/// `price` is given in cents to keep call sites short.
pub fn listing(id: &str, card: &str, seller: &str, price_cents: i64, quantity: u32) -> Listing {
    listing_at(id, card, seller, price_cents, quantity, QualityTier::NearMint)
}

/// An English listing in the given condition.
pub fn listing_at(
    id: &str,
    card: &str,
    seller: &str,
    price_cents: i64,
    quantity: u32,
    quality: QualityTier,
) -> Listing {
    Listing::try_new(
        id,
        card,
        seller,
        Decimal::new(price_cents, 2),
        quality,
        quantity,
    )
    .expect("valid listing")
}

/// Build a problem from records.
pub fn problem(wanted: Vec<WantedItem>, listings: Vec<Listing>) -> Problem {
    Problem::new(wanted, listings).expect("valid problem")
}

/// Four Lightning Bolts wanted; three sellers, one of them cheapest but
/// only partly stocked.
pub fn bolt_market() -> Problem {
    problem(
        vec![want("Lightning Bolt", 4)],
        vec![
            listing("a-1", "Lightning Bolt", "alpha", 100, 2),
            listing("b-1", "Lightning Bolt", "beta", 150, 4),
            listing("c-1", "Lightning Bolt", "gamma", 300, 10),
        ],
    )
}

/// A buylist of `cards` distinct cards, two copies each, spread over
/// `sellers` sellers with deterministic prices and stock.
///
/// Every seller lists every card, so any seller-count bound between 1 and
/// `sellers` is satisfiable.
pub fn spread_market(cards: usize, sellers: usize) -> Problem {
    let wanted = (0..cards).map(|c| want(&format!("Card {c}"), 2)).collect();
    let listings = (0..sellers)
        .flat_map(|s| {
            (0..cards).map(move |c| {
                let price = 100 + ((c * 37 + s * 53) % 400) as i64;
                listing(
                    &format!("s{s}-c{c}"),
                    &format!("Card {c}"),
                    &format!("seller-{s}"),
                    price,
                    1 + ((c + s) % 3) as u32,
                )
            })
        })
        .collect();
    problem(wanted, listings)
}
