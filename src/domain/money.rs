//! Monetary types for listing prices and plan totals.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Convert a price into the `f64` space the solvers score in.
///
/// Prices outside the `f64` range never come out of a marketplace scrape;
/// they collapse to zero rather than poisoning the objective with NaN.
#[must_use]
pub fn to_f64(price: Price) -> f64 {
    price.to_f64().unwrap_or(0.0)
}
