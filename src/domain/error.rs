//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new` constructors and by
//! [`Problem::new`](super::problem::Problem::new).
//!
//! # Examples
//!
//! ```
//! use cardplan::domain::{DomainError, QualityTier, WantedItem};
//!
//! let result = WantedItem::try_new("Lightning Bolt", 0, QualityTier::NearMint);
//! assert!(matches!(result, Err(DomainError::ZeroQuantity { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Card names are the join key between buylist and catalog.
    #[error("card name cannot be empty")]
    EmptyCardName,

    /// A wanted item must ask for at least one copy.
    #[error("required quantity for '{card}' must be at least 1")]
    ZeroQuantity {
        /// The card that was requested with zero quantity.
        card: String,
    },

    /// Listing prices are never negative.
    #[error("listing {listing} has negative price {price}")]
    NegativePrice {
        /// The offending listing.
        listing: String,
        /// The price that was provided.
        price: rust_decimal::Decimal,
    },

    /// Listing identifiers must be unique within one catalog.
    #[error("duplicate listing id {listing}")]
    DuplicateListing {
        /// The repeated identifier.
        listing: String,
    },

    /// Condition string did not match any known grade.
    #[error("unknown quality tier '{value}'")]
    UnknownQuality {
        /// The unparseable input.
        value: String,
    },
}
