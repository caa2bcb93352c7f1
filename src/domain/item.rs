//! Buylist entries and marketplace listings.
//!
//! Both types are plain input records: the caller hands them over once per
//! run and the engine never mutates them.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ListingId, SellerId};
use super::money::Price;
use super::quality::QualityTier;

/// Normalized join key for card names.
///
/// Scraped titles differ in case and surrounding whitespace between
/// marketplaces.
#[must_use]
pub fn card_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One line of the buyer's wanted list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WantedItem {
    /// Card name as the buyer typed it.
    pub card_name: String,
    /// Number of copies wanted, at least 1.
    pub quantity: u32,
    /// Worst acceptable condition.
    #[serde(default)]
    pub min_quality: QualityTier,
    /// Restrict to one printing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    /// Restrict to one language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Restrict to foil (`Some(true)`) or non-foil (`Some(false)`) copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foil: Option<bool>,
}

impl WantedItem {
    /// Create a wanted item with no set, language or finish restriction.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the quantity is zero.
    pub fn try_new(
        card_name: impl Into<String>,
        quantity: u32,
        min_quality: QualityTier,
    ) -> Result<Self, DomainError> {
        let item = Self {
            card_name: card_name.into(),
            quantity,
            min_quality,
            set_code: None,
            language: None,
            foil: None,
        };
        item.validate()?;
        Ok(item)
    }

    /// Restrict this item to one set code.
    #[must_use]
    pub fn with_set(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = Some(set_code.into());
        self
    }

    /// Restrict this item to one language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restrict this item to foil or non-foil copies.
    #[must_use]
    pub fn with_foil(mut self, foil: bool) -> Self {
        self.foil = Some(foil);
        self
    }

    /// Check the invariants for records that arrived through serde.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the quantity is zero.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.card_name.trim().is_empty() {
            return Err(DomainError::EmptyCardName);
        }
        if self.quantity == 0 {
            return Err(DomainError::ZeroQuantity {
                card: self.card_name.clone(),
            });
        }
        Ok(())
    }

    /// Whether a listing may fill this item.
    ///
    /// Name, condition floor, in-stock and any explicit set, language and
    /// finish restrictions must all hold.
    #[must_use]
    pub fn accepts(&self, listing: &Listing) -> bool {
        if listing.quantity == 0 || !listing.quality.meets(self.min_quality) {
            return false;
        }
        if card_key(&listing.card_name) != card_key(&self.card_name) {
            return false;
        }
        if let Some(set) = &self.set_code {
            match &listing.set_code {
                Some(listed) if listed.eq_ignore_ascii_case(set) => {}
                _ => return false,
            }
        }
        if let Some(language) = &self.language {
            if !listing.language.eq_ignore_ascii_case(language) {
                return false;
            }
        }
        if let Some(foil) = self.foil {
            if listing.foil != foil {
                return false;
            }
        }
        true
    }
}

/// One seller's offer of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable listing identifier.
    pub id: ListingId,
    /// Card name as scraped.
    pub card_name: String,
    /// Seller identifier.
    pub seller_id: SellerId,
    /// Human-readable store name.
    #[serde(default)]
    pub seller_name: String,
    /// Price for one copy.
    pub price: Price,
    /// Condition of the copies on offer.
    pub quality: QualityTier,
    /// Printed language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Copies on offer.
    pub quantity: u32,
    /// Set code of the printing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,
    /// Set name of the printing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    /// Foil finish.
    #[serde(default)]
    pub foil: bool,
}

fn default_language() -> String {
    "English".to_string()
}

impl Listing {
    /// Create an English, non-foil listing without set information.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the price is negative.
    pub fn try_new(
        id: impl Into<ListingId>,
        card_name: impl Into<String>,
        seller_id: impl Into<SellerId>,
        price: Price,
        quality: QualityTier,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        let seller_id = seller_id.into();
        let listing = Self {
            id: id.into(),
            card_name: card_name.into(),
            seller_name: seller_id.as_str().to_string(),
            seller_id,
            price,
            quality,
            language: default_language(),
            quantity,
            set_code: None,
            set_name: None,
            foil: false,
        };
        listing.validate()?;
        Ok(listing)
    }

    /// Set the printed language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the printing.
    #[must_use]
    pub fn with_set(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.set_code = Some(code.into());
        self.set_name = Some(name.into());
        self
    }

    /// Set the store's display name.
    #[must_use]
    pub fn with_seller_name(mut self, name: impl Into<String>) -> Self {
        self.seller_name = name.into();
        self
    }

    /// Mark the listing foil.
    #[must_use]
    pub fn with_foil(mut self, foil: bool) -> Self {
        self.foil = foil;
        self
    }

    /// Check the invariants for records that arrived through serde.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the price is negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.card_name.trim().is_empty() {
            return Err(DomainError::EmptyCardName);
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(DomainError::NegativePrice {
                listing: self.id.to_string(),
                price: self.price,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bolt(id: &str, quality: QualityTier) -> Listing {
        Listing::try_new(id, "Lightning Bolt", "a", dec!(1.00), quality, 4).unwrap()
    }

    #[test]
    fn rejects_zero_quantity() {
        let err = WantedItem::try_new("Lightning Bolt", 0, QualityTier::NearMint).unwrap_err();
        assert_eq!(
            err,
            DomainError::ZeroQuantity {
                card: "Lightning Bolt".into()
            }
        );
    }

    #[test]
    fn rejects_negative_price() {
        let result = Listing::try_new(
            "x",
            "Opt",
            "a",
            dec!(-0.01),
            QualityTier::NearMint,
            1,
        );
        assert!(matches!(result, Err(DomainError::NegativePrice { .. })));
    }

    #[test]
    fn quality_floor_filters_listings() {
        let wanted = WantedItem::try_new("lightning bolt ", 2, QualityTier::NearMint).unwrap();
        assert!(wanted.accepts(&bolt("1", QualityTier::NearMint)));
        assert!(!wanted.accepts(&bolt("2", QualityTier::LightlyPlayed)));
    }

    #[test]
    fn explicit_restrictions_are_hard() {
        let wanted = WantedItem::try_new("Lightning Bolt", 1, QualityTier::Damaged)
            .unwrap()
            .with_set("M11")
            .with_language("German")
            .with_foil(true);

        let plain = bolt("1", QualityTier::NearMint);
        assert!(!wanted.accepts(&plain));

        let matching = plain
            .clone()
            .with_set("m11", "Magic 2011")
            .with_language("german")
            .with_foil(true);
        assert!(wanted.accepts(&matching));
    }

    #[test]
    fn out_of_stock_is_ineligible() {
        let wanted = WantedItem::try_new("Lightning Bolt", 1, QualityTier::Damaged).unwrap();
        let mut listing = bolt("1", QualityTier::NearMint);
        listing.quantity = 0;
        assert!(!wanted.accepts(&listing));
    }

    #[test]
    fn listing_defaults_to_english() {
        let json = r#"{"id":"l1","card_name":"Opt","seller_id":"s","price":"0.10","quality":"LP","quantity":3}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.language, "English");
        assert!(!listing.foil);
    }
}
