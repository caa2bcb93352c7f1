//! Immutable problem model: buylist, catalog and derived indices.
//!
//! Demand is expanded into *units*: a wanted item with quantity 3 becomes
//! three demand units that may be filled from different listings. Both
//! solvers assign listings per unit, so the unit list fixes the gene order of
//! every evolutionary individual and the row order of the MILP.

use std::collections::{HashMap, HashSet};

use super::error::DomainError;
use super::id::{ListingId, SellerId};
use super::item::{card_key, Listing, WantedItem};

/// Index of a listing inside one [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingIdx(u32);

impl ListingIdx {
    /// Position in [`Problem::listings`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a distinct seller inside one [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SellerIdx(u32);

impl SellerIdx {
    /// Position in [`Problem::sellers`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One copy of one wanted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandUnit {
    /// Position of the wanted item in [`Problem::wanted`].
    pub wanted: usize,
    /// Zero-based copy number within the wanted item.
    pub ordinal: u32,
}

/// Buylist and listing catalog for one optimization run.
#[derive(Debug, Clone)]
pub struct Problem {
    wanted: Vec<WantedItem>,
    listings: Vec<Listing>,
    sellers: Vec<SellerId>,
    listing_seller: Vec<SellerIdx>,
    units: Vec<DemandUnit>,
    eligible: Vec<Vec<ListingIdx>>,
    by_name: HashMap<String, Vec<ListingIdx>>,
    by_seller: Vec<Vec<ListingIdx>>,
    excluded: HashSet<SellerIdx>,
}

impl Problem {
    /// Build the model and its indices.
    ///
    /// # Errors
    ///
    /// Returns an error if any record violates its invariants or two
    /// listings share an identifier.
    pub fn new(wanted: Vec<WantedItem>, listings: Vec<Listing>) -> Result<Self, DomainError> {
        for item in &wanted {
            item.validate()?;
        }

        let mut seen: HashSet<&ListingId> = HashSet::with_capacity(listings.len());
        for listing in &listings {
            listing.validate()?;
            if !seen.insert(&listing.id) {
                return Err(DomainError::DuplicateListing {
                    listing: listing.id.to_string(),
                });
            }
        }

        let mut sellers = Vec::new();
        let mut seller_lookup: HashMap<SellerId, SellerIdx> = HashMap::new();
        let mut listing_seller = Vec::with_capacity(listings.len());
        let mut by_name: HashMap<String, Vec<ListingIdx>> = HashMap::new();
        let mut by_seller: Vec<Vec<ListingIdx>> = Vec::new();

        for (i, listing) in listings.iter().enumerate() {
            let idx = ListingIdx(i as u32);
            let seller = *seller_lookup
                .entry(listing.seller_id.clone())
                .or_insert_with(|| {
                    sellers.push(listing.seller_id.clone());
                    by_seller.push(Vec::new());
                    SellerIdx((sellers.len() - 1) as u32)
                });
            listing_seller.push(seller);
            by_seller[seller.index()].push(idx);
            by_name
                .entry(card_key(&listing.card_name))
                .or_default()
                .push(idx);
        }

        let units = wanted
            .iter()
            .enumerate()
            .flat_map(|(w, item)| (0..item.quantity).map(move |ordinal| DemandUnit { wanted: w, ordinal }))
            .collect();

        let mut problem = Self {
            wanted,
            listings,
            sellers,
            listing_seller,
            units,
            eligible: Vec::new(),
            by_name,
            by_seller,
            excluded: HashSet::new(),
        };
        problem.eligible = problem.compute_eligibility();
        Ok(problem)
    }

    /// Copy of this problem with every listing of the given sellers made
    /// ineligible.
    ///
    /// Unknown seller ids are ignored.
    #[must_use]
    pub fn excluding_sellers(&self, excluded: &[SellerId]) -> Self {
        let mut problem = self.clone();
        problem.excluded = excluded
            .iter()
            .filter_map(|id| self.sellers.iter().position(|s| s == id))
            .map(|i| SellerIdx(i as u32))
            .collect();
        problem.eligible = problem.compute_eligibility();
        problem
    }

    fn compute_eligibility(&self) -> Vec<Vec<ListingIdx>> {
        self.wanted
            .iter()
            .map(|item| {
                self.by_name
                    .get(&card_key(&item.card_name))
                    .map(|candidates| {
                        candidates
                            .iter()
                            .copied()
                            .filter(|idx| !self.excluded.contains(&self.seller_of(*idx)))
                            .filter(|idx| item.accepts(&self.listings[idx.index()]))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Wanted items in buylist order.
    #[must_use]
    pub fn wanted(&self) -> &[WantedItem] {
        &self.wanted
    }

    /// Catalog in input order.
    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Listing at the given index.
    #[must_use]
    pub fn listing(&self, idx: ListingIdx) -> &Listing {
        &self.listings[idx.index()]
    }

    /// Distinct sellers in order of first appearance in the catalog.
    #[must_use]
    pub fn sellers(&self) -> &[SellerId] {
        &self.sellers
    }

    /// Every seller index, in [`Problem::sellers`] order.
    pub fn seller_indices(&self) -> impl Iterator<Item = SellerIdx> {
        (0..self.sellers.len() as u32).map(SellerIdx)
    }

    /// Seller offering the given listing.
    #[must_use]
    pub fn seller_of(&self, idx: ListingIdx) -> SellerIdx {
        self.listing_seller[idx.index()]
    }

    /// Seller identifier for a seller index.
    #[must_use]
    pub fn seller_id(&self, seller: SellerIdx) -> &SellerId {
        &self.sellers[seller.index()]
    }

    /// Listings offered by one seller.
    #[must_use]
    pub fn listings_by_seller(&self, seller: SellerIdx) -> &[ListingIdx] {
        &self.by_seller[seller.index()]
    }

    /// All listings for a card name, eligible or not.
    #[must_use]
    pub fn listings_named(&self, card_name: &str) -> &[ListingIdx] {
        self.by_name
            .get(&card_key(card_name))
            .map_or(&[], Vec::as_slice)
    }

    /// Demand units in gene order.
    #[must_use]
    pub fn units(&self) -> &[DemandUnit] {
        &self.units
    }

    /// Total number of demand units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Listings that may fill the given wanted item.
    #[must_use]
    pub fn eligible_for(&self, wanted: usize) -> &[ListingIdx] {
        &self.eligible[wanted]
    }

    /// Listings that may fill the given demand unit.
    #[must_use]
    pub fn eligible_for_unit(&self, unit: usize) -> &[ListingIdx] {
        self.eligible_for(self.units[unit].wanted)
    }

    /// Total copies on offer across the eligible listings of a wanted item.
    #[must_use]
    pub fn supply_for(&self, wanted: usize) -> u64 {
        self.eligible[wanted]
            .iter()
            .map(|idx| u64::from(self.listing(*idx).quantity))
            .sum()
    }

    /// No demand, or no listing at all to draw from.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() || self.listings.is_empty()
    }
}
