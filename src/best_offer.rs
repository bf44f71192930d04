use std::collections::HashMap;

use crate::{cards::vendor_listing::VendorListing, utilities::constants::UNKNOWN_SET};

/// What makes two listings the same printing for a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Set,
    /// Vendors whose set labels are ambiguous also split on the exact price.
    SetAndPrice,
}

/// How a vendor decides between two listings of the same group with the same stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    LowestPrice,
    HighestStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferPolicy {
    pub group_key: GroupKey,
    pub tie_break: TieBreak,
}

impl OfferPolicy {
    pub const fn new(group_key: GroupKey, tie_break: TieBreak) -> Self {
        Self {
            group_key,
            tie_break,
        }
    }

    fn key_for(&self, listing: &VendorListing) -> String {
        let set = listing.set.as_deref().unwrap_or(UNKNOWN_SET);
        match self.group_key {
            GroupKey::Set => set.to_string(),
            GroupKey::SetAndPrice => format!("{}_${}", set, listing.price.amount),
        }
    }

    /// True when `candidate` should replace `current` as the group's best offer.
    fn beats(&self, candidate: &VendorListing, current: &VendorListing) -> bool {
        if candidate.in_stock != current.in_stock {
            return candidate.in_stock;
        }
        match self.tie_break {
            TieBreak::LowestPrice => candidate.price < current.price,
            TieBreak::HighestStock => {
                candidate.in_stock
                    && candidate.stock_quantity.unwrap_or(0) > current.stock_quantity.unwrap_or(0)
            }
        }
    }
}

/// Reduces a card's matching listings to one per group, keeping the order in which groups were first seen.
pub fn best_offers(listings: Vec<VendorListing>, policy: OfferPolicy) -> Vec<VendorListing> {
    let mut best: Vec<VendorListing> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for listing in listings {
        let key = policy.key_for(&listing);
        match index_by_key.get(&key) {
            Some(&index) => {
                if policy.beats(&listing, &best[index]) {
                    log::debug!(
                        "Replacing best offer for group '{}': {} -> {}",
                        key,
                        best[index].price,
                        listing.price
                    );
                    best[index] = listing;
                }
            }
            None => {
                index_by_key.insert(key, best.len());
                best.push(listing);
            }
        }
    }

    best
}
