use serde::{Deserialize, Serialize};

use super::{card_request::CardRequest, price::Price, vendor_listing::VendorListing};

/// One vendor's best offer for one printing of a requested card, or a "not found" marker.
///
/// `found` is derived from `price`: the constructors set it and loading a stored result recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCardResult")]
pub struct CardResult {
    pub name: String,
    pub quantity: u32,
    /// Minor currency units (cents).
    pub price: Option<i64>,
    pub set: Option<String>,
    pub condition: Option<String>,
    pub in_stock: bool,
    pub source: String,
    pub url: Option<String>,
    found: bool,
}

/// A persisted result as read back from a deck document. Any stored `found` flag is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCardResult {
    name: String,
    quantity: u32,
    price: Option<i64>,
    set: Option<String>,
    condition: Option<String>,
    #[serde(default)]
    in_stock: bool,
    source: String,
    url: Option<String>,
}

impl From<StoredCardResult> for CardResult {
    fn from(stored: StoredCardResult) -> Self {
        Self {
            found: stored.price.is_some(),
            name: stored.name,
            quantity: stored.quantity,
            price: stored.price,
            set: stored.set,
            condition: stored.condition,
            in_stock: stored.in_stock,
            source: stored.source,
            url: stored.url,
        }
    }
}

impl CardResult {
    /// Builds the result for a surviving listing. This is the only place a vendor price is converted to cents.
    pub fn from_listing(card: &CardRequest, source: &str, listing: &VendorListing) -> Self {
        Self::with_price(
            card,
            source,
            Some(listing.price.to_minor_units()),
            listing.set.clone(),
            listing.condition.clone(),
            listing.in_stock,
            listing.url.clone(),
        )
    }

    pub fn not_found(card: &CardRequest, source: &str) -> Self {
        Self::with_price(card, source, None, None, None, false, None)
    }

    fn with_price(
        card: &CardRequest,
        source: &str,
        price: Option<i64>,
        set: Option<String>,
        condition: Option<String>,
        in_stock: bool,
        url: Option<String>,
    ) -> Self {
        Self {
            name: card.name.clone(),
            quantity: card.quantity,
            found: price.is_some(),
            price,
            set,
            condition,
            in_stock,
            source: source.to_string(),
            url,
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn price_formatted(&self) -> Option<String> {
        self.price.map(Price::format_minor_units)
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.quantity > 0 && !self.source.is_empty()
    }
}
