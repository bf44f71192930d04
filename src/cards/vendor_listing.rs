use super::price::Price;

/// A single offer scraped from a vendor, before grouping. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorListing {
    /// The vendor's card title with set/condition decorations removed.
    pub title: String,
    pub price: Price,
    pub set: Option<String>,
    pub condition: Option<String>,
    pub in_stock: bool,
    /// Units on hand when the vendor reports a count rather than a flag.
    pub stock_quantity: Option<u32>,
    pub url: Option<String>,
}
