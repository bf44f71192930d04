use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::{
    best_offer::{GroupKey, OfferPolicy, TieBreak},
    cards::{cardname::CardName, vendor_listing::VendorListing},
    error::Result,
    processor::VendorSearch,
    utilities::{
        constants::TIMEVAULT_SOURCE,
        http::VendorHttp,
        storefront::{parse_product_tiles, total_pages},
    },
};

/// The Time Vault. Same storefront markup as Red Claw, but sold out printings are listed
/// too and paging follows the highest page number linked from any page fetched so far.
pub struct TimeVaultScraper {
    base_url: String,
    http: VendorHttp,
    delay: Duration,
}

impl TimeVaultScraper {
    pub fn new(base_url: &str, http: VendorHttp, delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            delay,
        }
    }

    async fn fetch_page(&self, query: &str, page: u32) -> Result<String> {
        let url = format!("{}/search", self.base_url);
        debug!("Fetching Time Vault page {} for '{}'", page, query);
        self.http
            .get_text(&url, &[("q", query.to_string()), ("page", page.to_string())])
            .await
    }
}

#[async_trait]
impl VendorSearch for TimeVaultScraper {
    fn source(&self) -> &'static str {
        TIMEVAULT_SOURCE
    }

    fn offer_policy(&self) -> OfferPolicy {
        OfferPolicy::new(GroupKey::Set, TieBreak::LowestPrice)
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>> {
        let query = format!("{}* product_type:\"mtg\"", name.raw.trim());

        let first_page = self.fetch_page(&query, 1).await?;
        let mut page_count = total_pages(&first_page);
        let mut listings = parse_product_tiles(&first_page, &self.base_url, true);
        debug!("Time Vault reports {} page(s) for '{}'", page_count, name);

        let mut page = 1;
        while page < page_count && !listings.is_empty() {
            page += 1;
            tokio::time::sleep(self.delay).await;

            let html = self.fetch_page(&query, page).await?;
            let page_listings = parse_product_tiles(&html, &self.base_url, true);
            if page_listings.is_empty() {
                break;
            }
            // The pagination only links a window of pages around the current one.
            page_count = page_count.max(total_pages(&html));
            listings.extend(page_listings);
        }

        info!(
            "Time Vault returned {} listings for '{}' over {} page(s)",
            listings.len(),
            name,
            page
        );
        Ok(listings)
    }
}
