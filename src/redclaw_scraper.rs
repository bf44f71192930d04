use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    best_offer::{GroupKey, OfferPolicy, TieBreak},
    cards::{cardname::CardName, price::Price, vendor_listing::VendorListing},
    error::Result,
    processor::VendorSearch,
    utilities::{
        constants::REDCLAW_SOURCE,
        http::VendorHttp,
        json_values::flexible_f64,
        storefront::{absolute_url, has_next_page, parse_product_tiles},
        string_manipulators::{bracketed_set, strip_trailing_brackets},
    },
};

const PRODUCT_VARIANTS_KEY: &str = r#""productVariants":"#;

#[derive(Debug, Deserialize)]
struct ProductVariant {
    title: Option<String>,
    price: VariantPrice,
    product: VariantProduct,
}

#[derive(Debug, Deserialize)]
struct VariantPrice {
    #[serde(default, deserialize_with = "flexible_f64")]
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct VariantProduct {
    title: String,
    url: Option<String>,
}

#[derive(Debug)]
struct SearchPage {
    listings: Vec<VendorListing>,
    has_next: bool,
}

/// Red Claw Gaming. Results come as storefront product tiles, with the analytics
/// payload embedded in the page used when no tiles render.
pub struct RedClawScraper {
    base_url: String,
    http: VendorHttp,
    delay: Duration,
}

impl RedClawScraper {
    pub fn new(base_url: &str, http: VendorHttp, delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            delay,
        }
    }

    fn parse_page(&self, html: &str) -> SearchPage {
        let mut listings = parse_product_tiles(html, &self.base_url, false);
        if listings.is_empty() {
            debug!("No product tiles on Red Claw page, trying embedded product variants");
            listings = self.embedded_listings(html);
        }

        SearchPage {
            listings,
            has_next: has_next_page(html),
        }
    }

    fn embedded_listings(&self, html: &str) -> Vec<VendorListing> {
        let Some(start) = html.find(PRODUCT_VARIANTS_KEY) else {
            return Vec::new();
        };
        let json = &html[start + PRODUCT_VARIANTS_KEY.len()..];

        let variants = match serde_json::Deserializer::from_str(json)
            .into_iter::<Vec<ProductVariant>>()
            .next()
        {
            Some(Ok(variants)) => variants,
            Some(Err(e)) => {
                warn!("Failed to decode Red Claw product variants: {}", e);
                return Vec::new();
            }
            None => return Vec::new(),
        };

        variants
            .into_iter()
            .filter_map(|variant| {
                let price = variant.price.amount?;
                Some(VendorListing {
                    title: strip_trailing_brackets(&variant.product.title),
                    price: Price::new(price),
                    set: bracketed_set(&variant.product.title),
                    condition: variant.title,
                    in_stock: true,
                    stock_quantity: None,
                    url: variant
                        .product
                        .url
                        .and_then(|url| absolute_url(&self.base_url, &url)),
                })
            })
            .collect()
    }
}

#[async_trait]
impl VendorSearch for RedClawScraper {
    fn source(&self) -> &'static str {
        REDCLAW_SOURCE
    }

    fn offer_policy(&self) -> OfferPolicy {
        OfferPolicy::new(GroupKey::Set, TieBreak::LowestPrice)
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>> {
        let url = format!("{}/search", self.base_url);
        let query = format!("{}* product_type:\"mtg\"", name.raw.trim());
        let mut listings = Vec::new();
        let mut page = 1;

        loop {
            debug!("Fetching Red Claw page {} for '{}'", page, name);
            let html = self
                .http
                .get_text(&url, &[("q", query.clone()), ("page", page.to_string())])
                .await?;

            let result = self.parse_page(&html);
            listings.extend(result.listings);

            if !result.has_next {
                break;
            }
            page += 1;
            tokio::time::sleep(self.delay).await;
        }

        info!(
            "Red Claw returned {} listings for '{}' over {} page(s)",
            listings.len(),
            name,
            page
        );
        Ok(listings)
    }
}
