use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    best_offer::{GroupKey, OfferPolicy, TieBreak},
    cards::{cardname::CardName, price::Price, vendor_listing::VendorListing},
    error::Result,
    processor::VendorSearch,
    utilities::{
        constants::{PRISMA_HOST, PRISMA_PRODUCT_TYPE_ID, PRISMA_SOURCE},
        http::VendorHttp,
        json_values::{flexible_f64, flexible_u32},
        string_manipulators::clean_string,
    },
};

lazy_static! {
    static ref FINISH_SUFFIX: Regex =
        Regex::new(r"(?i)\s*-\s*(Foil|Extended Art|Showcase|Promo|Retro Frame).*$").unwrap();
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingsRequest<'a> {
    search: &'a str,
    #[serde(rename = "productTypeID")]
    product_type_id: &'a str,
    host: &'a str,
    #[serde(rename = "sessionID")]
    session_id: String,
    #[serde(rename = "reqID")]
    req_id: String,
}

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    result: Option<ListingsResult>,
}

#[derive(Debug, Deserialize)]
struct ListingsResult {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Listing {
    inventory_name: Option<String>,
    category_name: Option<String>,
    #[serde(default)]
    variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
struct Variant {
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_u32")]
    quantity: Option<u32>,
    #[serde(default, deserialize_with = "flexible_u32")]
    default: Option<u32>,
}

impl Variant {
    fn stock(&self) -> u32 {
        self.quantity.unwrap_or(0)
    }

    fn to_listing(&self, title: &str, set: &Option<String>) -> VendorListing {
        VendorListing {
            title: title.to_string(),
            price: Price::new(self.price.unwrap_or(0.0)),
            set: set.clone(),
            condition: self.name.clone(),
            in_stock: self.stock() > 0,
            stock_quantity: Some(self.stock()),
            url: None,
        }
    }
}

impl Listing {
    /// One listing per stocked variant, or a single sold out entry taken from the default variant.
    fn into_listings(self) -> Vec<VendorListing> {
        let name = clean_string(self.inventory_name.as_deref().unwrap_or_default());
        let title = FINISH_SUFFIX.replace(&name, "").trim().to_string();
        let set = self.category_name.filter(|set| !set.trim().is_empty());

        let stocked: Vec<VendorListing> = self
            .variants
            .iter()
            .filter(|variant| variant.stock() > 0)
            .map(|variant| variant.to_listing(&title, &set))
            .collect();
        if !stocked.is_empty() {
            return stocked;
        }

        self.variants
            .iter()
            .find(|variant| variant.default == Some(1))
            .or_else(|| self.variants.first())
            .map(|variant| vec![variant.to_listing(&title, &set)])
            .unwrap_or_default()
    }
}

/// Prisma TCG, whose storefront is backed by the Conduct Commerce listings API.
/// One POST returns every listing for the search, there is no pagination.
pub struct PrismaScraper {
    base_url: String,
    http: VendorHttp,
    delay: Duration,
}

impl PrismaScraper {
    pub fn new(base_url: &str, http: VendorHttp, delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            delay,
        }
    }
}

#[async_trait]
impl VendorSearch for PrismaScraper {
    fn source(&self) -> &'static str {
        PRISMA_SOURCE
    }

    fn offer_policy(&self) -> OfferPolicy {
        OfferPolicy::new(GroupKey::SetAndPrice, TieBreak::HighestStock)
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>> {
        let url = format!("{}/v1/getProductListings", self.base_url);
        let request = ListingsRequest {
            search: name.raw.trim(),
            product_type_id: PRISMA_PRODUCT_TYPE_ID,
            host: PRISMA_HOST,
            session_id: Uuid::new_v4().to_string(),
            req_id: Uuid::new_v4().to_string(),
        };
        debug!("Posting Prisma search for '{}'", name);

        let response: ListingsResponse = self.http.post_json(&url, &request).await?;
        let listings: Vec<VendorListing> = response
            .result
            .map(|result| result.listings)
            .unwrap_or_default()
            .into_iter()
            .flat_map(Listing::into_listings)
            .collect();

        info!("Prisma returned {} listings for '{}'", listings.len(), name);
        Ok(listings)
    }
}
