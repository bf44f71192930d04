use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;

use crate::{
    best_offer::{GroupKey, OfferPolicy, TieBreak},
    cards::{cardname::CardName, price::Price, vendor_listing::VendorListing},
    error::Result,
    processor::VendorSearch,
    utilities::{
        constants::{FACETOFACE_PAGE_SIZE, FACETOFACE_SOURCE},
        http::VendorHttp,
        json_values::{flexible_f64, flexible_u32},
        string_manipulators::strip_trailing_brackets,
    },
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    total: Option<Total>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Older indexes report the total as a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Total {
    Count(usize),
    Object { value: usize },
}

impl Total {
    fn value(&self) -> usize {
        match self {
            Total::Count(count) => *count,
            Total::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Product,
}

#[derive(Debug, Deserialize)]
struct Product {
    title: String,
    handle: Option<String>,
    #[serde(rename = "Set")]
    set: Option<String>,
    #[serde(rename = "MTG_Set_Name")]
    mtg_set_name: Option<String>,
    #[serde(default)]
    variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Variant {
    #[serde(default, deserialize_with = "flexible_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    sell_price: Option<f64>,
    #[serde(default, deserialize_with = "flexible_u32")]
    inventory_quantity: Option<u32>,
    #[serde(default)]
    selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Deserialize)]
struct SelectedOption {
    name: String,
    value: String,
}

/// Face to Face Games, searched through their product indexer (Elasticsearch hits).
pub struct FaceToFaceScraper {
    base_url: String,
    http: VendorHttp,
    delay: Duration,
}

impl FaceToFaceScraper {
    pub fn new(base_url: &str, http: VendorHttp, delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            delay,
        }
    }

    fn search_url(&self, keyword: &str, page: u32) -> String {
        format!(
            "{}/apps/prod-indexer/search/Game%20Type/Magic:%20The%20Gathering/withFacets/false/pageSize/{}/page/{}/minimum_price/0.01/keyword/{}",
            self.base_url,
            FACETOFACE_PAGE_SIZE,
            page,
            urlencoding::encode(keyword)
        )
    }

    fn listings_from_hits(&self, hits: Vec<Hit>) -> Vec<VendorListing> {
        hits.into_iter()
            .flat_map(|hit| {
                let product = hit.source;
                let title = strip_trailing_brackets(&product.title);
                let set = product.set.clone().or(product.mtg_set_name.clone());
                let url = product
                    .handle
                    .as_ref()
                    .map(|handle| format!("{}/products/{}", self.base_url, handle));

                product
                    .variants
                    .into_iter()
                    .filter_map(move |variant| {
                        let price = variant.sell_price.or(variant.price)?;
                        let condition = variant
                            .selected_options
                            .iter()
                            .find(|option| option.name == "Condition")
                            .map(|option| option.value.clone());
                        let stock = variant.inventory_quantity.unwrap_or(0);

                        Some(VendorListing {
                            title: title.clone(),
                            price: Price::new(price),
                            set: set.clone(),
                            condition,
                            in_stock: stock > 0,
                            stock_quantity: Some(stock),
                            url: url.clone(),
                        })
                    })
            })
            .collect()
    }
}

#[async_trait]
impl VendorSearch for FaceToFaceScraper {
    fn source(&self) -> &'static str {
        FACETOFACE_SOURCE
    }

    fn offer_policy(&self) -> OfferPolicy {
        OfferPolicy::new(GroupKey::Set, TieBreak::LowestPrice)
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>> {
        let keyword = name.raw.trim();
        let mut listings = Vec::new();
        let mut hits_seen = 0;
        let mut page = 1;

        loop {
            let url = self.search_url(keyword, page);
            debug!("Fetching {}", url);
            let response: SearchResponse = self.http.get_json(&url, &[]).await?;

            let page_hits = response.hits.hits.len();
            let total = response.hits.total.as_ref().map(Total::value);
            hits_seen += page_hits;
            listings.extend(self.listings_from_hits(response.hits.hits));

            if page_hits == 0 || total.map_or(true, |total| hits_seen >= total) {
                break;
            }
            page += 1;
            tokio::time::sleep(self.delay).await;
        }

        info!(
            "Face to Face returned {} listings for '{}' over {} page(s)",
            listings.len(),
            keyword,
            page
        );
        Ok(listings)
    }
}
