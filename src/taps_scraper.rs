use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    best_offer::{GroupKey, OfferPolicy, TieBreak},
    cards::{cardname::CardName, price::Price, vendor_listing::VendorListing},
    error::Result,
    processor::VendorSearch,
    utilities::{
        constants::{TAPS_PAGE_LIMIT, TAPS_SOURCE, TAPS_STORE_ID},
        http::VendorHttp,
        json_values::{flexible_f64, flexible_u32},
        string_manipulators::{bracketed_set, clean_string, strip_trailing_brackets},
    },
};

const SEARCH_FIELDS: &str = "id,productId,availability,stock,selectedFinish,url,imageUrl,price,salePrice,regularPrice,name,variantInfo,bigCommerceImages,msrp,tags,publisher,inventoryLevels,customCollectionImages,display_name";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Product {
    #[serde(rename = "display_name")]
    display_name: Option<String>,
    name: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    price: Option<f64>,
    url: Option<String>,
    #[serde(default, deserialize_with = "flexible_u32")]
    stock: Option<u32>,
    #[serde(default)]
    availability: Option<Value>,
    #[serde(default)]
    inventory_levels: Option<Vec<InventoryLevel>>,
    #[serde(default)]
    variant_info: Option<Vec<VariantInfo>>,
}

#[derive(Debug, Deserialize)]
struct InventoryLevel {
    #[serde(default, deserialize_with = "flexible_u32")]
    quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VariantInfo {
    condition: Option<String>,
    title: Option<String>,
    #[serde(default, deserialize_with = "flexible_u32")]
    inventory_quantity: Option<u32>,
}

impl Product {
    /// Units on hand, from the most specific field the store filled in.
    /// `None` when only an availability flag is known.
    fn stock_quantity(&self) -> Option<u32> {
        if let Some(stock) = self.stock {
            return Some(stock);
        }
        if let Some(levels) = &self.inventory_levels {
            return Some(levels.iter().filter_map(|l| l.quantity).sum());
        }
        if let Some(variants) = &self.variant_info {
            return Some(variants.iter().filter_map(|v| v.inventory_quantity).sum());
        }
        None
    }

    fn available(&self) -> bool {
        match &self.availability {
            Some(Value::String(s)) => s == "in_stock",
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }

    fn condition(&self) -> Option<String> {
        let first = self.variant_info.as_ref()?.first()?;
        first.condition.clone().or_else(|| first.title.clone())
    }

    fn into_listing(self) -> Option<VendorListing> {
        let display_name = self.display_name.clone().or_else(|| self.name.clone())?;
        let price = self.price?;
        let stock_quantity = self.stock_quantity();
        let in_stock = match stock_quantity {
            Some(stock) => stock > 0,
            None => self.available(),
        };

        Some(VendorListing {
            title: strip_trailing_brackets(&clean_string(&display_name)),
            price: Price::new(price),
            set: bracketed_set(&display_name),
            condition: self.condition(),
            in_stock,
            stock_quantity,
            url: self.url,
        })
    }
}

/// Taps Games, served by the StorePass search API.
pub struct TapsScraper {
    base_url: String,
    http: VendorHttp,
    delay: Duration,
}

impl TapsScraper {
    pub fn new(base_url: &str, http: VendorHttp, delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            delay,
        }
    }

    fn query(name: &str, page: usize) -> Vec<(&'static str, String)> {
        vec![
            ("store_id", TAPS_STORE_ID.to_string()),
            ("limit", TAPS_PAGE_LIMIT.to_string()),
            ("sort", "Relevance".to_string()),
            ("mongo", "true".to_string()),
            ("override_buylist_gt_price", "true".to_string()),
            ("product_line", "All".to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
            ("name", name.to_string()),
            ("q", name.to_string()),
            ("page", page.to_string()),
        ]
    }
}

#[async_trait]
impl VendorSearch for TapsScraper {
    fn source(&self) -> &'static str {
        TAPS_SOURCE
    }

    fn offer_policy(&self) -> OfferPolicy {
        OfferPolicy::new(GroupKey::SetAndPrice, TieBreak::HighestStock)
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>> {
        let url = format!("{}/saas/search", self.base_url);
        let card_name = name.raw.trim();
        let mut listings = Vec::new();
        let mut page = 1;

        loop {
            debug!("Fetching Taps page {} for '{}'", page, card_name);
            let response: SearchPage = self
                .http
                .get_json(&url, &Self::query(card_name, page))
                .await?;

            // Pagination follows the raw product count, before any filtering.
            let raw_count = response.products.len();
            listings.extend(response.products.into_iter().filter_map(Product::into_listing));

            if raw_count < TAPS_PAGE_LIMIT {
                break;
            }
            page += 1;
            tokio::time::sleep(self.delay).await;
        }

        info!(
            "Taps returned {} listings for '{}' over {} page(s)",
            listings.len(),
            card_name,
            page
        );
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use crate::{
        cards::card_request::CardRequest,
        processor::{ScrapingProcessor, VendorProcessor},
        test::helpers::init,
    };

    use super::*;

    fn scraper(url: &str) -> TapsScraper {
        let http = VendorHttp::new(Duration::from_secs(5), 1).unwrap();
        TapsScraper::new(url, http, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_search_sends_store_query() {
        init();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("store_id".into(), TAPS_STORE_ID.into()),
                Matcher::UrlEncoded("limit".into(), "200".into()),
                Matcher::UrlEncoded("q".into(), "Lightning Bolt".into()),
                Matcher::UrlEncoded("name".into(), "Lightning Bolt".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_body(include_str!("test/taps_page.json"))
            .create_async()
            .await;

        let name = CardName::new("Lightning Bolt").unwrap();
        let listings = scraper(&server.url()).search(&name).await.unwrap();

        mock.assert_async().await;
        assert_eq!(listings.len(), 5);
        assert_eq!(listings[0].title, "Lightning Bolt");
        assert_eq!(listings[0].set.as_deref(), Some("Anthologies"));
        assert_eq!(listings[0].condition.as_deref(), Some("NM"));
        assert!(!listings[0].in_stock);
        assert_eq!(listings[1].price, Price::new(3.22));
        assert_eq!(listings[2].stock_quantity, Some(3));
        assert!(listings[3].in_stock);
        assert_eq!(listings[3].stock_quantity, None);
    }

    #[tokio::test]
    async fn test_full_page_requests_the_next_one() {
        init();
        let mut server = mockito::Server::new_async().await;
        let full_page: Vec<Value> = (0..TAPS_PAGE_LIMIT)
            .map(|i| json!({"display_name": format!("Island [Set {}]", i), "price": 0.1, "stock": 1}))
            .collect();
        let first = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(json!({ "products": full_page }).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"{"products": [{"display_name": "Island [Alpha]", "price": 9.5, "stock": 0}]}"#)
            .create_async()
            .await;

        let name = CardName::new("Island").unwrap();
        let listings = scraper(&server.url()).search(&name).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(listings.len(), TAPS_PAGE_LIMIT + 1);
        assert_eq!(listings.last().unwrap().set.as_deref(), Some("Alpha"));
    }

    #[tokio::test]
    async fn test_pauses_between_pages() {
        init();
        let mut server = mockito::Server::new_async().await;
        let full_page: Vec<Value> = (0..TAPS_PAGE_LIMIT)
            .map(|_| json!({"display_name": "Island [Alpha]", "price": 0.1, "stock": 1}))
            .collect();
        let _first = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(json!({ "products": full_page }).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"{"products": []}"#)
            .create_async()
            .await;
        let http = VendorHttp::new(Duration::from_secs(5), 1).unwrap();
        let scraper = TapsScraper::new(&server.url(), http, Duration::from_millis(300));

        let started = std::time::Instant::now();
        let name = CardName::new("Island").unwrap();
        scraper.search(&name).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_process_cards_groups_by_set_and_price() {
        init();
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/saas/search")
            .match_query(Matcher::Any)
            .with_body(include_str!("test/taps_page.json"))
            .create_async()
            .await;

        let processor = ScrapingProcessor::new(scraper(&server.url()));
        let results = processor
            .process_cards(&[CardRequest::new("Lightning Bolt", 4)])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].set.as_deref(), Some("Anthologies"));
        assert!(results[0].in_stock);
        assert_eq!(results[0].price, Some(322));
        assert_eq!(results[0].condition.as_deref(), Some("Lightly Played"));
        assert_eq!(
            results[0].url.as_deref(),
            Some("https://tapsgames.com/products/lightning-bolt-anthologies-lp")
        );
        assert_eq!(results[1].price, Some(199));
        assert_eq!(results[2].price, Some(249));
        assert!(results.iter().all(|r| r.quantity == 4));
    }
}
