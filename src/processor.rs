use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};

use crate::{
    best_offer::{best_offers, OfferPolicy},
    cards::{
        card_request::CardRequest, card_result::CardResult, cardname::CardName,
        vendor_listing::VendorListing,
    },
    error::{PricingError, Result},
};

/// Prices a list of cards against one vendor.
///
/// Implementations handle cards strictly in order, one at a time, and report per-card
/// failures as "not found" results. An `Err` is reserved for the vendor being unreachable
/// for the whole invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VendorProcessor: Send + Sync {
    fn source(&self) -> &'static str;

    async fn process_cards(&self, cards: &[CardRequest]) -> Result<Vec<CardResult>>;
}

/// The vendor specific half of a processor: fetch every page of results for one card.
#[async_trait]
pub trait VendorSearch: Send + Sync {
    fn source(&self) -> &'static str;

    fn offer_policy(&self) -> OfferPolicy;

    /// Pause between cards and between paginated requests.
    fn delay(&self) -> Duration;

    async fn search(&self, name: &CardName) -> Result<Vec<VendorListing>>;
}

/// Adapts a [`VendorSearch`] into a [`VendorProcessor`] using the shared card loop.
pub struct ScrapingProcessor<S> {
    search: S,
}

impl<S: VendorSearch> ScrapingProcessor<S> {
    pub fn new(search: S) -> Self {
        Self { search }
    }
}

#[async_trait]
impl<S: VendorSearch> VendorProcessor for ScrapingProcessor<S> {
    fn source(&self) -> &'static str {
        self.search.source()
    }

    async fn process_cards(&self, cards: &[CardRequest]) -> Result<Vec<CardResult>> {
        process_cards_with(&self.search, cards).await
    }
}

pub async fn process_cards_with<S: VendorSearch + ?Sized>(
    search: &S,
    cards: &[CardRequest],
) -> Result<Vec<CardResult>> {
    let source = search.source();
    let mut results = Vec::new();
    let mut unreachable = 0;

    for (index, card) in cards.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(search.delay()).await;
        }
        debug!("Processing {}x {} with {}", card.quantity, card.name, source);

        match search_card(search, card).await {
            Ok(card_results) => results.extend(card_results),
            Err(e) => {
                error!("Error searching {} for card '{}': {}", source, card.name, e);
                if e.is_connect() {
                    unreachable += 1;
                }
                results.push(CardResult::not_found(card, source));
            }
        }
    }

    if !cards.is_empty() && unreachable == cards.len() {
        return Err(PricingError::VendorUnavailable(source.to_string()));
    }

    Ok(results)
}

async fn search_card<S: VendorSearch + ?Sized>(
    search: &S,
    card: &CardRequest,
) -> Result<Vec<CardResult>> {
    let source = search.source();
    let name = CardName::new(&card.name).map_err(|e| PricingError::parse(source, e))?;

    let listings = search.search(&name).await?;
    let total = listings.len();
    let matching: Vec<VendorListing> = listings
        .into_iter()
        .filter(|listing| name.matches_title(&listing.title))
        .collect();
    debug!(
        "{}: {} of {} listings match '{}'",
        source,
        matching.len(),
        total,
        card.name
    );

    if matching.is_empty() {
        info!("{}: no listings found for '{}'", source, card.name);
        return Ok(vec![CardResult::not_found(card, source)]);
    }

    let offers = best_offers(matching, search.offer_policy());
    info!(
        "{}: '{}' found in {} printing(s)",
        source,
        card.name,
        offers.len()
    );

    Ok(offers
        .iter()
        .map(|listing| CardResult::from_listing(card, source, listing))
        .collect())
}
