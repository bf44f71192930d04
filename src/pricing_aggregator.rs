use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};

use crate::{
    batch_scheduler::Batch,
    cards::{
        card_request::CardRequest,
        card_result::CardResult,
        deck::{Deck, Pricing},
    },
    deck_store::DeckStore,
    error::Result,
    processor_registry::ProcessorRegistry,
};

/// Fans a batch out to every registered processor and merges what comes back per card.
pub struct PricingAggregator {
    registry: Arc<ProcessorRegistry>,
}

impl PricingAggregator {
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self { registry }
    }

    /// One pricing record per input card, in input order.
    pub async fn price_batch(&self, cards: &[CardRequest]) -> Vec<Pricing> {
        let processors = self.registry.processors();
        let shared_cards = Arc::new(cards.to_vec());

        let handles = processors.iter().map(|processor| {
            let processor = Arc::clone(processor);
            let cards = Arc::clone(&shared_cards);
            tokio::spawn(async move { processor.process_cards(&cards).await })
        });
        let outcomes = join_all(handles).await;

        let mut results: Vec<CardResult> = Vec::new();
        for (processor, outcome) in processors.iter().zip(outcomes) {
            match outcome {
                Ok(Ok(processor_results)) => {
                    debug!(
                        "{} returned {} results for {} cards",
                        processor.source(),
                        processor_results.len(),
                        cards.len()
                    );
                    let (valid, invalid): (Vec<CardResult>, Vec<CardResult>) =
                        processor_results.into_iter().partition(CardResult::is_valid);
                    for result in &invalid {
                        warn!(
                            "Dropping malformed result from {} for card '{}' (quantity {})",
                            processor.source(),
                            result.name,
                            result.quantity
                        );
                    }
                    results.extend(valid);
                }
                Ok(Err(e)) => warn!(
                    "Processor {} failed for the whole batch: {}",
                    processor.source(),
                    e
                ),
                Err(e) => warn!("Processor {} did not finish: {}", processor.source(), e),
            }
        }

        let processed_at = Utc::now();
        cards
            .iter()
            .map(|card| Pricing {
                results: results
                    .iter()
                    .filter(|result| result.name == card.name)
                    .cloned()
                    .collect(),
                processed_at,
            })
            .collect()
    }

    /// Prices one batch, replaces the pricing of the matching deck cards and persists the deck.
    pub async fn run_batch(
        &self,
        deck: &mut Deck,
        batch: &Batch<CardRequest>,
        store: &dyn DeckStore,
    ) -> Result<()> {
        info!(
            "Processing batch {}/{} of deck {} ({} cards)",
            batch.batch_number, batch.total_batches, deck.id, batch.size
        );

        let pricings = self.price_batch(&batch.items).await;
        for (card, pricing) in deck.cards.iter_mut().skip(batch.offset).zip(pricings) {
            card.pricing = Some(pricing);
        }

        store.save(deck).await?;
        debug!(
            "Saved deck {} after batch {}/{}",
            deck.id, batch.batch_number, batch.total_batches
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        batch_scheduler::create_batches,
        cards::card_request::parse_deck_list,
        deck_store::{InMemoryDeckStore, MockDeckStore},
        error::PricingError,
        processor::{MockVendorProcessor, VendorProcessor},
        test::helpers::{init, listing},
    };

    use super::*;

    /// A processor that finds every card once, at the given price.
    fn finding_processor(source: &'static str, price: f64) -> Arc<dyn VendorProcessor> {
        let mut processor = MockVendorProcessor::new();
        processor.expect_source().return_const(source);
        processor.expect_process_cards().returning(move |cards| {
            let offer = listing("", Some("Alpha"), price, true, Some(1));
            Ok(cards
                .iter()
                .map(|card| CardResult::from_listing(card, source, &offer))
                .collect())
        });
        Arc::new(processor)
    }

    fn failing_processor(source: &'static str) -> Arc<dyn VendorProcessor> {
        let mut processor = MockVendorProcessor::new();
        processor.expect_source().return_const(source);
        processor
            .expect_process_cards()
            .returning(move |_| Err(PricingError::VendorUnavailable(source.to_string())));
        Arc::new(processor)
    }

    fn panicking_processor(source: &'static str) -> Arc<dyn VendorProcessor> {
        let mut processor = MockVendorProcessor::new();
        processor.expect_source().return_const(source);
        processor
            .expect_process_cards()
            .returning(|_| panic!("vendor markup changed"));
        Arc::new(processor)
    }

    fn aggregator(processors: Vec<Arc<dyn VendorProcessor>>) -> PricingAggregator {
        PricingAggregator::new(Arc::new(ProcessorRegistry::with_processors(processors)))
    }

    #[tokio::test]
    async fn test_every_processor_contributes_to_every_card() {
        init();
        let aggregator = aggregator(vec![
            finding_processor("a", 1.0),
            finding_processor("b", 2.0),
            finding_processor("c", 3.0),
        ]);
        let cards = parse_deck_list("4 Lightning Bolt\n2 Counterspell");

        let pricings = aggregator.price_batch(&cards).await;

        assert_eq!(pricings.len(), 2);
        for (card, pricing) in cards.iter().zip(&pricings) {
            assert_eq!(pricing.results.len(), 3);
            assert!(pricing.results.iter().all(|r| r.name == card.name));
        }
        let sources: Vec<&str> = pricings[0].results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failed_processors_are_isolated() {
        init();
        let aggregator = aggregator(vec![
            failing_processor("down"),
            finding_processor("up", 1.0),
            panicking_processor("broken"),
        ]);
        let cards = parse_deck_list("1 Sol Ring\n1 Arcane Signet");

        let pricings = aggregator.price_batch(&cards).await;

        assert!(pricings.iter().all(|p| p.results.len() == 1));
        assert!(pricings.iter().all(|p| p.results[0].source == "up"));
    }

    #[tokio::test]
    async fn test_malformed_results_only_affect_their_card() {
        init();
        let aggregator = aggregator(vec![finding_processor("a", 1.0)]);
        let cards = vec![CardRequest::new("Sol Ring", 0), CardRequest::new("Brainstorm", 2)];

        let pricings = aggregator.price_batch(&cards).await;

        assert_eq!(pricings.len(), 2);
        assert!(pricings[0].results.is_empty());
        assert_eq!(pricings[1].results.len(), 1);
        assert_eq!(pricings[1].results[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_run_batch_attaches_pricing_and_saves() {
        init();
        let aggregator = aggregator(vec![finding_processor("a", 1.0), finding_processor("b", 2.5)]);
        let store = InMemoryDeckStore::new();
        let mut deck = Deck::import("4 Lightning Bolt\n2 Counterspell\n1 Black Lotus");
        let batches = create_batches(&deck.requests(), 5);
        assert_eq!(batches.len(), 1);

        aggregator.run_batch(&mut deck, &batches[0], &store).await.unwrap();

        assert_eq!(store.save_count(), 1);
        let saved = store.find_by_id(&deck.id).await.unwrap().unwrap();
        for card in &saved.cards {
            let pricing = card.pricing.as_ref().unwrap();
            assert_eq!(pricing.results.len(), 2);
            assert!(pricing.results.iter().all(|r| r.found()));
            assert!(pricing.processed_at <= Utc::now());
        }
    }

    #[tokio::test]
    async fn test_run_batch_only_touches_its_cards() {
        init();
        let aggregator = aggregator(vec![finding_processor("a", 1.0)]);
        let store = InMemoryDeckStore::new();
        let mut deck = Deck::import("1 Sol Ring\n1 Arcane Signet\n1 Command Tower");
        let batches = create_batches(&deck.requests(), 2);

        aggregator.run_batch(&mut deck, &batches[1], &store).await.unwrap();

        assert!(deck.cards[0].pricing.is_none());
        assert!(deck.cards[1].pricing.is_none());
        assert_eq!(deck.cards[2].pricing.as_ref().unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_results() {
        init();
        let store = InMemoryDeckStore::new();
        let mut deck = Deck::import("1 Sol Ring");
        let batches = create_batches(&deck.requests(), 5);

        aggregator(vec![finding_processor("a", 1.0), finding_processor("b", 2.0)])
            .run_batch(&mut deck, &batches[0], &store)
            .await
            .unwrap();
        aggregator(vec![finding_processor("b", 3.0)])
            .run_batch(&mut deck, &batches[0], &store)
            .await
            .unwrap();

        let results = &deck.cards[0].pricing.as_ref().unwrap().results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "b");
        assert_eq!(results[0].price, Some(300));
    }

    #[tokio::test]
    async fn test_save_failure_fails_the_batch() {
        init();
        let mut store = MockDeckStore::new();
        store.expect_save().times(1).returning(|deck| {
            Err(PricingError::Persistence {
                deck_id: deck.id.clone(),
                reason: "disk full".to_string(),
            })
        });
        let mut deck = Deck::import("1 Sol Ring");
        let batches = create_batches(&deck.requests(), 5);

        let result = aggregator(vec![finding_processor("a", 1.0)])
            .run_batch(&mut deck, &batches[0], &store)
            .await;

        assert!(matches!(result, Err(PricingError::Persistence { .. })));
    }
}
