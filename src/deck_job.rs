use std::{collections::BTreeMap, fmt, sync::Arc};

use log::info;
use serde::Serialize;

use crate::{
    batch_scheduler::create_batches,
    cards::deck::Deck,
    deck_store::DeckStore,
    error::{PricingError, Result},
    pricing_aggregator::PricingAggregator,
    processor_registry::ProcessorRegistry,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    /// Cards with at least one found result from this source.
    pub cards_found: usize,
    pub results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub deck_id: String,
    pub cards_processed: usize,
    pub batches_processed: usize,
    pub sources: BTreeMap<String, SourceSummary>,
}

impl JobSummary {
    fn from_deck(deck: &Deck, batches_processed: usize) -> Self {
        let mut sources: BTreeMap<String, SourceSummary> = BTreeMap::new();

        for pricing in deck.cards.iter().filter_map(|card| card.pricing.as_ref()) {
            let mut found_here: BTreeMap<&str, bool> = BTreeMap::new();
            for result in &pricing.results {
                sources.entry(result.source.clone()).or_default().results += 1;
                *found_here.entry(result.source.as_str()).or_default() |= result.found();
            }
            for (source, found) in found_here {
                if found {
                    sources.entry(source.to_string()).or_default().cards_found += 1;
                }
            }
        }

        Self {
            deck_id: deck.id.clone(),
            cards_processed: deck.cards.len(),
            batches_processed,
            sources,
        }
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deck {}: {} cards in {} batches",
            self.deck_id, self.cards_processed, self.batches_processed
        )?;
        for (source, summary) in &self.sources {
            write!(
                f,
                ", {} found {}/{} cards ({} results)",
                source, summary.cards_found, self.cards_processed, summary.results
            )?;
        }
        Ok(())
    }
}

/// Prices a stored deck from its id: batch by batch, saving after each, then marks the import done.
pub struct DeckProcessingJob {
    aggregator: PricingAggregator,
    store: Arc<dyn DeckStore>,
    batch_size: usize,
}

impl DeckProcessingJob {
    pub fn new(
        registry: Arc<ProcessorRegistry>,
        store: Arc<dyn DeckStore>,
        batch_size: usize,
    ) -> Self {
        Self {
            aggregator: PricingAggregator::new(registry),
            store,
            batch_size,
        }
    }

    pub async fn process_deck(&self, deck_id: &str) -> Result<JobSummary> {
        let mut deck = self
            .store
            .find_by_id(deck_id)
            .await?
            .ok_or_else(|| PricingError::DeckNotFound(deck_id.to_string()))?;

        let batches = create_batches(&deck.requests(), self.batch_size);
        info!(
            "Processing deck {} with {} cards in {} batches",
            deck.id,
            deck.cards.len(),
            batches.len()
        );

        for batch in &batches {
            self.aggregator
                .run_batch(&mut deck, batch, self.store.as_ref())
                .await?;
        }

        deck.finish_import();
        self.store.save(&deck).await?;

        let summary = JobSummary::from_deck(&deck, batches.len());
        info!("Finished pricing {}", summary);
        Ok(summary)
    }
}
