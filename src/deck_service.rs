use log::info;

use crate::{
    cards::deck::Deck,
    deck_queue::DeckQueue,
    deck_store::DeckStore,
    error::{PricingError, Result},
};

/// Stores a new deck parsed from a free-text list and queues it for pricing.
pub async fn import_deck(store: &dyn DeckStore, queue: &DeckQueue, text: &str) -> Result<Deck> {
    let deck = Deck::import(text);
    store.save(&deck).await?;
    queue.enqueue_deck(&deck.id)?;

    info!(
        "Imported deck {} with {} cards, queued for pricing",
        deck.id,
        deck.cards.len()
    );
    Ok(deck)
}

/// Marks a stored deck as importing again and queues it. Its pricing is replaced when the job runs.
pub async fn refresh_deck(store: &dyn DeckStore, queue: &DeckQueue, deck_id: &str) -> Result<Deck> {
    let mut deck = store
        .find_by_id(deck_id)
        .await?
        .ok_or_else(|| PricingError::DeckNotFound(deck_id.to_string()))?;

    deck.begin_refresh();
    store.save(&deck).await?;
    queue.enqueue_deck(&deck.id)?;

    info!("Queued refresh of deck {}", deck.id);
    Ok(deck)
}
