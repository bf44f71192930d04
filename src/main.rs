use std::{env, fs, sync::Arc};

use log::{error, info};

use deck_pricer::{
    deck_job::DeckProcessingJob,
    deck_queue::{DeckQueue, RetryPolicy},
    deck_service::import_deck,
    deck_store::{DeckStore, JsonFileDeckStore},
    error::Result,
    processor_registry::ProcessorRegistry,
    utilities::config::CONFIG,
};

/// Imports the deck list at `deck_file` and prices it. Returns false when the job failed.
async fn price_deck_file(deck_file: &str) -> Result<bool> {
    let deck_list = fs::read_to_string(deck_file)?;

    let store: Arc<dyn DeckStore> = Arc::new(JsonFileDeckStore::new(&CONFIG.deck_store_dir));
    let registry = Arc::new(ProcessorRegistry::from_config(&CONFIG)?);
    let job = DeckProcessingJob::new(registry, Arc::clone(&store), CONFIG.batch_size);

    let (queue, consumer) = DeckQueue::open(RetryPolicy::from_config(&CONFIG));
    let deck = import_deck(store.as_ref(), &queue, &deck_list).await?;
    queue.close();

    let stats = consumer.run(&job).await;
    if stats.failed > 0 {
        error!("Pricing deck {} from {} failed", deck.id, deck_file);
        return Ok(false);
    }

    info!(
        "Deck {} priced and saved under {}",
        deck.id, CONFIG.deck_store_dir
    );
    Ok(true)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting");

    let deck_file = env::args()
        .nth(1)
        .or_else(|| env::var("DECK_FILE").ok())
        .ok_or("Usage: deck_pricer <deck list file> (or set DECK_FILE)")?;

    if !price_deck_file(&deck_file).await? {
        return Err(format!("{} could not be priced", deck_file).into());
    }
    Ok(())
}
