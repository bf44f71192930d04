pub mod batch_scheduler;
pub mod best_offer;
pub mod cards;
pub mod deck_job;
pub mod deck_queue;
pub mod deck_service;
pub mod deck_store;
pub mod error;
pub mod facetoface_scraper;
pub mod pricing_aggregator;
pub mod prisma_scraper;
pub mod processor;
pub mod processor_registry;
pub mod redclaw_scraper;
pub mod taps_scraper;
pub mod timevault_scraper;
pub mod utilities;

#[cfg(test)]
mod test;
