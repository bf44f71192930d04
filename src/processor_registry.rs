use std::sync::Arc;

use log::info;

use crate::{
    error::Result,
    facetoface_scraper::FaceToFaceScraper,
    prisma_scraper::PrismaScraper,
    processor::{ScrapingProcessor, VendorProcessor},
    redclaw_scraper::RedClawScraper,
    taps_scraper::TapsScraper,
    timevault_scraper::TimeVaultScraper,
    utilities::{
        config::{Config, VendorSettings},
        constants::{
            FACETOFACE_SOURCE, FACETOFACE_URL, PRISMA_SOURCE, PRISMA_URL, REDCLAW_SOURCE,
            REDCLAW_URL, TAPS_SOURCE, TAPS_URL, TIMEVAULT_SOURCE, TIMEVAULT_URL,
        },
        http::VendorHttp,
    },
};

/// The fixed, ordered set of vendor processors a worker prices decks against.
/// Built once at startup and shared by every job.
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn VendorProcessor>>,
}

impl ProcessorRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = VendorHttp::new(config.request_timeout, config.http_attempts)?;
        let processors = config
            .vendors
            .iter()
            .filter(|vendor| vendor.enabled)
            .filter_map(|vendor| Self::build(vendor, &http))
            .collect();

        let registry = Self::with_processors(processors);
        info!(
            "Registered {} vendor processors: {}",
            registry.processor_count(),
            registry.sources().join(", ")
        );
        Ok(registry)
    }

    pub fn with_processors(processors: Vec<Arc<dyn VendorProcessor>>) -> Self {
        Self { processors }
    }

    fn build(vendor: &VendorSettings, http: &VendorHttp) -> Option<Arc<dyn VendorProcessor>> {
        let http = http.clone();
        let delay = vendor.delay;
        let processor: Arc<dyn VendorProcessor> = match vendor.source {
            FACETOFACE_SOURCE => Arc::new(ScrapingProcessor::new(FaceToFaceScraper::new(
                FACETOFACE_URL,
                http,
                delay,
            ))),
            TAPS_SOURCE => Arc::new(ScrapingProcessor::new(TapsScraper::new(
                TAPS_URL, http, delay,
            ))),
            REDCLAW_SOURCE => Arc::new(ScrapingProcessor::new(RedClawScraper::new(
                REDCLAW_URL,
                http,
                delay,
            ))),
            TIMEVAULT_SOURCE => Arc::new(ScrapingProcessor::new(TimeVaultScraper::new(
                TIMEVAULT_URL,
                http,
                delay,
            ))),
            PRISMA_SOURCE => Arc::new(ScrapingProcessor::new(PrismaScraper::new(
                PRISMA_URL, http, delay,
            ))),
            _ => return None,
        };
        Some(processor)
    }

    pub fn processors(&self) -> &[Arc<dyn VendorProcessor>] {
        &self.processors
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    pub fn sources(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.source()).collect()
    }
}
