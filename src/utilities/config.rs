use std::{env, time::Duration};

use log::error;

use super::constants::{
    FACETOFACE_SOURCE, PRISMA_SOURCE, REDCLAW_SOURCE, TAPS_SOURCE, TIMEVAULT_SOURCE,
};

#[derive(Debug, Clone, PartialEq)]
pub struct VendorSettings {
    pub source: &'static str,
    pub enabled: bool,
    pub delay: Duration,
}

impl VendorSettings {
    fn new(source: &'static str) -> Self {
        Self {
            source,
            enabled: true,
            delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub batch_size: usize,
    pub request_timeout: Duration,
    pub http_attempts: u32,
    pub job_attempts: u32,
    pub job_backoff: Duration,
    pub deck_store_dir: String,
    pub vendors: Vec<VendorSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 5,
            request_timeout: Duration::from_secs(10),
            http_attempts: 2,
            job_attempts: 3,
            job_backoff: Duration::from_millis(1000),
            deck_store_dir: "decks".to_string(),
            vendors: vec![
                VendorSettings::new(FACETOFACE_SOURCE),
                VendorSettings::new(TAPS_SOURCE),
                VendorSettings::new(REDCLAW_SOURCE),
                VendorSettings::new(TIMEVAULT_SOURCE),
                VendorSettings::new(PRISMA_SOURCE),
            ],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.update_from_env();
        config
    }

    fn update_from_env(&mut self) {
        if let Ok(batch_size) = env::var("BATCH_SIZE") {
            match batch_size.parse::<usize>() {
                Ok(size) if size > 0 => self.batch_size = size,
                _ => error!("Ignoring invalid BATCH_SIZE '{}'", batch_size),
            }
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(timeout.parse().unwrap_or(10));
        }
        if let Ok(attempts) = env::var("HTTP_ATTEMPTS") {
            self.http_attempts = attempts.parse().unwrap_or(2).max(1);
        }
        if let Ok(attempts) = env::var("JOB_ATTEMPTS") {
            self.job_attempts = attempts.parse().unwrap_or(3).max(1);
        }
        if let Ok(backoff) = env::var("JOB_BACKOFF_MS") {
            self.job_backoff = Duration::from_millis(backoff.parse().unwrap_or(1000));
        }
        if let Ok(dir) = env::var("DECK_STORE_DIR") {
            if !dir.is_empty() {
                self.deck_store_dir = dir;
            }
        }

        for vendor in self.vendors.iter_mut() {
            let key = Self::env_key(vendor.source);
            if let Ok(enabled) = env::var(&key) {
                vendor.enabled = enabled == "1";
            }
            if let Ok(delay) = env::var(format!("{}_DELAY_MS", key)) {
                vendor.delay = Duration::from_millis(delay.parse().unwrap_or(500));
            }
        }
    }

    fn env_key(source: &str) -> String {
        match source {
            FACETOFACE_SOURCE => "F2F".to_string(),
            other => other.to_uppercase(),
        }
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: Config = Config::new();
}
