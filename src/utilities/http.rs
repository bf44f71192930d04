use std::time::Duration;

use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{PricingError, Result};

use super::constants;

/// Shared HTTP plumbing for the vendor scrapers: browser headers, timeout and transport retries.
#[derive(Debug, Clone)]
pub struct VendorHttp {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
}

impl VendorHttp {
    pub fn new(timeout: Duration, attempts: u32) -> Result<Self> {
        let client = Client::builder()
            .default_headers(Self::get_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            attempts: attempts.max(1),
            retry_delay: Duration::from_millis(250),
        })
    }

    pub async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        let response = self.send(|| self.client.get(url).query(query), url).await?;
        Ok(response.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_text(url, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(|| self.client.post(url).json(body), url).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send<F>(&self, build: F, url: &str) -> Result<reqwest::Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            let outcome = match build().send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => PricingError::Status {
                    status: response.status(),
                    url: url.to_string(),
                },
                Err(e) => PricingError::Http(e),
            };

            if attempt >= self.attempts || !Self::is_transient(&outcome) {
                return Err(outcome);
            }
            warn!(
                "Request to {} failed on attempt {}/{}: {}",
                url, attempt, self.attempts, outcome
            );
            tokio::time::sleep(self.retry_delay).await;
            attempt += 1;
            debug!("Retrying {}", url);
        }
    }

    fn is_transient(error: &PricingError) -> bool {
        match error {
            PricingError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            PricingError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    fn get_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/json;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-CA,en;q=0.9"));
        headers
    }
}
