use std::time::Duration;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    deck_job::{DeckProcessingJob, JobSummary},
    error::{PricingError, Result},
    utilities::config::Config,
};

/// Wire shape: `{"type": "processDeck", "payload": {"deckId": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum QueueMessage {
    #[serde(rename_all = "camelCase")]
    ProcessDeck { deck_id: String },
}

/// Exponential back-off between delivery attempts of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.job_attempts.max(1),
            initial_delay: config.job_backoff,
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub completed: usize,
    pub failed: usize,
}

/// Producer handle. Dropping or closing every handle lets the consumer drain what is queued and stop.
#[derive(Debug, Clone)]
pub struct DeckQueue {
    sender: mpsc::UnboundedSender<QueueMessage>,
}

pub struct DeckConsumer {
    receiver: mpsc::UnboundedReceiver<QueueMessage>,
    policy: RetryPolicy,
}

impl DeckQueue {
    pub fn open(policy: RetryPolicy) -> (DeckQueue, DeckConsumer) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (DeckQueue { sender }, DeckConsumer { receiver, policy })
    }

    pub fn enqueue(&self, message: QueueMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| PricingError::QueueClosed)
    }

    pub fn enqueue_deck(&self, deck_id: &str) -> Result<()> {
        self.enqueue(QueueMessage::ProcessDeck {
            deck_id: deck_id.to_string(),
        })
    }

    pub fn close(self) {
        drop(self.sender);
    }
}

impl DeckConsumer {
    /// Handles messages one at a time until every producer handle is gone.
    pub async fn run(mut self, job: &DeckProcessingJob) -> ConsumerStats {
        let mut stats = ConsumerStats::default();

        while let Some(message) = self.receiver.recv().await {
            match message {
                QueueMessage::ProcessDeck { deck_id } => {
                    match self.process_with_retries(job, &deck_id).await {
                        Ok(summary) => {
                            info!("Job processDeck({}) completed: {}", deck_id, summary);
                            stats.completed += 1;
                        }
                        Err(e) => {
                            error!(
                                "Job processDeck({}) failed after {} attempts: {}",
                                deck_id, self.policy.attempts, e
                            );
                            stats.failed += 1;
                        }
                    }
                }
            }
        }

        info!(
            "Deck queue closed after {} completed and {} failed jobs",
            stats.completed, stats.failed
        );
        stats
    }

    async fn process_with_retries(
        &self,
        job: &DeckProcessingJob,
        deck_id: &str,
    ) -> Result<JobSummary> {
        let mut attempt = 1;
        loop {
            match job.process_deck(deck_id).await {
                Ok(summary) => return Ok(summary),
                Err(e) if attempt < self.policy.attempts => {
                    let delay = self.policy.delay_after(attempt);
                    warn!(
                        "Job processDeck({}) attempt {}/{} failed: {}. Retrying in {:?}",
                        deck_id, attempt, self.policy.attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
