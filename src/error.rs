use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("failed to decode json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse {source_code} response: {reason}")]
    Parse { source_code: String, reason: String },

    /// Whole-processor failure, the vendor could not be reached for any card.
    #[error("vendor {0} is unreachable")]
    VendorUnavailable(String),

    #[error("deck {0} not found")]
    DeckNotFound(String),

    #[error("failed to persist deck {deck_id}: {reason}")]
    Persistence { deck_id: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("deck queue is closed")]
    QueueClosed,
}

impl PricingError {
    pub fn parse(source_code: &str, reason: impl Into<String>) -> Self {
        PricingError::Parse {
            source_code: source_code.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the request never reached the vendor.
    pub fn is_connect(&self) -> bool {
        match self {
            PricingError::Http(e) => e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;
