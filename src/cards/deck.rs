use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    card_request::{parse_deck_list, CardRequest},
    card_result::CardResult,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub results: Vec<CardResult>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckCard {
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

impl DeckCard {
    pub fn request(&self) -> CardRequest {
        CardRequest::new(&self.name, self.quantity)
    }
}

impl From<CardRequest> for DeckCard {
    fn from(card: CardRequest) -> Self {
        Self {
            quantity: card.quantity,
            name: card.name,
            pricing: None,
        }
    }
}

/// The persisted deck document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "Cards")]
    pub cards: Vec<DeckCard>,
    #[serde(rename = "Importing")]
    pub importing: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Deck {
    /// Creates a new deck from a free-text list. The deck starts out importing.
    pub fn import(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            cards: parse_deck_list(text).into_iter().map(DeckCard::from).collect(),
            importing: true,
            created_at: Utc::now(),
        }
    }

    pub fn requests(&self) -> Vec<CardRequest> {
        self.cards.iter().map(DeckCard::request).collect()
    }

    pub fn begin_refresh(&mut self) {
        self.importing = true;
    }

    pub fn finish_import(&mut self) {
        self.importing = false;
    }
}
