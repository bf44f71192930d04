use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use crate::{
    cards::deck::Deck,
    error::{PricingError, Result},
    utilities::{
        constants::DECK_FILE_PREFIX,
        file_management::{load_from_json_file, save_to_file},
    },
};

/// Document store for decks. `save` replaces the whole document.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeckStore: Send + Sync {
    async fn find_by_id(&self, deck_id: &str) -> Result<Option<Deck>>;

    async fn save(&self, deck: &Deck) -> Result<()>;
}

/// One pretty-printed JSON file per deck.
pub struct JsonFileDeckStore {
    dir: PathBuf,
}

impl JsonFileDeckStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, deck_id: &str) -> Result<PathBuf> {
        if deck_id.is_empty() || deck_id.contains(['/', '\\']) || deck_id.contains("..") {
            return Err(PricingError::Persistence {
                deck_id: deck_id.to_string(),
                reason: "invalid deck id".to_string(),
            });
        }
        Ok(self
            .dir
            .join(format!("{}{}.json", DECK_FILE_PREFIX, deck_id)))
    }
}

#[async_trait]
impl DeckStore for JsonFileDeckStore {
    async fn find_by_id(&self, deck_id: &str) -> Result<Option<Deck>> {
        let path = self.path_for(deck_id)?;
        if !path.exists() {
            return Ok(None);
        }

        load_from_json_file(&path)
            .map(Some)
            .map_err(|e| PricingError::Persistence {
                deck_id: deck_id.to_string(),
                reason: e.to_string(),
            })
    }

    async fn save(&self, deck: &Deck) -> Result<()> {
        let path = self.path_for(&deck.id)?;
        debug!("Saving deck {} to {}", deck.id, path.display());
        save_to_file(&path, deck).map_err(|e| PricingError::Persistence {
            deck_id: deck.id.clone(),
            reason: e.to_string(),
        })
    }
}

#[derive(Default)]
pub struct InMemoryDeckStore {
    decks: Mutex<HashMap<String, Deck>>,
    saves: AtomicUsize,
}

impl InMemoryDeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeckStore for InMemoryDeckStore {
    async fn find_by_id(&self, deck_id: &str) -> Result<Option<Deck>> {
        Ok(self.decks.lock().await.get(deck_id).cloned())
    }

    async fn save(&self, deck: &Deck) -> Result<()> {
        self.decks.lock().await.insert(deck.id.clone(), deck.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDeckStore::new(dir.path());
        let deck = Deck::import("4 Lightning Bolt\n1 Sol Ring");

        store.save(&deck).await.unwrap();
        let loaded = store.find_by_id(&deck.id).await.unwrap();

        assert_eq!(loaded, Some(deck.clone()));
        assert!(dir
            .path()
            .join(format!("{}{}.json", DECK_FILE_PREFIX, deck.id))
            .exists());
    }

    #[tokio::test]
    async fn test_json_file_store_replaces_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDeckStore::new(dir.path());
        let mut deck = Deck::import("1 Sol Ring");
        store.save(&deck).await.unwrap();

        deck.finish_import();
        store.save(&deck).await.unwrap();

        let loaded = store.find_by_id(&deck.id).await.unwrap().unwrap();
        assert!(!loaded.importing);
    }

    #[tokio::test]
    async fn test_json_file_store_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileDeckStore::new(dir.path());

        assert_eq!(store.find_by_id("missing").await.unwrap(), None);
        assert!(matches!(
            store.find_by_id("../etc/passwd").await,
            Err(PricingError::Persistence { .. })
        ));
    }

    #[tokio::test]
    async fn test_json_file_store_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deck_broken.json"), "{not json").unwrap();
        let store = JsonFileDeckStore::new(dir.path());

        let result = store.find_by_id("broken").await;

        assert!(matches!(result, Err(PricingError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_store_counts_saves() {
        let store = InMemoryDeckStore::new();
        let deck = Deck::import("1 Sol Ring");

        store.save(&deck).await.unwrap();
        store.save(&deck).await.unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.find_by_id(&deck.id).await.unwrap(), Some(deck));
        assert_eq!(store.find_by_id("other").await.unwrap(), None);
    }
}
