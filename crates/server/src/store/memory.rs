//! In-memory item store.
//!
//! Backs the service tests and local development without a Firestore
//! project. Implements the same precondition semantics as the real store:
//! creates fail on existing documents, conditional writes fail on stale
//! revisions.

use std::collections::BTreeMap;
use std::sync::Arc;

use pantry_core::{Item, ItemName};
use tokio::sync::RwLock;

use super::{ItemStore, Revision, StoreError, StoredItem};

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<ItemName, Entry>,
    next_revision: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    quantity: u32,
    revision: u64,
}

/// In-memory [`ItemStore`] with a monotonic revision counter.
///
/// Iteration order is the key order of the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn stored(name: &ItemName, entry: Entry) -> StoredItem {
        StoredItem {
            item: Item::new(name.clone(), entry.quantity),
            revision: Revision::new(entry.revision.to_string()),
        }
    }
}

impl ItemStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .map(|(name, entry)| Item::new(name.clone(), entry.quantity))
            .collect())
    }

    async fn get(&self, name: &ItemName) -> Result<Option<StoredItem>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .items
            .get(name)
            .map(|entry| Self::stored(name, *entry)))
    }

    async fn put(
        &self,
        name: &ItemName,
        quantity: u32,
        expected: Option<&Revision>,
    ) -> Result<StoredItem, StoreError> {
        let mut state = self.state.write().await;

        match (state.items.get(name), expected) {
            (Some(_), None) => return Err(StoreError::Conflict),
            (Some(entry), Some(revision)) if entry.revision.to_string() != revision.as_str() => {
                return Err(StoreError::Conflict);
            }
            (None, Some(_)) => return Err(StoreError::Conflict),
            _ => {}
        }

        state.next_revision += 1;
        let entry = Entry {
            quantity,
            revision: state.next_revision,
        };
        state.items.insert(name.clone(), entry);
        Ok(Self::stored(name, entry))
    }

    async fn delete(
        &self,
        name: &ItemName,
        expected: Option<&Revision>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        match (state.items.get(name), expected) {
            (None, _) => return Ok(()),
            (Some(entry), Some(revision)) if entry.revision.to_string() != revision.as_str() => {
                return Err(StoreError::Conflict);
            }
            _ => {}
        }

        state.items.remove(name);
        Ok(())
    }
}
