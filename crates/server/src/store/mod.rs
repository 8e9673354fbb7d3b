//! Item store clients.
//!
//! # Architecture
//!
//! The store is the single source of truth: one document per item, keyed by
//! the normalized item name, with a single integer `quantity` field. The
//! [`ItemStore`] trait is the store contract; [`FirestoreClient`] speaks the
//! Firestore REST v1 API and [`MemoryStore`] backs the service tests with
//! the same precondition semantics.
//!
//! # Concurrency
//!
//! Every write carries a precondition: creates require the document to be
//! absent, replaces and conditional deletes require the revision observed by
//! the preceding read. A violated precondition surfaces as
//! [`StoreError::Conflict`] so callers can re-read and retry instead of
//! losing an update.

mod firestore;
mod memory;
pub mod types;

pub use firestore::FirestoreClient;
pub use memory::MemoryStore;

use pantry_core::{Item, ItemName};
use thiserror::Error;

/// Errors that can occur when talking to the item store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the store.
        status: u16,
        /// Error message from the store.
        message: String,
    },

    /// A write precondition failed; the caller should re-read and retry.
    #[error("write conflict: document changed since it was read")]
    Conflict,

    /// Rate limited by the store.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse a store response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The store returned a document that violates the data model.
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Opaque revision token for a stored document.
///
/// For Firestore this is the document's `updateTime`; the in-memory store
/// uses a monotonic counter. Revisions are only ever compared by the store
/// itself, as write preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    /// Wrap a raw revision token.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An item together with the store revision it was read at.
#[derive(Debug, Clone)]
pub struct StoredItem {
    /// The item as stored.
    pub item: Item,
    /// Revision to use as a precondition for the next write.
    pub revision: Revision,
}

/// Contract for the remote document collection holding the inventory.
///
/// `put` has upsert, full-field-replace semantics (not a merge-patch). A
/// write either commits atomically or returns an error leaving the document
/// untouched; there is no multi-document transaction.
#[allow(async_fn_in_trait)]
pub trait ItemStore: Send + Sync {
    /// List every item in the collection.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// Fetch one item by name, with its current revision.
    async fn get(&self, name: &ItemName) -> Result<Option<StoredItem>, StoreError>;

    /// Write an item's quantity, replacing all fields.
    ///
    /// `expected = None` creates the document and fails with
    /// [`StoreError::Conflict`] if it already exists. `expected = Some(rev)`
    /// replaces the document and fails with `Conflict` if it has changed
    /// since `rev` was read (or no longer exists).
    async fn put(
        &self,
        name: &ItemName,
        quantity: u32,
        expected: Option<&Revision>,
    ) -> Result<StoredItem, StoreError>;

    /// Delete an item's document.
    ///
    /// `expected = None` deletes unconditionally; deleting a missing
    /// document is not an error. `expected = Some(rev)` fails with
    /// [`StoreError::Conflict`] if the document changed since `rev`.
    async fn delete(&self, name: &ItemName, expected: Option<&Revision>)
    -> Result<(), StoreError>;
}
