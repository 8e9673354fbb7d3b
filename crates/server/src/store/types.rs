//! Wire types for the Firestore REST v1 API.
//!
//! Firestore documents wrap every field value in a typed envelope; the
//! 64-bit `integerValue` travels as a JSON string. Only the shapes this
//! service actually reads and writes are modeled here.

use pantry_core::{Item, ItemName};
use serde::{Deserialize, Serialize};

use super::{Revision, StoreError, StoredItem};

/// A Firestore document holding one item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    /// (`projects/{p}/databases/(default)/documents/{collection}/{key}`).
    pub name: String,
    /// Item fields.
    pub fields: ItemFields,
    /// Server-assigned revision, used as a write precondition.
    pub update_time: String,
}

/// The fields of an item document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFields {
    /// Count on hand.
    pub quantity: IntegerValue,
}

/// Firestore's typed integer envelope (transported as a string).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerValue {
    /// Decimal string encoding of the value.
    pub integer_value: String,
}

impl ItemFields {
    /// Build the field set for a quantity write.
    #[must_use]
    pub fn from_quantity(quantity: u32) -> Self {
        Self {
            quantity: IntegerValue {
                integer_value: quantity.to_string(),
            },
        }
    }
}

/// Body of a document write (`PATCH`).
#[derive(Debug, Clone, Serialize)]
pub struct WriteDocument {
    /// Item fields, replacing the document's fields wholesale.
    pub fields: ItemFields,
}

/// Response from listing a collection's documents.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    /// Documents in this page; absent for an empty collection.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Cursor for the next page, if any.
    pub next_page_token: Option<String>,
}

/// Error envelope returned by the Firestore REST API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorStatus,
}

/// Error details within an [`ErrorResponse`].
#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    /// Numeric gRPC-style code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Canonical status name (e.g., `FAILED_PRECONDITION`).
    pub status: String,
}

impl Document {
    /// Returns the document key (last path segment of the resource name).
    #[must_use]
    pub fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Convert the document into an item plus its revision.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the key is not a valid normalized
    /// item name or the quantity does not parse as a non-negative integer.
    pub fn into_stored_item(self) -> Result<StoredItem, StoreError> {
        let name = ItemName::parse(self.doc_id())
            .map_err(|e| StoreError::Corrupt(format!("invalid document key: {e}")))?;

        let quantity = self
            .fields
            .quantity
            .integer_value
            .parse::<u32>()
            .map_err(|e| StoreError::Corrupt(format!("invalid quantity: {e}")))?;

        Ok(StoredItem {
            item: Item::new(name, quantity),
            revision: Revision::new(self.update_time),
        })
    }
}
