//! Inventory route handlers.

use axum::{Json, extract::Query, extract::State};
use pantry_core::{Item, search};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Query parameters for the snapshot endpoint.
#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    /// Case-insensitive substring filter over item names.
    #[serde(default)]
    pub q: String,
}

/// Request body naming an item.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    /// Raw item name; normalized by the service.
    pub name: String,
}

/// Inventory snapshot response.
#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    /// Items, in store iteration order.
    pub items: Vec<Item>,
}

/// Response carrying the record updated by a mutation.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// The updated record.
    pub item: Item,
}

/// Response from a remove-one; `item` is `null` when the record was
/// deleted or never existed.
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    /// The updated record, if one remains.
    pub item: Option<Item>,
}

/// Response from a remove-all.
#[derive(Debug, Serialize)]
pub struct RemoveAllResponse {
    /// Whether a record existed and was deleted.
    pub removed: bool,
}

/// Return the current inventory snapshot, optionally filtered.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<InventoryResponse>> {
    let snapshot = state.inventory().refresh().await?;
    let items = if query.q.is_empty() {
        snapshot
    } else {
        search(&snapshot, &query.q)
    };
    Ok(Json(InventoryResponse { items }))
}

/// Add one of a named item.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<Json<ItemResponse>> {
    let item = state.inventory().add_one(&request.name).await?;
    Ok(Json(ItemResponse { item }))
}

/// Remove one of a named item.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<Json<RemoveResponse>> {
    let item = state.inventory().remove_one(&request.name).await?;
    Ok(Json(RemoveResponse { item }))
}

/// Delete a named item's record regardless of quantity.
#[instrument(skip(state))]
pub async fn remove_all(
    State(state): State<AppState>,
    Json(request): Json<NameRequest>,
) -> Result<Json<RemoveAllResponse>> {
    let removed = state.inventory().remove_all(&request.name).await?;
    Ok(Json(RemoveAllResponse { removed }))
}
