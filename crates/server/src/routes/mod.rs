//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Store reachability
//!
//! # Inventory
//! GET  /api/inventory              - Snapshot (optional ?q= substring filter)
//! POST /api/inventory/add          - Add one of a named item
//! POST /api/inventory/remove       - Remove one (deletes the record at 0)
//! POST /api/inventory/remove-all   - Delete a record regardless of quantity
//!
//! # Assistant
//! POST /api/assistant/classify     - Classify an uploaded photo and add it
//! GET  /api/assistant/recipe       - Generate a recipe from the inventory
//! ```

pub mod assistant;
pub mod inventory;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index))
        .route("/add", post(inventory::add))
        .route("/remove", post(inventory::remove))
        .route("/remove-all", post(inventory::remove_all))
}

/// Create the assistant routes router.
pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/classify", post(assistant::classify))
        .route("/recipe", get(assistant::recipe))
}

/// Create the combined application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/inventory", inventory_routes())
        .nest("/api/assistant", assistant_routes())
}
