//! Application state shared across handlers.

use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::config::PantryConfig;
use crate::services::InventoryService;
use crate::store::FirestoreClient;

/// The concrete inventory service the server runs against.
pub type Inventory = InventoryService<FirestoreClient, CompletionClient>;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the inventory
/// service; no inventory snapshot lives here - callers own the snapshots
/// they read.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PantryConfig,
    inventory: Inventory,
}

impl AppState {
    /// Create the application state, building the store and completion
    /// clients from configuration.
    #[must_use]
    pub fn new(config: PantryConfig) -> Self {
        let store = FirestoreClient::new(&config.firestore);
        let completion = CompletionClient::new(&config.claude);
        let inventory = InventoryService::new(store, completion);

        Self {
            inner: Arc::new(AppStateInner { config, inventory }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &PantryConfig {
        &self.inner.config
    }

    /// Get a reference to the inventory service.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inner.inventory
    }
}
