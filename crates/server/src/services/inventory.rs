//! Inventory service: the mutation and query protocol over the item store.
//!
//! The service is stateless - it holds the store and completion clients and
//! nothing else. Snapshots belong to the caller: `refresh` returns a fresh
//! list, mutations return the updated record, and whoever wants the full
//! view re-reads.
//!
//! Every quantity mutation is a read followed by a preconditioned write.
//! A concurrent writer invalidates the precondition and the losing call
//! re-reads and retries (bounded), so increments and decrements are never
//! silently lost.

use pantry_core::{Item, ItemName, ItemNameError};
use tracing::{debug, instrument, warn};

use crate::completion::{CompletionError, CompletionModel, NOT_PANTRY_SENTINEL};
use crate::store::{ItemStore, StoreError};

/// Attempts per mutation before a persistent conflict is surfaced.
const MAX_WRITE_ATTEMPTS: usize = 5;

/// Errors that can occur in the inventory service.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// The supplied name normalizes to an invalid store key.
    #[error("invalid item name: {0}")]
    InvalidName(#[from] ItemNameError),

    /// The item store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image classification failed.
    #[error("image classification failed: {0}")]
    Classification(#[source] CompletionError),

    /// Recipe generation failed.
    #[error("recipe generation failed: {0}")]
    RecipeGeneration(#[source] CompletionError),

    /// The inventory has no items to build a recipe from.
    #[error("inventory is empty")]
    EmptyInventory,
}

/// Outcome of classifying a photographed item.
#[derive(Debug, Clone)]
pub enum Classification {
    /// The classifier produced a label and the item was added.
    Added(Item),
    /// The classifier declined the image; the inventory is untouched.
    NotPantryItem,
}

/// The inventory mutation and query protocol.
///
/// Generic over the store and completion contracts so the protocol can be
/// exercised in tests without a Firestore project or an API key.
#[derive(Debug, Clone)]
pub struct InventoryService<S, C> {
    store: S,
    completion: C,
}

impl<S: ItemStore, C: CompletionModel> InventoryService<S, C> {
    /// Create a new inventory service.
    pub const fn new(store: S, completion: C) -> Self {
        Self { store, completion }
    }

    /// Read the full inventory as a fresh authoritative snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read; the caller keeps its
    /// last known-good snapshot in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<Item>, InventoryError> {
        Ok(self.store.list().await?)
    }

    /// Add one of a named item, creating the record at quantity 1.
    ///
    /// The raw name is normalized first; "Milk" and "milk" mutate the same
    /// record. Returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidName`] if the normalized name is
    /// empty or not a valid store key, or a store error if the write fails.
    #[instrument(skip(self))]
    pub async fn add_one(&self, raw_name: &str) -> Result<Item, InventoryError> {
        let name = ItemName::parse(raw_name)?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let result = match self.store.get(&name).await? {
                Some(stored) => {
                    self.store
                        .put(&name, stored.item.quantity + 1, Some(&stored.revision))
                        .await
                }
                None => self.store.put(&name, 1, None).await,
            };

            match result {
                Ok(stored) => return Ok(stored.item),
                Err(StoreError::Conflict) => {
                    debug!(name = %name, attempt, "write conflict, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(InventoryError::Store(StoreError::Conflict))
    }

    /// Remove one of a named item, deleting the record at quantity 0.
    ///
    /// A missing item is a no-op, not an error. Returns the updated record,
    /// or `None` if the record was deleted or never existed.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidName`] for invalid names, or a
    /// store error if the write fails.
    #[instrument(skip(self))]
    pub async fn remove_one(&self, raw_name: &str) -> Result<Option<Item>, InventoryError> {
        let name = ItemName::parse(raw_name)?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let Some(stored) = self.store.get(&name).await? else {
                return Ok(None);
            };

            let result = if stored.item.quantity == 1 {
                self.store
                    .delete(&name, Some(&stored.revision))
                    .await
                    .map(|()| None)
            } else {
                self.store
                    .put(&name, stored.item.quantity - 1, Some(&stored.revision))
                    .await
                    .map(|stored| Some(stored.item))
            };

            match result {
                Ok(item) => return Ok(item),
                Err(StoreError::Conflict) => {
                    debug!(name = %name, attempt, "write conflict, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(InventoryError::Store(StoreError::Conflict))
    }

    /// Delete a named item's record regardless of quantity.
    ///
    /// Returns whether a record existed. A missing item is logged and
    /// reported as `false`; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidName`] for invalid names, or a
    /// store error if the delete fails.
    #[instrument(skip(self))]
    pub async fn remove_all(&self, raw_name: &str) -> Result<bool, InventoryError> {
        let name = ItemName::parse(raw_name)?;

        if self.store.get(&name).await?.is_none() {
            warn!(name = %name, "remove-all requested for missing item");
            return Ok(false);
        }

        self.store.delete(&name, None).await?;
        Ok(true)
    }

    /// Classify a photographed item and add it to the inventory.
    ///
    /// If the classifier returns the "not pantry item" sentinel, nothing is
    /// mutated and [`Classification::NotPantryItem`] is returned for the
    /// caller to surface as a message.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::Classification`] if the completion call
    /// fails; no inventory mutation occurs in that case.
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn classify_and_add(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<Classification, InventoryError> {
        let label = self
            .completion
            .classify_image(image, media_type)
            .await
            .map_err(InventoryError::Classification)?;

        if is_not_pantry(&label) {
            debug!(%label, "classifier declined the image");
            return Ok(Classification::NotPantryItem);
        }

        let item = self.add_one(&label).await?;
        Ok(Classification::Added(item))
    }

    /// Generate recipe text from the current inventory.
    ///
    /// Reads a fresh snapshot, names every item in the prompt, and returns
    /// the generated text verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::EmptyInventory`] if there is nothing to
    /// cook with (checked before any API call), or
    /// [`InventoryError::RecipeGeneration`] if the completion call fails.
    #[instrument(skip(self))]
    pub async fn suggest_recipe(&self) -> Result<String, InventoryError> {
        let items = self.refresh().await?;
        if items.is_empty() {
            return Err(InventoryError::EmptyInventory);
        }

        let names = items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "I have the following items in my pantry: {names}. \
             Suggest one recipe I can make with them."
        );

        self.completion
            .generate_text(&prompt)
            .await
            .map_err(InventoryError::RecipeGeneration)
    }
}

/// Whether a classifier label is the "not pantry item" sentinel.
///
/// Model output is not byte-stable, so the comparison ignores surrounding
/// whitespace, a trailing period, and case.
fn is_not_pantry(label: &str) -> bool {
    label
        .trim()
        .trim_end_matches('.')
        .trim_end()
        .eq_ignore_ascii_case(NOT_PANTRY_SENTINEL)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{MemoryStore, Revision, StoredItem};

    /// Completion stub returning a fixed classification label and recording
    /// every generation prompt.
    #[derive(Debug, Default)]
    struct StubCompletion {
        label: String,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompletion {
        fn classifying(label: &str) -> Self {
            Self {
                label: label.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().expect("lock").clone()
        }
    }

    impl CompletionModel for StubCompletion {
        async fn classify_image(
            &self,
            _image: &[u8],
            _media_type: &str,
        ) -> Result<String, CompletionError> {
            Ok(self.label.clone())
        }

        async fn generate_text(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().expect("lock").push(prompt.to_string());
            Ok("Fried rice: cook the rice, then fry it.".to_string())
        }
    }

    /// Completion stub whose calls always fail.
    #[derive(Debug)]
    struct FailingCompletion;

    impl CompletionModel for FailingCompletion {
        async fn classify_image(
            &self,
            _image: &[u8],
            _media_type: &str,
        ) -> Result<String, CompletionError> {
            Err(CompletionError::Api {
                error_type: "overloaded_error".to_string(),
                message: "Overloaded".to_string(),
            })
        }

        async fn generate_text(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Api {
                error_type: "overloaded_error".to_string(),
                message: "Overloaded".to_string(),
            })
        }
    }

    /// Store wrapper that fails the first write with a conflict, simulating
    /// a lost race against a concurrent writer.
    #[derive(Debug, Clone)]
    struct ConflictOnce {
        inner: MemoryStore,
        fired: std::sync::Arc<AtomicBool>,
    }

    impl ConflictOnce {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                fired: std::sync::Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl ItemStore for ConflictOnce {
        async fn list(&self) -> Result<Vec<Item>, StoreError> {
            self.inner.list().await
        }

        async fn get(&self, name: &ItemName) -> Result<Option<StoredItem>, StoreError> {
            self.inner.get(name).await
        }

        async fn put(
            &self,
            name: &ItemName,
            quantity: u32,
            expected: Option<&Revision>,
        ) -> Result<StoredItem, StoreError> {
            if !self.fired.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Conflict);
            }
            self.inner.put(name, quantity, expected).await
        }

        async fn delete(
            &self,
            name: &ItemName,
            expected: Option<&Revision>,
        ) -> Result<(), StoreError> {
            self.inner.delete(name, expected).await
        }
    }

    /// Store whose writes always conflict.
    #[derive(Debug, Clone, Default)]
    struct AlwaysConflict {
        inner: MemoryStore,
    }

    impl ItemStore for AlwaysConflict {
        async fn list(&self) -> Result<Vec<Item>, StoreError> {
            self.inner.list().await
        }

        async fn get(&self, name: &ItemName) -> Result<Option<StoredItem>, StoreError> {
            self.inner.get(name).await
        }

        async fn put(
            &self,
            _name: &ItemName,
            _quantity: u32,
            _expected: Option<&Revision>,
        ) -> Result<StoredItem, StoreError> {
            Err(StoreError::Conflict)
        }

        async fn delete(
            &self,
            _name: &ItemName,
            _expected: Option<&Revision>,
        ) -> Result<(), StoreError> {
            Err(StoreError::Conflict)
        }
    }

    fn service(store: MemoryStore) -> InventoryService<MemoryStore, StubCompletion> {
        InventoryService::new(store, StubCompletion::classifying("tomatoes"))
    }

    async fn quantity_of(store: &MemoryStore, name: &str) -> Option<u32> {
        store
            .get(&ItemName::parse(name).expect("valid name"))
            .await
            .expect("get")
            .map(|stored| stored.item.quantity)
    }

    #[tokio::test]
    async fn add_one_creates_at_quantity_one() {
        let store = MemoryStore::new();
        let item = service(store.clone()).add_one("Apples").await.expect("add");

        assert_eq!(item.name.as_str(), "apples");
        assert_eq!(item.quantity, 1);
        assert_eq!(quantity_of(&store, "apples").await, Some(1));
    }

    #[tokio::test]
    async fn add_one_increments_existing() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("apples").await.expect("create");
        let item = svc.add_one("apples").await.expect("increment");

        assert_eq!(item.quantity, 2);
        assert_eq!(quantity_of(&store, "apples").await, Some(2));
    }

    #[tokio::test]
    async fn add_one_normalizes_to_one_record() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("Milk").await.expect("add");
        svc.add_one("  milk ").await.expect("add");

        let items = svc.refresh().await.expect("refresh");
        assert_eq!(items.len(), 1);
        assert_eq!(quantity_of(&store, "milk").await, Some(2));
    }

    #[tokio::test]
    async fn add_one_rejects_empty_names() {
        let svc = service(MemoryStore::new());
        let result = svc.add_one("   ").await;
        assert!(matches!(result, Err(InventoryError::InvalidName(_))));
    }

    #[tokio::test]
    async fn remove_one_decrements() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("rice").await.expect("add");
        svc.add_one("rice").await.expect("add");

        let item = svc.remove_one("rice").await.expect("remove");
        assert_eq!(item.expect("still present").quantity, 1);
        assert_eq!(quantity_of(&store, "rice").await, Some(1));
    }

    #[tokio::test]
    async fn remove_one_deletes_at_quantity_one() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("rice").await.expect("add");

        let item = svc.remove_one("rice").await.expect("remove");
        assert!(item.is_none());
        assert_eq!(quantity_of(&store, "rice").await, None);
    }

    #[tokio::test]
    async fn remove_one_on_missing_item_is_a_noop() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("milk").await.expect("add");

        let item = svc.remove_one("rice").await.expect("no-op");
        assert!(item.is_none());

        let items = svc.refresh().await.expect("refresh");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn remove_one_normalizes_the_name() {
        // The original UI passed the displayed (possibly capitalized) name
        // straight through; both spellings must hit the same record.
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("apples").await.expect("add");
        svc.add_one("apples").await.expect("add");

        svc.remove_one("Apples").await.expect("remove");
        assert_eq!(quantity_of(&store, "apples").await, Some(1));
    }

    #[tokio::test]
    async fn remove_all_deletes_regardless_of_quantity() {
        let store = MemoryStore::new();
        let svc = service(store.clone());
        svc.add_one("rice").await.expect("add");
        svc.add_one("rice").await.expect("add");
        svc.add_one("rice").await.expect("add");
        assert_eq!(quantity_of(&store, "rice").await, Some(3));

        let removed = svc.remove_all("Rice").await.expect("remove-all");
        assert!(removed);
        assert!(svc.refresh().await.expect("refresh").is_empty());
    }

    #[tokio::test]
    async fn remove_all_on_missing_item_reports_false() {
        let svc = service(MemoryStore::new());
        let removed = svc.remove_all("rice").await.expect("remove-all");
        assert!(!removed);
    }

    #[tokio::test]
    async fn add_remove_lifecycle_scenario() {
        let store = MemoryStore::new();
        let svc = service(store.clone());

        svc.add_one("Apples").await.expect("add");
        assert_eq!(quantity_of(&store, "apples").await, Some(1));

        svc.add_one("Apples").await.expect("add");
        assert_eq!(quantity_of(&store, "apples").await, Some(2));

        svc.remove_one("apples").await.expect("remove");
        assert_eq!(quantity_of(&store, "apples").await, Some(1));

        svc.remove_one("apples").await.expect("remove");
        assert_eq!(quantity_of(&store, "apples").await, None);
        assert!(svc.refresh().await.expect("refresh").is_empty());
    }

    #[tokio::test]
    async fn classify_sentinel_never_mutates() {
        let store = MemoryStore::new();
        let svc = InventoryService::new(
            store.clone(),
            StubCompletion::classifying("not pantry item"),
        );

        let outcome = svc
            .classify_and_add(&[0xFF, 0xD8], "image/jpeg")
            .await
            .expect("classify");
        assert!(matches!(outcome, Classification::NotPantryItem));
        assert!(svc.refresh().await.expect("refresh").is_empty());
    }

    #[tokio::test]
    async fn classify_sentinel_variants_are_recognized() {
        for label in ["Not pantry item.", "  NOT PANTRY ITEM ", "not pantry item"] {
            let store = MemoryStore::new();
            let svc = InventoryService::new(store, StubCompletion::classifying(label));
            let outcome = svc
                .classify_and_add(&[0xFF, 0xD8], "image/jpeg")
                .await
                .expect("classify");
            assert!(
                matches!(outcome, Classification::NotPantryItem),
                "label {label:?} should be treated as the sentinel"
            );
        }
    }

    #[tokio::test]
    async fn classify_label_adds_the_item() {
        let store = MemoryStore::new();
        let svc = InventoryService::new(store.clone(), StubCompletion::classifying("Tomatoes"));

        let outcome = svc
            .classify_and_add(&[0xFF, 0xD8], "image/jpeg")
            .await
            .expect("classify");
        match outcome {
            Classification::Added(item) => {
                assert_eq!(item.name.as_str(), "tomatoes");
                assert_eq!(item.quantity, 1);
            }
            Classification::NotPantryItem => panic!("expected the item to be added"),
        }
        assert_eq!(quantity_of(&store, "tomatoes").await, Some(1));
    }

    #[tokio::test]
    async fn classification_failure_leaves_inventory_untouched() {
        let store = MemoryStore::new();
        let svc = InventoryService::new(store.clone(), FailingCompletion);

        let result = svc.classify_and_add(&[0xFF, 0xD8], "image/jpeg").await;
        assert!(matches!(result, Err(InventoryError::Classification(_))));
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn recipe_prompt_names_every_item() {
        let store = MemoryStore::new();
        let completion = StubCompletion::classifying("unused");
        let svc = InventoryService::new(store, completion);
        svc.add_one("rice").await.expect("add");
        svc.add_one("tomatoes").await.expect("add");

        let recipe = svc.suggest_recipe().await.expect("recipe");
        assert_eq!(recipe, "Fried rice: cook the rice, then fry it.");

        let prompts = svc.completion.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("rice"));
        assert!(prompts[0].contains("tomatoes"));
    }

    #[tokio::test]
    async fn recipe_on_empty_inventory_is_rejected_locally() {
        let completion = StubCompletion::classifying("unused");
        let svc = InventoryService::new(MemoryStore::new(), completion);

        let result = svc.suggest_recipe().await;
        assert!(matches!(result, Err(InventoryError::EmptyInventory)));
        // Rejected before any API call.
        assert!(svc.completion.prompts().is_empty());
    }

    #[tokio::test]
    async fn recipe_generation_failure_is_surfaced() {
        let store = MemoryStore::new();
        store
            .put(&ItemName::parse("rice").expect("valid"), 1, None)
            .await
            .expect("seed");
        let svc = InventoryService::new(store, FailingCompletion);

        let result = svc.suggest_recipe().await;
        assert!(matches!(result, Err(InventoryError::RecipeGeneration(_))));
    }

    #[tokio::test]
    async fn lost_write_race_is_retried() {
        let store = ConflictOnce::new(MemoryStore::new());
        let svc = InventoryService::new(store.clone(), StubCompletion::classifying("unused"));

        let item = svc.add_one("milk").await.expect("add despite conflict");
        assert_eq!(item.quantity, 1);
        assert!(store.fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn persistent_conflict_is_surfaced_after_bounded_retries() {
        let svc = InventoryService::new(
            AlwaysConflict::default(),
            StubCompletion::classifying("unused"),
        );

        let result = svc.add_one("milk").await;
        assert!(matches!(
            result,
            Err(InventoryError::Store(StoreError::Conflict))
        ));
    }

    #[tokio::test]
    async fn refresh_returns_the_full_snapshot() {
        let store = MemoryStore::new();
        let svc = service(store);
        svc.add_one("milk").await.expect("add");
        svc.add_one("rice").await.expect("add");

        let items = svc.refresh().await.expect("refresh");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn sentinel_detection_ignores_case_and_trailing_period() {
        assert!(is_not_pantry("not pantry item"));
        assert!(is_not_pantry("Not Pantry Item."));
        assert!(is_not_pantry(" not pantry item \n"));
        assert!(!is_not_pantry("pantry item"));
        assert!(!is_not_pantry("peanut butter"));
    }
}
