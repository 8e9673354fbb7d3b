//! Assistant route handlers: photo classification and recipe generation.

use axum::{
    Json,
    extract::{Multipart, State},
};
use pantry_core::Item;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::Classification;
use crate::state::AppState;

/// Message shown when the classifier declines an image.
const NOT_PANTRY_MESSAGE: &str = "That doesn't look like a pantry item.";

/// Media type assumed when the upload carries none.
const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// Response from classifying an uploaded photo.
///
/// Exactly one of `item` and `message` is set: `item` when the photographed
/// item was added, `message` when the classifier declined the image.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// The added (or incremented) record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    /// User-facing message when no inventory action was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response carrying generated recipe text.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    /// The generated text, verbatim.
    pub recipe: String,
}

/// Classify an uploaded photo and add the item it shows.
///
/// Expects a multipart body whose first field carries the image bytes.
#[instrument(skip(state, multipart))]
pub async fn classify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("missing image field".to_string()))?;

    let media_type = field
        .content_type()
        .unwrap_or(DEFAULT_MEDIA_TYPE)
        .to_string();
    let image = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;

    if image.is_empty() {
        return Err(AppError::BadRequest("image is empty".to_string()));
    }

    let outcome = state
        .inventory()
        .classify_and_add(&image, &media_type)
        .await?;

    let response = match outcome {
        Classification::Added(item) => ClassifyResponse {
            item: Some(item),
            message: None,
        },
        Classification::NotPantryItem => ClassifyResponse {
            item: None,
            message: Some(NOT_PANTRY_MESSAGE.to_string()),
        },
    };
    Ok(Json(response))
}

/// Generate a recipe from the current inventory.
#[instrument(skip(state))]
pub async fn recipe(State(state): State<AppState>) -> Result<Json<RecipeResponse>> {
    let recipe = state.inventory().suggest_recipe().await?;
    Ok(Json(RecipeResponse { recipe }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::ItemName;

    #[test]
    fn classify_response_omits_absent_fields() {
        let added = ClassifyResponse {
            item: Some(Item::new(ItemName::parse("rice").expect("valid"), 1)),
            message: None,
        };
        let json = serde_json::to_string(&added).expect("serialize");
        assert!(json.contains("\"item\""));
        assert!(!json.contains("\"message\""));

        let declined = ClassifyResponse {
            item: None,
            message: Some(NOT_PANTRY_MESSAGE.to_string()),
        };
        let json = serde_json::to_string(&declined).expect("serialize");
        assert!(!json.contains("\"item\""));
        assert!(json.contains(NOT_PANTRY_MESSAGE));
    }
}
