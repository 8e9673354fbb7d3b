//! Firestore REST v1 item store client.

use std::sync::Arc;

use pantry_core::{Item, ItemName};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::config::FirestoreConfig;

use super::types::{Document, ErrorResponse, ItemFields, ListDocumentsResponse, WriteDocument};
use super::{ItemStore, Revision, StoreError, StoredItem};

/// Page size for collection listing. The inventory is small; this keeps the
/// common case to a single request while still following page tokens.
const LIST_PAGE_SIZE: &str = "300";

/// Firestore REST API client for the item collection.
///
/// One fixed collection holds the whole inventory: document key = normalized
/// item name, fields = `{ quantity: integerValue }`. Writes use document
/// preconditions (`currentDocument.exists` / `currentDocument.updateTime`)
/// so concurrent read-modify-write cycles conflict instead of losing updates.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    collection: String,
    api_key: SecretString,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new(config: &FirestoreConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(FirestoreClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                project_id: config.project_id.clone(),
                collection: config.collection.clone(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// URL of the item collection.
    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.inner.base_url, self.inner.project_id, self.inner.collection
        )
    }

    /// URL of one item document. Names may contain spaces, so the key is
    /// percent-encoded as a path segment.
    fn document_url(&self, name: &ItemName) -> String {
        format!(
            "{}/{}",
            self.collection_url(),
            urlencoding::encode(name.as_str())
        )
    }

    fn api_key(&self) -> &str {
        self.inner.api_key.expose_secret()
    }

    /// Map a non-success response to a `StoreError`.
    async fn handle_error_status(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> StoreError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return StoreError::RateLimited(retry_after);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return StoreError::Http(e),
        };

        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&body) {
            // Precondition violations come back as ALREADY_EXISTS (create)
            // or FAILED_PRECONDITION (stale updateTime).
            if parsed.error.status == "ALREADY_EXISTS"
                || parsed.error.status == "FAILED_PRECONDITION"
            {
                return StoreError::Conflict;
            }
            return StoreError::Api {
                status: status.as_u16(),
                message: parsed.error.message,
            };
        }

        if status == StatusCode::CONFLICT {
            return StoreError::Conflict;
        }

        StoreError::Api {
            status: status.as_u16(),
            message: body,
        }
    }

    async fn parse_document(&self, response: reqwest::Response) -> Result<Document, StoreError> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| StoreError::Parse(format!("failed to parse document: {e}")))
    }
}

impl ItemStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.inner.client.get(self.collection_url()).query(&[
                ("pageSize", LIST_PAGE_SIZE),
                ("key", self.api_key()),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(self.handle_error_status(status, response).await);
            }

            let body = response.text().await?;
            let page: ListDocumentsResponse = serde_json::from_str(&body)
                .map_err(|e| StoreError::Parse(format!("failed to parse list response: {e}")))?;

            for document in page.documents {
                items.push(document.into_stored_item()?.item);
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }

    #[instrument(skip(self), fields(name = %name))]
    async fn get(&self, name: &ItemName) -> Result<Option<StoredItem>, StoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(name))
            .query(&[("key", self.api_key())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        let document = self.parse_document(response).await?;
        Ok(Some(document.into_stored_item()?))
    }

    #[instrument(skip(self), fields(name = %name, quantity = quantity))]
    async fn put(
        &self,
        name: &ItemName,
        quantity: u32,
        expected: Option<&Revision>,
    ) -> Result<StoredItem, StoreError> {
        let mut request = self
            .inner
            .client
            .patch(self.document_url(name))
            .query(&[("key", self.api_key())]);

        request = match expected {
            Some(revision) => {
                request.query(&[("currentDocument.updateTime", revision.as_str())])
            }
            None => request.query(&[("currentDocument.exists", "false")]),
        };

        let response = request
            .json(&WriteDocument {
                fields: ItemFields::from_quantity(quantity),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        let document = self.parse_document(response).await?;
        document.into_stored_item()
    }

    #[instrument(skip(self), fields(name = %name))]
    async fn delete(
        &self,
        name: &ItemName,
        expected: Option<&Revision>,
    ) -> Result<(), StoreError> {
        let mut request = self
            .inner
            .client
            .delete(self.document_url(name))
            .query(&[("key", self.api_key())]);

        if let Some(revision) = expected {
            request = request.query(&[("currentDocument.updateTime", revision.as_str())]);
        }

        let response = request.send().await?;

        let status = response.status();
        // Firestore treats deleting a missing document as a no-op; mirror
        // that even if a proxy turns it into a 404.
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !status.is_success() {
            return Err(self.handle_error_status(status, response).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirestoreClient {
        FirestoreClient::new(&FirestoreConfig {
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            project_id: "demo-project".to_string(),
            collection: "inventory".to_string(),
            api_key: SecretString::from("test-key"),
        })
    }

    #[test]
    fn collection_url_includes_project_and_collection() {
        assert_eq!(
            client().collection_url(),
            "https://firestore.googleapis.com/v1/projects/demo-project/databases/(default)/documents/inventory"
        );
    }

    #[test]
    fn document_url_percent_encodes_the_key() {
        let name = ItemName::parse("olive oil").expect("valid name");
        let url = client().document_url(&name);
        assert!(url.ends_with("/inventory/olive%20oil"));
    }

    #[test]
    fn trailing_slash_in_base_url_is_trimmed() {
        let client = FirestoreClient::new(&FirestoreConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            project_id: "demo".to_string(),
            collection: "inventory".to_string(),
            api_key: SecretString::from("test-key"),
        });
        assert!(
            client
                .collection_url()
                .starts_with("http://localhost:8080/v1/projects/")
        );
    }

    #[test]
    fn firestore_client_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<FirestoreClient>();
    }
}
