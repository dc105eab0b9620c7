//! REST client for the hosted document store.
//!
//! Documents live in named collections and are addressed by a provider-assigned
//! id. The client is collection-agnostic; field types are chosen by callers.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::{RemoteStoreError, Result};
use crate::types::{ApiErrorResponse, Document, DocumentList, FieldsRequest};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the document store REST API.
#[derive(Debug, Clone)]
pub struct DocumentStoreClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DocumentStoreClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Document store response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Document store error ({}): {}", status, preview);
    }

    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the document store API (e.g., "https://docs.example.com")
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(RemoteStoreError::invalid_request("Empty base URL"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteStoreError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/collections/{}/documents",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> RemoteStoreError {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(error) => RemoteStoreError::api(status.as_u16(), error.code, error.message),
            Err(_) => RemoteStoreError::api(
                status.as_u16(),
                String::new(),
                format!("Request failed: {}", body),
            ),
        }
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize document store response. Body: {}, Error: {}",
                body,
                e
            );
            RemoteStoreError::from(e)
        })
    }

    /// Check status only, ignoring any success body.
    async fn expect_success(response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            debug!("Document store response status: {}", status);
            return Ok(());
        }
        let body = response.text().await?;
        Self::log_response(status, &body);
        Err(Self::api_error(status, &body))
    }

    /// Documents whose `field` equals `value`. Results are unordered.
    ///
    /// GET /v1/collections/{collection}/documents?where.{field}={value}
    pub async fn query_documents<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document<T>>> {
        let url = self.collection_url(collection);
        debug!("Querying {} where {} = {}", collection, field, value);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[(format!("where.{}", field), value)])
            .send()
            .await?;

        let list: DocumentList<T> = Self::parse_response(response).await?;
        Ok(list.documents)
    }

    /// Up to `limit` documents from a collection.
    ///
    /// GET /v1/collections/{collection}/documents?limit={n}
    pub async fn list_documents<T: DeserializeOwned>(
        &self,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<Document<T>>> {
        let url = self.collection_url(collection);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;

        let list: DocumentList<T> = Self::parse_response(response).await?;
        Ok(list.documents)
    }

    /// Create a document; the server assigns its id.
    ///
    /// POST /v1/collections/{collection}/documents
    pub async fn create_document<F: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        fields: &F,
    ) -> Result<Document<T>> {
        let url = self.collection_url(collection);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&FieldsRequest { fields })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Merge `fields` into an existing document.
    ///
    /// PATCH /v1/collections/{collection}/documents/{id}
    pub async fn patch_document<F: Serialize, T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        fields: &F,
    ) -> Result<Document<T>> {
        let url = self.document_url(collection, id);

        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(&FieldsRequest { fields })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// DELETE /v1/collections/{collection}/documents/{id}
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.document_url(collection, id);

        let response = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::expect_success(response).await
    }
}
