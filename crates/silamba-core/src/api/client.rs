//! API client for the catalog REST server.
//!
//! This module provides the `ApiClient` struct for listing, creating,
//! updating and deleting records in the five catalog collections, plus
//! the legacy singular `/banner` endpoint.

use anyhow::Result;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::models::{new_record_id, Banner, Record, Resource};
use crate::utils::json_kind;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither the config file nor the environment set one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Singular banner endpoint kept for older servers.
const LEGACY_BANNER_PATH: &str = "banner";

/// API client for the catalog server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    ///
    /// No request timeout is configured; the transport default applies.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client sharing an existing connection pool.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn record_url(&self, path: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, path, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(resource: &str, response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(resource, status, &body))
        }
    }

    /// Read a JSON body, treating an empty body as `None`.
    async fn read_json(resource: &str, response: Response) -> Result<Option<Value>, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(resource, e))?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::invalid_response(resource, e))
    }

    fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::invalid_response(resource, e))
    }

    fn encode<T: Record>(record: &T) -> Result<Value, ApiError> {
        serde_json::to_value(record).map_err(|e| ApiError::Encode {
            resource: T::RESOURCE.path().to_string(),
            message: e.to_string(),
        })
    }

    /// Keep the id we sent when the server echoes a record without one.
    fn with_fallback_id(mut returned: Value, sent: &Value) -> Value {
        let has_id = returned
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.is_empty());
        if !has_id {
            if let (Some(obj), Some(id)) = (returned.as_object_mut(), sent.get("id")) {
                obj.insert("id".to_string(), id.clone());
            }
        }
        returned
    }

    // ===== Raw collection operations =====

    /// Fetch every record of a collection as raw JSON.
    /// An empty or `null` body yields an empty list.
    pub async fn list_raw(&self, resource: Resource) -> Result<Vec<Value>, ApiError> {
        let path = resource.path();
        let url = self.collection_url(path);
        debug!(%resource, url = %url, "GET collection");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::network(path, e))?;
        let response = Self::check_response(path, response).await?;

        match Self::read_json(path, response).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ApiError::invalid_response(
                path,
                format!("expected a JSON array, found {}", json_kind(&other)),
            )),
        }
    }

    /// Create a record. The server's copy is returned; if the server sends
    /// nothing back the submitted record stands in for it.
    pub async fn create_raw(&self, resource: Resource, record: Value) -> Result<Value, ApiError> {
        let path = resource.path();
        let url = self.collection_url(path);
        debug!(%resource, url = %url, "POST record");

        let response = self
            .client
            .post(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| ApiError::network(path, e))?;
        let response = Self::check_response(path, response).await?;

        Ok(match Self::read_json(path, response).await? {
            Some(created) if created.is_object() => Self::with_fallback_id(created, &record),
            _ => record,
        })
    }

    /// Replace a record by id with a full-record PUT.
    pub async fn update_raw(
        &self,
        resource: Resource,
        id: &str,
        record: Value,
    ) -> Result<Value, ApiError> {
        let path = resource.path();
        let url = self.record_url(path, id);
        debug!(%resource, id, url = %url, "PUT record");

        let response = self
            .client
            .put(&url)
            .json(&record)
            .send()
            .await
            .map_err(|e| ApiError::network(path, e))?;
        let response = Self::check_response(path, response).await?;

        Ok(match Self::read_json(path, response).await? {
            Some(updated) if updated.is_object() => Self::with_fallback_id(updated, &record),
            _ => record,
        })
    }

    pub async fn delete_raw(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        let path = resource.path();
        let url = self.record_url(path, id);
        debug!(%resource, id, url = %url, "DELETE record");

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::network(path, e))?;
        Self::check_response(path, response).await?;
        Ok(())
    }

    // ===== Typed collection operations =====

    pub async fn list<T: Record>(&self) -> Result<Vec<T>, ApiError> {
        let resource = T::RESOURCE;
        self.list_raw(resource)
            .await?
            .into_iter()
            .map(|item| Self::decode(resource.path(), item))
            .collect()
    }

    /// Create a record, assigning a client id first if it has none.
    pub async fn create<T: Record>(&self, record: &T) -> Result<T, ApiError> {
        let mut record = record.clone();
        if record.id().is_empty() {
            record.set_id(new_record_id());
        }
        let body = Self::encode(&record)?;
        let created = self.create_raw(T::RESOURCE, body).await?;
        Self::decode(T::RESOURCE.path(), created)
    }

    pub async fn update<T: Record>(&self, record: &T) -> Result<T, ApiError> {
        let body = Self::encode(record)?;
        let updated = self.update_raw(T::RESOURCE, record.id(), body).await?;
        Self::decode(T::RESOURCE.path(), updated)
    }

    pub async fn delete<T: Record>(&self, id: &str) -> Result<(), ApiError> {
        self.delete_raw(T::RESOURCE, id).await
    }

    // ===== Legacy singular banner =====

    /// Fetch the single promo banner from `/banner`.
    pub async fn get_banner(&self) -> Result<Option<Banner>, ApiError> {
        let url = self.collection_url(LEGACY_BANNER_PATH);
        debug!(url = %url, "GET legacy banner");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::network(LEGACY_BANNER_PATH, e))?;
        let response = Self::check_response(LEGACY_BANNER_PATH, response).await?;

        match Self::read_json(LEGACY_BANNER_PATH, response).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Self::decode(LEGACY_BANNER_PATH, value).map(Some),
        }
    }

    pub async fn put_banner(&self, banner: &Banner) -> Result<Banner, ApiError> {
        let url = self.collection_url(LEGACY_BANNER_PATH);
        let body = Self::encode(banner)?;
        debug!(url = %url, "PUT legacy banner");

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::network(LEGACY_BANNER_PATH, e))?;
        let response = Self::check_response(LEGACY_BANNER_PATH, response).await?;

        match Self::read_json(LEGACY_BANNER_PATH, response).await? {
            Some(value) if value.is_object() => Self::decode(LEGACY_BANNER_PATH, value),
            _ => Ok(banner.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::with_client(Client::new(), "http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.record_url(Resource::Offers.path(), "42"),
            "http://localhost:3000/offers/42"
        );
    }

    #[test]
    fn test_with_fallback_id_keeps_server_id() {
        let sent = json!({"id": "client-id", "title": "Summer Sale"});
        let returned = ApiClient::with_fallback_id(json!({"id": "7", "title": "Summer Sale"}), &sent);
        assert_eq!(returned["id"], "7");

        let returned = ApiClient::with_fallback_id(json!({"title": "Summer Sale"}), &sent);
        assert_eq!(returned["id"], "client-id");
    }
}
