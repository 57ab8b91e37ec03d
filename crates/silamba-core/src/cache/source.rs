use std::future::Future;

use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::models::Resource;

/// Backing store the query cache reads from and mutates through.
///
/// `ApiClient` is the production implementation; tests substitute
/// in-memory sources to observe request counts.
pub trait CollectionSource: Send + Sync + 'static {
    fn list(&self, resource: Resource) -> impl Future<Output = Result<Vec<Value>, ApiError>> + Send;

    fn create(
        &self,
        resource: Resource,
        record: Value,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn update(
        &self,
        resource: Resource,
        id: &str,
        record: Value,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn delete(&self, resource: Resource, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CollectionSource for ApiClient {
    async fn list(&self, resource: Resource) -> Result<Vec<Value>, ApiError> {
        self.list_raw(resource).await
    }

    async fn create(&self, resource: Resource, record: Value) -> Result<Value, ApiError> {
        self.create_raw(resource, record).await
    }

    async fn update(&self, resource: Resource, id: &str, record: Value) -> Result<Value, ApiError> {
        self.update_raw(resource, id, record).await
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        self.delete_raw(resource, id).await
    }
}
