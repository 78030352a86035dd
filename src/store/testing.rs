//! Test doubles.

use super::{Collection, Data, Document, DocumentList, DocumentStore, Equal, StoreError};
use async_trait::async_trait;

/// A store whose every call fails as if the backend were down.
#[derive(Debug, Default)]
pub struct UnavailableStore;

fn refused() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl DocumentStore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn list(&self, _: Collection, _: &[Equal]) -> Result<DocumentList, StoreError> {
        Err(refused())
    }

    async fn create(&self, _: Collection, _: Data) -> Result<Document, StoreError> {
        Err(refused())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(refused())
    }

    async fn setup(&self) -> Result<(), StoreError> {
        Err(refused())
    }
}
