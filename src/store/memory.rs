//! Process-local document store.
//!
//! Enforces the same unique fields as the hosted backends, checked and
//! written under a single write lock so concurrent inserts cannot both pass.

use super::{Collection, Data, Document, DocumentList, DocumentStore, Equal, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

fn matches(document: &Document, filters: &[Equal]) -> bool {
    filters
        .iter()
        .all(|filter| document.text(filter.field) == Some(filter.value.as_str()))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(
        &self,
        collection: Collection,
        filters: &[Equal],
    ) -> Result<DocumentList, StoreError> {
        let collections = self.collections.read().await;
        let documents: Vec<Document> = collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches(document, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn create(&self, collection: Collection, data: Data) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        for field in collection.unique_fields() {
            let Some(value) = data.get(field.as_str()).and_then(Value::as_str) else {
                continue;
            };
            if documents
                .iter()
                .any(|existing| existing.text(*field) == Some(value))
            {
                return Err(StoreError::Conflict(format!(
                    "{}.{} must be unique",
                    collection.as_str(),
                    field.as_str()
                )));
            }
        }

        let document = Document {
            id: Uuid::new_v4().simple().to_string(),
            data,
        };
        debug!("created {} document {}", collection.as_str(), document.id);
        documents.push(document.clone());

        Ok(document)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn setup(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
