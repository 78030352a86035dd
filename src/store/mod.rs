//! Credential store adapters.
//!
//! The service only needs two primitives from its store: list the documents of
//! a collection that match a set of equality predicates, and insert one
//! document under a freshly generated id. Everything else (uniqueness, ids,
//! durability) is delegated to the backend.

mod appwrite;
mod memory;
mod postgres;
pub mod records;
pub mod seed;
#[cfg(test)]
pub(crate) mod testing;

pub use appwrite::{AppwriteConfig, AppwriteStore};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use records::{AdminRecord, AdminRole, NewAdmin, NewUser, UserRecord};

use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Field map of a stored document, without its id.
pub type Data = Map<String, Value>;

/// Key under which documents expose their server-generated id.
pub const ID_KEY: &str = "$id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Admins,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Admins => "admins",
        }
    }

    /// Every attribute a document of this collection carries, in schema order.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::Users => &[
                Field::Name,
                Field::Roll,
                Field::Pass,
                Field::Username,
                Field::Phone,
            ],
            Self::Admins => &[Field::Username, Field::Pass, Field::Name, Field::Role],
        }
    }

    #[must_use]
    pub const fn unique_fields(self) -> &'static [Field] {
        match self {
            Self::Users => &[Field::Roll, Field::Username],
            Self::Admins => &[Field::Username],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Roll,
    Pass,
    Username,
    Phone,
    Role,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Roll => "roll",
            Self::Pass => "pass",
            Self::Username => "username",
            Self::Phone => "phone",
            Self::Role => "role",
        }
    }
}

/// Equality predicate: `field == value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Equal {
    pub field: Field,
    pub value: String,
}

impl Equal {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Data,
}

impl Document {
    /// Deserialize the document into a record type, exposing the id as `$id`.
    ///
    /// # Errors
    /// Returns [`StoreError::Record`] naming the document if the fields do not
    /// match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        data.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(data)).map_err(|source| {
            warn!(document = %self.id, "stored document does not decode: {source}");
            StoreError::Record {
                id: self.id.clone(),
                source,
            }
        })
    }

    /// String value of `field`, if present.
    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        self.data.get(field.as_str()).and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by a uniqueness constraint.
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid document: {0}")]
    Invalid(String),
    #[error("failed to decode document")]
    Decode(#[from] serde_json::Error),
    /// A stored document does not fit its record type.
    #[error("document {id} does not match its record: {source}")]
    Record {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Short backend name used in logs and `/health`.
    fn backend(&self) -> &'static str;

    /// List documents of `collection` matching every predicate in `filters`.
    async fn list(
        &self,
        collection: Collection,
        filters: &[Equal],
    ) -> Result<DocumentList, StoreError>;

    /// Insert one document; the backend generates its id.
    async fn create(&self, collection: Collection, data: Data) -> Result<Document, StoreError>;

    /// Cheap round trip to check the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Provision collections, attributes and unique indexes. Idempotent.
    async fn setup(&self) -> Result<(), StoreError>;
}

/// Backend selected by the scheme of `--store-url`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreTarget {
    Appwrite(String),
    Postgres(String),
    Memory,
}

impl StoreTarget {
    /// Parse a store URL.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed or the scheme is unsupported.
    pub fn parse(store_url: &str) -> Result<Self> {
        let url = Url::parse(store_url).with_context(|| format!("Invalid store URL: {store_url}"))?;

        match url.scheme() {
            "http" | "https" => Ok(Self::Appwrite(
                store_url.trim_end_matches('/').to_string(),
            )),
            "postgres" | "postgresql" => Ok(Self::Postgres(store_url.to_string())),
            "memory" => Ok(Self::Memory),
            scheme => Err(anyhow!("Unsupported store URL scheme: {scheme}")),
        }
    }
}

/// Build the store selected by the global arguments.
///
/// # Errors
/// Returns an error if the URL is invalid, Appwrite credentials are missing, or
/// the database cannot be reached.
pub async fn connect(globals: &GlobalArgs) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match StoreTarget::parse(&globals.store_url)? {
        StoreTarget::Appwrite(endpoint) => {
            let config = AppwriteConfig::from_globals(endpoint, globals)?;
            Arc::new(AppwriteStore::new(config)?)
        }
        StoreTarget::Postgres(dsn) => Arc::new(
            PostgresStore::connect(&dsn)
                .await
                .context("Failed to connect to database")?,
        ),
        StoreTarget::Memory => Arc::new(MemoryStore::default()),
    };

    info!("Using {} credential store", store.backend());

    Ok(store)
}
