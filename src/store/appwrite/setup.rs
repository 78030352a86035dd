//! Appwrite provisioning: database, collections, attributes and unique indexes.
//!
//! Every step checks for an existing resource first, so running setup twice is
//! harmless.

use super::{AppwriteStore, json_or_error, transport_error};
use crate::store::{Collection, StoreError};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::time::{Duration, sleep};
use tracing::{debug, info, instrument};

/// Attributes must report `available` before indexes can reference them.
const ATTRIBUTE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const ATTRIBUTE_POLL_ATTEMPTS: u32 = 60;

struct AttributeSpec {
    key: &'static str,
    size: u32,
    /// Allowed values; a non-empty list makes this an enum attribute.
    elements: &'static [&'static str],
}

impl AttributeSpec {
    const fn string(key: &'static str, size: u32) -> Self {
        Self {
            key,
            size,
            elements: &[],
        }
    }

    /// Attribute endpoint suffix and request body.
    fn request(&self) -> (&'static str, Value) {
        if self.elements.is_empty() {
            (
                "string",
                json!({"key": self.key, "size": self.size, "required": true}),
            )
        } else {
            (
                "enum",
                json!({"key": self.key, "elements": self.elements, "required": true}),
            )
        }
    }
}

struct IndexSpec {
    key: &'static str,
    attributes: &'static [&'static str],
}

struct CollectionSpec {
    collection: Collection,
    name: &'static str,
    attributes: &'static [AttributeSpec],
    indexes: &'static [IndexSpec],
}

const USERS: CollectionSpec = CollectionSpec {
    collection: Collection::Users,
    name: "Users",
    attributes: &[
        AttributeSpec::string("name", 255),
        AttributeSpec::string("roll", 50),
        AttributeSpec::string("pass", 255),
        AttributeSpec::string("username", 255),
        AttributeSpec::string("phone", 20),
    ],
    indexes: &[
        IndexSpec {
            key: "idx_roll",
            attributes: &["roll"],
        },
        IndexSpec {
            key: "idx_username",
            attributes: &["username"],
        },
    ],
};

const ADMINS: CollectionSpec = CollectionSpec {
    collection: Collection::Admins,
    name: "Admins",
    attributes: &[
        AttributeSpec::string("username", 255),
        AttributeSpec::string("pass", 255),
        AttributeSpec::string("name", 255),
        AttributeSpec {
            key: "role",
            size: 50,
            elements: &["admin", "mentor"],
        },
    ],
    indexes: &[IndexSpec {
        key: "idx_admin_username",
        attributes: &["username"],
    }],
};

impl AppwriteStore {
    /// `GET` a resource; `Ok(None)` when it does not exist.
    async fn fetch(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        json_or_error(response).await.map(Some)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, StoreError> {
        let response = self
            .request(Method::POST, path)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        json_or_error(response).await
    }

    async fn ensure_database(&self) -> Result<(), StoreError> {
        let database_id = &self.config.database_id;
        let path = format!("/databases/{database_id}");

        if self.fetch(&path).await?.is_some() {
            info!("Database \"{database_id}\" already exists");
            return Ok(());
        }

        self.post(
            "/databases",
            &json!({"databaseId": database_id, "name": database_id}),
        )
        .await?;
        info!("Created database {database_id}");

        Ok(())
    }

    #[instrument(skip(self, spec), fields(collection = spec.name))]
    async fn ensure_collection(&self, spec: &CollectionSpec) -> Result<(), StoreError> {
        let database_id = &self.config.database_id;
        let collection_id = self.collection_id(spec.collection).to_string();
        let base = format!("/databases/{database_id}/collections");
        let path = format!("{base}/{collection_id}");

        if self.fetch(&path).await?.is_some() {
            debug!("collection {collection_id} already exists");
        } else {
            // The API key bypasses document permissions, so none are granted.
            self.post(
                &base,
                &json!({
                    "collectionId": collection_id,
                    "name": spec.name,
                    "permissions": [],
                }),
            )
            .await?;
            info!("Created collection {collection_id}");
        }

        let existing = self
            .fetch(&format!("{path}/attributes"))
            .await?
            .unwrap_or(Value::Null);
        let existing_keys = keys(&existing, "attributes");

        for attribute in spec.attributes {
            if existing_keys.iter().any(|key| key == attribute.key) {
                debug!("attribute {} already exists", attribute.key);
                continue;
            }

            let (kind, body) = attribute.request();
            self.post(&format!("{path}/attributes/{kind}"), &body).await?;
            info!("Created attribute {}", attribute.key);

            self.wait_for_attribute(&path, attribute.key).await?;
        }

        let existing = self
            .fetch(&format!("{path}/indexes"))
            .await?
            .unwrap_or(Value::Null);
        let existing_keys = keys(&existing, "indexes");

        for index in spec.indexes {
            if existing_keys.iter().any(|key| key == index.key) {
                debug!("index {} already exists", index.key);
                continue;
            }

            self.post(
                &format!("{path}/indexes"),
                &json!({
                    "key": index.key,
                    "type": "unique",
                    "attributes": index.attributes,
                }),
            )
            .await?;
            info!("Created unique index {}", index.key);
        }

        Ok(())
    }

    async fn wait_for_attribute(&self, collection_path: &str, key: &str) -> Result<(), StoreError> {
        let path = format!("{collection_path}/attributes/{key}");

        for attempt in 1..=ATTRIBUTE_POLL_ATTEMPTS {
            // Transient lookup failures are retried like a pending status.
            if let Ok(Some(attribute)) = self.fetch(&path).await {
                if attribute["status"].as_str() == Some("available") {
                    return Ok(());
                }
            }

            debug!("attribute {key} not available yet (attempt {attempt})");
            sleep(ATTRIBUTE_POLL_INTERVAL).await;
        }

        Err(StoreError::Unavailable(format!(
            "attribute {key} did not become available"
        )))
    }
}

/// Collect the `key` of every entry in `body[list]`.
fn keys(body: &Value, list: &str) -> Vec<String> {
    body[list]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry["key"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Provision everything the credential store needs.
pub(super) async fn provision(store: &AppwriteStore) -> Result<(), StoreError> {
    store.ensure_database().await?;
    for spec in [&USERS, &ADMINS] {
        store.ensure_collection(spec).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AdminRole;

    #[test]
    fn keys_reads_listing() {
        let body = json!({
            "total": 2,
            "attributes": [{"key": "name", "status": "available"}, {"key": "roll"}],
        });
        assert_eq!(keys(&body, "attributes"), vec!["name", "roll"]);
        assert!(keys(&body, "indexes").is_empty());
        assert!(keys(&Value::Null, "attributes").is_empty());
    }

    #[test]
    fn admin_role_is_an_enum_attribute() -> anyhow::Result<()> {
        let role = ADMINS
            .attributes
            .iter()
            .find(|attribute| attribute.key == "role")
            .map(AttributeSpec::request)
            .ok_or_else(|| anyhow::anyhow!("admins collection has no role attribute"))?;
        let (kind, body) = role;
        assert_eq!(kind, "enum");
        let roles: Vec<AdminRole> = serde_json::from_value(body["elements"].clone())?;
        assert_eq!(roles, vec![AdminRole::Admin, AdminRole::Mentor]);

        let (kind, body) = USERS.attributes[0].request();
        assert_eq!(kind, "string");
        assert_eq!(body["size"], 255);
        Ok(())
    }

    #[test]
    fn specs_cover_schema_fields() {
        for spec in [&USERS, &ADMINS] {
            let declared: Vec<&str> = spec.attributes.iter().map(|a| a.key).collect();
            for field in spec.collection.fields() {
                assert!(declared.contains(&field.as_str()));
            }
            for field in spec.collection.unique_fields() {
                assert!(
                    spec.indexes
                        .iter()
                        .any(|index| index.attributes == [field.as_str()])
                );
            }
        }
    }
}
