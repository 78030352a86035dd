//! Typed views over stored documents.

use super::{Data, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub roll: String,
    pub pass: String,
    /// Email address; the store calls it `username`.
    pub username: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub name: String,
    pub roll: String,
    pub pass: String,
    pub username: String,
    pub phone: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Admin,
    Mentor,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AdminRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub username: String,
    pub pass: String,
    pub name: String,
    pub role: AdminRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAdmin {
    pub username: String,
    pub pass: String,
    pub name: String,
    pub role: AdminRole,
}

/// Serialize a new record into the field map handed to the store.
///
/// # Errors
/// Returns an error if `value` does not serialize to a JSON object.
pub fn to_data<T: Serialize>(value: &T) -> Result<Data, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Invalid(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_admin_serializes_role_lowercase() -> Result<(), StoreError> {
        let data = to_data(&NewAdmin {
            username: "mentor1".to_string(),
            pass: "password123".to_string(),
            name: "Mentor".to_string(),
            role: AdminRole::Mentor,
        })?;
        assert_eq!(data.get("role").and_then(Value::as_str), Some("mentor"));
        assert!(!data.contains_key("$id"));
        Ok(())
    }

    #[test]
    fn to_data_rejects_non_objects() {
        assert!(matches!(to_data(&"plain"), Err(StoreError::Invalid(_))));
    }
}
