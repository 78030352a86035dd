//! Appwrite backend (hosted document database, REST API).
//!
//! Requests authenticate with a server API key (`X-Appwrite-Key`) scoped to
//! one project. Equality predicates are sent as JSON-encoded `queries[]`
//! parameters and ids are generated server side with `unique()`.

mod setup;

use super::{Collection, Data, Document, DocumentList, DocumentStore, Equal, ID_KEY, StoreError};
use crate::{APP_USER_AGENT, cli::globals::GlobalArgs};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};

#[derive(Clone, Debug)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: SecretString,
    pub database_id: String,
    pub users_collection: String,
    pub admins_collection: String,
}

impl AppwriteConfig {
    /// Build the configuration from the endpoint and the global arguments.
    ///
    /// # Errors
    /// Returns an error if the project id, API key or database id is missing.
    pub fn from_globals(endpoint: String, globals: &GlobalArgs) -> Result<Self> {
        let project_id = globals
            .appwrite_project_id
            .clone()
            .ok_or_else(|| anyhow!("missing required argument: --appwrite-project-id"))?;
        let api_key = globals
            .appwrite_api_key
            .clone()
            .ok_or_else(|| anyhow!("missing required argument: --appwrite-api-key"))?;
        let database_id = globals
            .appwrite_database_id
            .clone()
            .ok_or_else(|| anyhow!("missing required argument: --appwrite-database-id"))?;

        Ok(Self {
            endpoint,
            project_id,
            api_key,
            database_id,
            users_collection: globals.users_collection.clone(),
            admins_collection: globals.admins_collection.clone(),
        })
    }
}

#[derive(Debug)]
pub struct AppwriteStore {
    config: AppwriteConfig,
    client: Client,
}

impl AppwriteStore {
    /// Build the HTTP client.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the client cannot be built.
    pub fn new(config: AppwriteConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Error creating reqwest client: {e}")))?;

        Ok(Self { config, client })
    }

    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Users => &self.config.users_collection,
            Collection::Admins => &self.config.admins_collection,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn documents_path(&self, collection: Collection) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.config.database_id,
            self.collection_id(collection)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", self.config.api_key.expose_secret())
    }
}

/// Encode an equality predicate in the JSON query syntax.
fn equal_query(filter: &Equal) -> String {
    json!({
        "method": "equal",
        "attribute": filter.field.as_str(),
        "values": [filter.value],
    })
    .to_string()
}

/// Map a failed Appwrite response to a store error.
///
/// Unique index violations come back as `409`; older servers only say so in the
/// message text.
fn error_from_response(status: StatusCode, body: &Value) -> StoreError {
    let message = body["message"].as_str().unwrap_or_default();

    if status == StatusCode::CONFLICT || message.to_lowercase().contains("unique") {
        StoreError::Conflict(message.to_string())
    } else {
        StoreError::Unavailable(format!("{status} - {message}"))
    }
}

/// Decode a successful response body, or map a failed one to a store error.
///
/// A 2xx answer that is not JSON (a proxy page, a truncated body) is a store
/// failure, never an empty result.
async fn json_or_error(response: Response) -> Result<Value, StoreError> {
    let status = response.status();

    if status.is_success() {
        response.json().await.map_err(|e| {
            StoreError::Unavailable(format!("{status} with undecodable body: {e}"))
        })
    } else {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(error_from_response(status, &body))
    }
}

fn transport_error(err: &reqwest::Error) -> StoreError {
    StoreError::Unavailable(format!("request failed: {err}"))
}

/// Split an Appwrite document into its id and attributes, dropping the
/// `$`-prefixed system fields.
fn document_from_json(value: Value) -> Result<Document, StoreError> {
    let Value::Object(mut map) = value else {
        return Err(StoreError::Invalid("document is not an object".to_string()));
    };
    let id = match map.remove(ID_KEY) {
        Some(Value::String(id)) => id,
        _ => return Err(StoreError::Invalid("document without $id".to_string())),
    };
    let data: Data = map.into_iter().filter(|(key, _)| !key.starts_with('$')).collect();

    Ok(Document { id, data })
}

fn document_list_from_json(mut body: Value) -> Result<DocumentList, StoreError> {
    let total = body["total"]
        .as_u64()
        .ok_or_else(|| StoreError::Invalid("document list without total".to_string()))?;
    let documents = match body.get_mut("documents").map(Value::take) {
        Some(Value::Array(documents)) => documents
            .into_iter()
            .map(document_from_json)
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(StoreError::Invalid(
                "documents is not an array".to_string(),
            ));
        }
    };

    Ok(DocumentList { total, documents })
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    fn backend(&self) -> &'static str {
        "appwrite"
    }

    async fn list(
        &self,
        collection: Collection,
        filters: &[Equal],
    ) -> Result<DocumentList, StoreError> {
        let queries: Vec<(&str, String)> = filters
            .iter()
            .map(|filter| ("queries[]", equal_query(filter)))
            .collect();
        let span = info_span!(
            "db.query",
            db.system = "appwrite",
            db.operation = "listDocuments",
            db.collection = collection.as_str()
        );
        let response = self
            .request(Method::GET, &self.documents_path(collection))
            .query(&queries)
            .send()
            .instrument(span)
            .await
            .map_err(|e| transport_error(&e))?;

        document_list_from_json(json_or_error(response).await?)
    }

    async fn create(&self, collection: Collection, data: Data) -> Result<Document, StoreError> {
        let span = info_span!(
            "db.query",
            db.system = "appwrite",
            db.operation = "createDocument",
            db.collection = collection.as_str()
        );
        let response = self
            .request(Method::POST, &self.documents_path(collection))
            .json(&json!({
                "documentId": "unique()",
                "data": data,
            }))
            .send()
            .instrument(span)
            .await
            .map_err(|e| transport_error(&e))?;

        let document = document_from_json(json_or_error(response).await?)?;
        debug!("created {} document {}", collection.as_str(), document.id);

        Ok(document)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let path = format!("/databases/{}", self.config.database_id);
        let response = self
            .request(Method::GET, &path)
            .send()
            .instrument(info_span!("db.ping", db.system = "appwrite"))
            .await
            .map_err(|e| transport_error(&e))?;

        json_or_error(response).await.map(|_| ())
    }

    async fn setup(&self) -> Result<(), StoreError> {
        setup::provision(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Field;

    fn store() -> Result<AppwriteStore, StoreError> {
        AppwriteStore::new(AppwriteConfig {
            endpoint: "https://cloud.appwrite.io/v1/".to_string(),
            project_id: "project".to_string(),
            api_key: SecretString::from("secret-key".to_string()),
            database_id: "examify".to_string(),
            users_collection: "students".to_string(),
            admins_collection: "staff".to_string(),
        })
    }

    #[test]
    fn equal_query_uses_json_syntax() -> Result<(), serde_json::Error> {
        let query: Value = serde_json::from_str(&equal_query(&Equal::new(Field::Roll, "2024001")))?;
        assert_eq!(
            query,
            json!({"method": "equal", "attribute": "roll", "values": ["2024001"]})
        );
        Ok(())
    }

    #[test]
    fn documents_path_uses_configured_collections() -> Result<(), StoreError> {
        let store = store()?;
        assert_eq!(
            store.url(&store.documents_path(Collection::Users)),
            "https://cloud.appwrite.io/v1/databases/examify/collections/students/documents"
        );
        assert_eq!(
            store.documents_path(Collection::Admins),
            "/databases/examify/collections/staff/documents"
        );
        Ok(())
    }

    #[test]
    fn conflicts_are_typed() {
        let err = error_from_response(
            StatusCode::CONFLICT,
            &json!({"message": "Document with the requested ID already exists."}),
        );
        assert!(err.is_conflict());

        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            &json!({"message": "Attribute roll violates unique index"}),
        );
        assert!(err.is_conflict());

        let err = error_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({"message": "Server Error"}),
        );
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn document_list_drops_system_fields() -> Result<(), StoreError> {
        let list = document_list_from_json(json!({
            "total": 1,
            "documents": [{
                "$id": "doc1",
                "$collectionId": "students",
                "$createdAt": "2024-01-01T00:00:00.000+00:00",
                "name": "Karim",
                "roll": "2024001",
            }],
        }))?;
        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "doc1");
        assert_eq!(list.documents[0].data.len(), 2);
        assert_eq!(list.documents[0].text(Field::Roll), Some("2024001"));
        Ok(())
    }

    #[test]
    fn document_list_requires_total_and_documents() {
        for body in [
            Value::Null,
            json!({"documents": []}),
            json!({"total": 0}),
            json!({"total": 0, "documents": null}),
            json!({"total": "1", "documents": []}),
        ] {
            assert!(
                matches!(document_list_from_json(body.clone()), Err(StoreError::Invalid(_))),
                "{body} should be rejected"
            );
        }
    }

    /// Serve `body` with `status` for every request, returning the endpoint.
    async fn fake_appwrite(
        status: axum::http::StatusCode,
        body: &'static str,
    ) -> anyhow::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = axum::Router::new().fallback(move || async move { (status, body) });
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}/v1"))
    }

    fn store_at(endpoint: String) -> Result<AppwriteStore, StoreError> {
        AppwriteStore::new(AppwriteConfig {
            endpoint,
            project_id: "project".to_string(),
            api_key: SecretString::from("secret-key".to_string()),
            database_id: "examify".to_string(),
            users_collection: "users".to_string(),
            admins_collection: "admins".to_string(),
        })
    }

    #[tokio::test]
    async fn html_success_body_is_a_store_failure() -> anyhow::Result<()> {
        let endpoint =
            fake_appwrite(axum::http::StatusCode::OK, "<html>maintenance</html>").await?;
        let store = store_at(endpoint)?;

        let result = store.list(Collection::Users, &[]).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        let result = store.create(Collection::Users, Data::new()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        let result =
            crate::api::handlers::auth::credentials::login(&store, "2024001", "password123").await;
        assert!(matches!(
            result,
            Err(crate::api::handlers::auth::AuthError::Store(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn error_body_that_is_not_json_still_maps_status() -> anyhow::Result<()> {
        let endpoint = fake_appwrite(axum::http::StatusCode::CONFLICT, "duplicate").await?;
        let store = store_at(endpoint)?;

        let result = store.create(Collection::Users, Data::new()).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        Ok(())
    }

    #[test]
    fn document_without_id_is_invalid() {
        let result = document_from_json(json!({"name": "Karim"}));
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }

    #[test]
    fn config_requires_credentials() {
        let mut globals = GlobalArgs::new("https://cloud.appwrite.io/v1".to_string());
        let result = AppwriteConfig::from_globals("https://cloud.appwrite.io/v1".to_string(), &globals);
        assert!(result.is_err());

        globals.appwrite_project_id = Some("project".to_string());
        globals.appwrite_api_key = Some(SecretString::from("key".to_string()));
        globals.appwrite_database_id = Some("examify".to_string());
        let result = AppwriteConfig::from_globals("https://cloud.appwrite.io/v1".to_string(), &globals);
        assert!(result.is_ok());
    }
}
