//! `PostgreSQL` backend.
//!
//! Collections map to tables of the same name (see `sql/schema.sql`), and
//! document attributes map to text columns. Unique indexes back the roll and
//! username constraints.

use super::{Collection, Data, Document, DocumentList, DocumentStore, Equal, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    Connection, PgPool, Postgres, QueryBuilder, Row,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a connection pool.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the database cannot be reached.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .map_err(map_error)?;

        Ok(Self::from_pool(pool))
    }

    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLSTATE 23505: `unique_violation`.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn map_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

fn check_filters(collection: Collection, filters: &[Equal]) -> Result<(), StoreError> {
    match filters
        .iter()
        .find(|filter| !collection.fields().contains(&filter.field))
    {
        Some(filter) => Err(StoreError::Invalid(format!(
            "{} has no attribute {}",
            collection.as_str(),
            filter.field.as_str()
        ))),
        None => Ok(()),
    }
}

fn select_query(collection: Collection, filters: &[Equal]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id");
    for field in collection.fields() {
        builder.push(", ").push(field.as_str());
    }
    builder.push(" FROM ").push(collection.as_str());

    for (index, filter) in filters.iter().enumerate() {
        builder
            .push(if index == 0 { " WHERE " } else { " AND " })
            .push(filter.field.as_str())
            .push(" = ")
            .push_bind(filter.value.clone());
    }

    builder.push(" ORDER BY created_at, id");
    builder
}

fn insert_query(
    collection: Collection,
    id: &str,
    data: &Data,
) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(collection.as_str()).push(" (id");
    for field in collection.fields() {
        builder.push(", ").push(field.as_str());
    }
    builder.push(") VALUES (");

    let mut values = builder.separated(", ");
    values.push_bind(id.to_string());
    for field in collection.fields() {
        let value = data
            .get(field.as_str())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                StoreError::Invalid(format!(
                    "{} requires attribute {}",
                    collection.as_str(),
                    field.as_str()
                ))
            })?;
        values.push_bind(value.to_string());
    }
    values.push_unseparated(")");

    Ok(builder)
}

fn document_from_row(collection: Collection, row: &PgRow) -> Result<Document, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let mut data = Data::new();
    for field in collection.fields() {
        let value: String = row.try_get(field.as_str())?;
        data.insert(field.as_str().to_string(), Value::String(value));
    }
    Ok(Document { id, data })
}

/// Split a schema file into individual statements.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgresql"
    }

    async fn list(
        &self,
        collection: Collection,
        filters: &[Equal],
    ) -> Result<DocumentList, StoreError> {
        check_filters(collection, filters)?;

        let mut query = select_query(collection, filters);
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.sql()
        );
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .map_err(map_error)?;

        let documents = rows
            .iter()
            .map(|row| document_from_row(collection, row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_error)?;

        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn create(&self, collection: Collection, data: Data) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let mut query = insert_query(collection, &id, &data)?;
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.sql()
        );
        query
            .build()
            .execute(&self.pool)
            .instrument(span)
            .await
            .map_err(map_error)?;

        debug!("created {} row {}", collection.as_str(), id);

        let data = collection
            .fields()
            .iter()
            .filter_map(|field| {
                data.get(field.as_str())
                    .map(|value| (field.as_str().to_string(), value.clone()))
            })
            .collect();

        Ok(Document { id, data })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .map_err(map_error)?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await.map_err(map_error)
    }

    async fn setup(&self) -> Result<(), StoreError> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|err| {
                    StoreError::Unavailable(format!(
                        "schema statement {} failed: {err}",
                        index + 1
                    ))
                })?;
        }
        Ok(())
    }
}
