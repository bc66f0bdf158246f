use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use std::time::Duration;
use tracing::info;

use super::{Attributes, FindOptions, FindResponse, RepositoryError, SavedObject, SavedObjectsRepository};
use crate::config::PersistenceConfig;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS saved_objects (
        type        TEXT        NOT NULL,
        id          TEXT        NOT NULL,
        attributes  JSONB       NOT NULL DEFAULT '{}'::jsonb,
        version     BIGINT      NOT NULL DEFAULT 1,
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (type, id)
    )
"#;

// Byte-wise ordering, independent of the database locale, to match the in-memory store
const FIND_SQL: &str = r#"
    SELECT type, id, attributes, version, updated_at
    FROM saved_objects
    WHERE type = $1
    ORDER BY (attributes ->> $2) COLLATE "C" ASC NULLS LAST, id COLLATE "C" ASC
    LIMIT $3 OFFSET $4
"#;

const RETURNING: &str = "RETURNING type, id, attributes, version, updated_at";

#[derive(Debug, FromRow)]
struct SavedObjectRow {
    #[sqlx(rename = "type")]
    object_type: String,
    id: String,
    attributes: Json<Value>,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SavedObjectRow> for SavedObject {
    type Error = RepositoryError;

    fn try_from(row: SavedObjectRow) -> Result<Self, Self::Error> {
        let attributes = match row.attributes.0 {
            Value::Object(map) => map,
            other => {
                return Err(RepositoryError::Corrupt(format!(
                    "attributes of {}/{} are not an object: {}",
                    row.object_type, row.id, other
                )))
            }
        };

        Ok(SavedObject {
            object_type: row.object_type,
            id: row.id,
            attributes,
            version: Some(row.version.to_string()),
            updated_at: Some(row.updated_at),
        })
    }
}

/// Saved objects stored in a single PostgreSQL table with JSONB attributes
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using persistence settings and make sure the table exists
    pub async fn connect(config: &PersistenceConfig) -> Result<Self, RepositoryError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| RepositoryError::Unavailable("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let repo = Self::new(pool);
        repo.migrate().await?;
        info!("Connected saved objects repository to PostgreSQL");
        Ok(repo)
    }

    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SavedObjectsRepository for PgRepository {
    async fn get(&self, object_type: &str, id: &str) -> Result<SavedObject, RepositoryError> {
        let row: Option<SavedObjectRow> = sqlx::query_as(
            "SELECT type, id, attributes, version, updated_at FROM saved_objects WHERE type = $1 AND id = $2",
        )
        .bind(object_type)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::not_found(object_type, id))?
            .try_into()
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_objects WHERE type = $1")
            .bind(&options.object_type)
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<SavedObjectRow> = sqlx::query_as(FIND_SQL)
        .bind(&options.object_type)
        .bind(options.sort_field.as_deref().unwrap_or("id"))
        .bind(options.per_page as i64)
        .bind(options.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let saved_objects = rows
            .into_iter()
            .map(SavedObject::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FindResponse {
            saved_objects,
            total: total.max(0) as usize,
            page: options.page,
            per_page: options.per_page,
        })
    }

    async fn create(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
        overwrite: bool,
    ) -> Result<SavedObject, RepositoryError> {
        let on_conflict = if overwrite {
            "ON CONFLICT (type, id) DO UPDATE SET attributes = EXCLUDED.attributes, \
             version = saved_objects.version + 1, updated_at = now()"
        } else {
            "ON CONFLICT (type, id) DO NOTHING"
        };
        let sql = format!(
            "INSERT INTO saved_objects (type, id, attributes) VALUES ($1, $2, $3) {} {}",
            on_conflict, RETURNING
        );

        let row: Option<SavedObjectRow> = sqlx::query_as(&sql)
            .bind(object_type)
            .bind(id)
            .bind(Json(Value::Object(attributes)))
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| RepositoryError::conflict(object_type, id))?
            .try_into()
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
    ) -> Result<SavedObject, RepositoryError> {
        // jsonb || jsonb replaces top-level keys and keeps the rest
        let sql = format!(
            "UPDATE saved_objects SET attributes = attributes || $3, version = version + 1, \
             updated_at = now() WHERE type = $1 AND id = $2 {}",
            RETURNING
        );

        let row: Option<SavedObjectRow> = sqlx::query_as(&sql)
            .bind(object_type)
            .bind(id)
            .bind(Json(Value::Object(attributes)))
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| RepositoryError::not_found(object_type, id))?
            .try_into()
    }

    async fn delete(&self, object_type: &str, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_objects WHERE type = $1 AND id = $2")
            .bind(object_type)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(object_type, id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
