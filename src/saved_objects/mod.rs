//! Generic saved-objects persistence keyed by `(type, id)`.
//!
//! Attributes are free-form JSON objects. `update` is a partial merge: keys
//! present in the supplied attributes overwrite, everything else is kept.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

/// Attribute bag stored on every saved object
pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    pub attributes: Attributes,
    pub version: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct FindOptions {
    pub object_type: String,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    /// Attribute name to sort by (ascending). Ties and missing values fall back to id order.
    pub sort_field: Option<String>,
}

impl FindOptions {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            page: 1,
            per_page: 20,
            sort_field: None,
        }
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.per_page
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindResponse {
    pub saved_objects: Vec<SavedObject>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Saved object [{object_type}/{id}] not found")]
    NotFound { object_type: String, id: String },

    #[error("Saved object [{object_type}/{id}] conflict")]
    Conflict { object_type: String, id: String },

    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt saved object: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn not_found(object_type: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            object_type: object_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(object_type: &str, id: &str) -> Self {
        RepositoryError::Conflict {
            object_type: object_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict { .. })
    }
}

#[async_trait]
pub trait SavedObjectsRepository: Send + Sync {
    async fn get(&self, object_type: &str, id: &str) -> Result<SavedObject, RepositoryError>;

    async fn find(&self, options: FindOptions) -> Result<FindResponse, RepositoryError>;

    /// Create an object. Without `overwrite` an existing `(type, id)` is a conflict.
    async fn create(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
        overwrite: bool,
    ) -> Result<SavedObject, RepositoryError>;

    /// Merge `attributes` into an existing object and return the stored result.
    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
    ) -> Result<SavedObject, RepositoryError>;

    async fn delete(&self, object_type: &str, id: &str) -> Result<(), RepositoryError>;

    async fn health_check(&self) -> Result<(), RepositoryError>;
}
