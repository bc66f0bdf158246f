use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use super::{Attributes, FindOptions, FindResponse, RepositoryError, SavedObject, SavedObjectsRepository};

type Key = (String, String);

/// Process-local repository, used by development deployments and tests
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    objects: RwLock<HashMap<Key, SavedObject>>,
    version_counter: AtomicU64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing objects, keeping their ids
    pub fn with_objects(objects: impl IntoIterator<Item = SavedObject>) -> Self {
        let mut map = HashMap::new();
        let mut version = 0u64;
        for mut object in objects {
            version += 1;
            object.version = Some(version.to_string());
            map.insert((object.object_type.clone(), object.id.clone()), object);
        }

        Self {
            objects: RwLock::new(map),
            version_counter: AtomicU64::new(version),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn next_version(&self) -> String {
        (self.version_counter.fetch_add(1, AtomicOrdering::SeqCst) + 1).to_string()
    }
}

fn compare_by_field(a: &SavedObject, b: &SavedObject, field: Option<&str>) -> Ordering {
    let by_field = match field {
        Some(field) => {
            let left = a.attributes.get(field).and_then(Value::as_str);
            let right = b.attributes.get(field).and_then(Value::as_str);
            match (left, right) {
                (Some(l), Some(r)) => l.cmp(r),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
        None => Ordering::Equal,
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl SavedObjectsRepository for InMemoryRepository {
    async fn get(&self, object_type: &str, id: &str) -> Result<SavedObject, RepositoryError> {
        let objects = self.objects.read().await;
        objects
            .get(&(object_type.to_string(), id.to_string()))
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(object_type, id))
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, RepositoryError> {
        let objects = self.objects.read().await;
        let mut matching: Vec<SavedObject> = objects
            .values()
            .filter(|o| o.object_type == options.object_type)
            .cloned()
            .collect();
        drop(objects);

        matching.sort_by(|a, b| compare_by_field(a, b, options.sort_field.as_deref()));

        let total = matching.len();
        let saved_objects = matching
            .into_iter()
            .skip(options.offset())
            .take(options.per_page)
            .collect();

        Ok(FindResponse {
            saved_objects,
            total,
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
        let key = (object_type.to_string(), id.to_string());
        let mut objects = self.objects.write().await;

        if !overwrite && objects.contains_key(&key) {
            return Err(RepositoryError::conflict(object_type, id));
        }

        let object = SavedObject {
            object_type: object_type.to_string(),
            id: id.to_string(),
            attributes,
            version: Some(self.next_version()),
            updated_at: Some(Utc::now()),
        };
        objects.insert(key, object.clone());
        Ok(object)
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
    ) -> Result<SavedObject, RepositoryError> {
        let mut objects = self.objects.write().await;
        let object = objects
            .get_mut(&(object_type.to_string(), id.to_string()))
            .ok_or_else(|| RepositoryError::not_found(object_type, id))?;

        object.attributes.extend(attributes);
        object.version = Some(self.next_version());
        object.updated_at = Some(Utc::now());
        Ok(object.clone())
    }

    async fn delete(&self, object_type: &str, id: &str) -> Result<(), RepositoryError> {
        let mut objects = self.objects.write().await;
        objects
            .remove(&(object_type.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found(object_type, id))
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn object(object_type: &str, id: &str, attributes: Value) -> SavedObject {
        SavedObject {
            object_type: object_type.to_string(),
            id: id.to_string(),
            attributes: attrs(attributes),
            version: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn update_merges_and_keeps_untouched_attributes() {
        let repo = InMemoryRepository::with_objects(vec![object(
            "space",
            "a-space",
            json!({ "name": "A", "color": "#aabbcc", "description": "old" }),
        )]);

        let updated = repo
            .update("space", "a-space", attrs(json!({ "name": "B", "description": "" })))
            .await
            .unwrap();

        assert_eq!(updated.attributes["name"], json!("B"));
        assert_eq!(updated.attributes["description"], json!(""));
        assert_eq!(updated.attributes["color"], json!("#aabbcc"));
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn update_never_creates() {
        let repo = InMemoryRepository::new();
        let err = repo
            .update("space", "missing", attrs(json!({ "name": "x" })))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn create_conflicts_unless_overwrite() {
        let repo = InMemoryRepository::new();
        repo.create("space", "s", attrs(json!({ "name": "one" })), false).await.unwrap();

        let err = repo
            .create("space", "s", attrs(json!({ "name": "two" })), false)
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let replaced = repo
            .create("space", "s", attrs(json!({ "name": "two" })), true)
            .await
            .unwrap();
        assert_eq!(replaced.attributes["name"], json!("two"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn versions_advance_on_every_write() {
        let repo = InMemoryRepository::new();
        let created = repo.create("space", "s", attrs(json!({})), false).await.unwrap();
        let updated = repo.update("space", "s", attrs(json!({ "name": "n" }))).await.unwrap();
        assert_ne!(created.version, updated.version);
    }

    #[tokio::test]
    async fn find_filters_by_type_sorts_and_pages() {
        let repo = InMemoryRepository::with_objects(vec![
            object("space", "c", json!({ "name": "Charlie" })),
            object("space", "a", json!({ "name": "Alpha" })),
            object("space", "b", json!({ "name": "Bravo" })),
            object("dashboard", "d", json!({ "name": "Aardvark" })),
        ]);

        let first = repo
            .find(FindOptions::new("space").sort_by("name").per_page(2))
            .await
            .unwrap();
        assert_eq!(first.total, 3);
        let ids: Vec<_> = first.saved_objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let second = repo
            .find(FindOptions::new("space").sort_by("name").per_page(2).page(2))
            .await
            .unwrap();
        let ids: Vec<_> = second.saved_objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let repo = InMemoryRepository::with_objects(vec![object("space", "s", json!({}))]);
        repo.delete("space", "s").await.unwrap();
        assert!(repo.delete("space", "s").await.unwrap_err().is_not_found());
        assert!(repo.get("space", "s").await.unwrap_err().is_not_found());
    }
}
