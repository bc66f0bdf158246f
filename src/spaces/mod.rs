pub mod audit;
pub mod client;
pub mod error;
pub mod model;
pub mod schema;

use std::sync::Arc;
use tracing::info;

use crate::auth::AuthUser;
use crate::config::AppConfig;
use crate::saved_objects::{RepositoryError, SavedObjectsRepository};

pub use audit::SpacesAuditLogger;
pub use client::SpacesClient;
pub use error::SpacesError;
pub use model::{Space, DEFAULT_SPACE_ID, SPACE_TYPE};
pub use schema::{FieldErrors, SpacePayload};

/// Shared entry point for space operations; hands out per-caller clients
pub struct SpacesService {
    repository: Arc<dyn SavedObjectsRepository>,
    audit: SpacesAuditLogger,
    max_spaces: usize,
    rbac_enabled: bool,
}

impl SpacesService {
    pub fn new(repository: Arc<dyn SavedObjectsRepository>, config: &AppConfig) -> Self {
        Self {
            repository,
            audit: SpacesAuditLogger::new(config.security.enable_audit_logging),
            max_spaces: config.spaces.max_spaces,
            rbac_enabled: config.security.rbac_enabled,
        }
    }

    pub fn repository(&self) -> &Arc<dyn SavedObjectsRepository> {
        &self.repository
    }

    pub fn scoped_client(&self, user: Option<AuthUser>) -> SpacesClient {
        SpacesClient::new(
            self.repository.clone(),
            self.audit,
            self.max_spaces,
            self.rbac_enabled,
            user,
        )
    }

    /// Create the reserved default space if it doesn't exist yet. Returns true when created.
    pub async fn ensure_default_space(&self) -> Result<bool, SpacesError> {
        match self.repository.get(SPACE_TYPE, DEFAULT_SPACE_ID).await {
            Ok(_) => return Ok(false),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        match self
            .repository
            .create(SPACE_TYPE, DEFAULT_SPACE_ID, Space::default_space_attributes(), false)
            .await
        {
            Ok(_) => {
                info!("Created default space");
                Ok(true)
            }
            // another instance got there first
            Err(RepositoryError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PRIVILEGE_SPACE_MANAGE, PRIVILEGE_SPACE_READ};
    use crate::saved_objects::{InMemoryRepository, SavedObject};
    use serde_json::{json, Value};

    fn seeded_repository() -> Arc<InMemoryRepository> {
        let spaces = [
            ("a-space", json!({ "name": "a space", "color": "#aabbcc" })),
            ("b-space", json!({ "name": "b space" })),
            ("default", Value::Object(Space::default_space_attributes())),
        ];
        Arc::new(InMemoryRepository::with_objects(spaces.into_iter().map(|(id, attrs)| {
            SavedObject {
                object_type: SPACE_TYPE.to_string(),
                id: id.to_string(),
                attributes: attrs.as_object().cloned().unwrap(),
                version: None,
                updated_at: None,
            }
        })))
    }

    fn payload(value: Value) -> SpacePayload {
        serde_json::from_value(value).unwrap()
    }

    fn service_with(repo: Arc<InMemoryRepository>, config: &AppConfig) -> SpacesService {
        SpacesService::new(repo, config)
    }

    fn rbac_config() -> AppConfig {
        let mut config = AppConfig::development();
        config.security.rbac_enabled = true;
        config
    }

    fn user(privileges: &[&str]) -> Option<AuthUser> {
        Some(AuthUser {
            username: "elastic".to_string(),
            privileges: privileges.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn update_keeps_attributes_not_in_payload() {
        let repo = seeded_repository();
        let service = service_with(repo.clone(), &AppConfig::development());

        let space = service
            .scoped_client(None)
            .update("a-space", &payload(json!({ "id": "a-space", "name": "renamed", "description": "" })))
            .await
            .unwrap();

        assert_eq!(space.name, "renamed");
        assert_eq!(space.description.as_deref(), Some(""));
        assert_eq!(space.color.as_deref(), Some("#aabbcc"));
        assert!(space.disabled_features.is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_space_is_not_found() {
        let repo = seeded_repository();
        let service = service_with(repo.clone(), &AppConfig::development());

        let err = service
            .scoped_client(None)
            .update("a-new-space", &payload(json!({ "id": "a-new-space", "name": "new" })))
            .await
            .unwrap_err();

        assert!(matches!(err, SpacesError::NotFound(ref id) if id == "a-new-space"));
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn get_all_sorted_by_name() {
        let service = service_with(seeded_repository(), &AppConfig::development());
        let names: Vec<String> = service
            .scoped_client(None)
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Default", "a space", "b space"]);
    }

    #[tokio::test]
    async fn create_refuses_duplicates_and_limit() {
        let repo = seeded_repository();
        let mut config = AppConfig::development();
        config.spaces.max_spaces = 4;
        let client = service_with(repo.clone(), &config).scoped_client(None);

        let err = client
            .create(&payload(json!({ "id": "a-space", "name": "dupe" })))
            .await
            .unwrap_err();
        assert!(matches!(err, SpacesError::AlreadyExists(_)));

        client
            .create(&payload(json!({ "id": "c-space", "name": "c space" })))
            .await
            .unwrap();

        let err = client
            .create(&payload(json!({ "id": "d-space", "name": "d space" })))
            .await
            .unwrap_err();
        assert!(matches!(err, SpacesError::MaxSpacesExceeded(4)));
    }

    #[tokio::test]
    async fn reserved_space_cannot_be_deleted() {
        let repo = seeded_repository();
        let client = service_with(repo.clone(), &AppConfig::development()).scoped_client(None);

        assert!(matches!(client.delete(DEFAULT_SPACE_ID).await, Err(SpacesError::Reserved(_))));
        client.delete("b-space").await.unwrap();
        assert!(matches!(client.get("b-space").await, Err(SpacesError::NotFound(_))));
    }

    #[tokio::test]
    async fn rbac_requires_privileges() {
        let repo = seeded_repository();
        let service = service_with(repo.clone(), &rbac_config());

        let reader = service.scoped_client(user(&[PRIVILEGE_SPACE_READ]));
        assert!(reader.get("a-space").await.is_ok());
        let err = reader
            .update("a-space", &payload(json!({ "id": "a-space", "name": "nope" })))
            .await
            .unwrap_err();
        assert!(matches!(err, SpacesError::Forbidden { action: "update" }));

        let anonymous = service.scoped_client(None);
        assert!(matches!(anonymous.get_all().await, Err(SpacesError::Forbidden { .. })));

        let manager = service.scoped_client(user(&[PRIVILEGE_SPACE_MANAGE]));
        assert!(manager.get_all().await.is_ok());
        assert!(manager
            .update("a-space", &payload(json!({ "id": "a-space", "name": "yes" })))
            .await
            .is_ok());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn get_all_audits_the_returned_space_ids() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut config = rbac_config();
        config.security.enable_audit_logging = true;
        let service = service_with(seeded_repository(), &config);

        let spaces = service
            .scoped_client(user(&[PRIVILEGE_SPACE_READ]))
            .get_all()
            .await
            .unwrap();
        assert_eq!(spaces.len(), 3);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let audit_line = output
            .lines()
            .find(|line| line.contains("spaces_authorization_success"))
            .expect("getAll should be audited");
        assert!(audit_line.contains("space_ids=default,a-space,b-space"), "{}", audit_line);
    }

    #[tokio::test]
    async fn default_space_is_created_once() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = service_with(repo.clone(), &AppConfig::development());

        assert!(service.ensure_default_space().await.unwrap());
        assert!(!service.ensure_default_space().await.unwrap());

        let space = service.scoped_client(None).get(DEFAULT_SPACE_ID).await.unwrap();
        assert!(space.is_reserved());
    }
}
