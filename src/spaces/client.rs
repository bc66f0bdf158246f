use std::sync::Arc;
use tracing::{debug, info};

use super::audit::SpacesAuditLogger;
use super::error::SpacesError;
use super::model::{Space, SPACE_TYPE};
use super::schema::SpacePayload;
use crate::auth::{AuthUser, PRIVILEGE_SPACE_MANAGE, PRIVILEGE_SPACE_READ};
use crate::saved_objects::{FindOptions, SavedObjectsRepository};

/// Space operations on behalf of a single caller.
///
/// Obtained from `SpacesService::scoped_client`; holds the caller (if any)
/// so every operation can be checked against their privileges when RBAC
/// is enabled.
pub struct SpacesClient {
    repository: Arc<dyn SavedObjectsRepository>,
    audit: SpacesAuditLogger,
    max_spaces: usize,
    rbac_enabled: bool,
    user: Option<AuthUser>,
}

impl SpacesClient {
    pub(crate) fn new(
        repository: Arc<dyn SavedObjectsRepository>,
        audit: SpacesAuditLogger,
        max_spaces: usize,
        rbac_enabled: bool,
        user: Option<AuthUser>,
    ) -> Self {
        Self {
            repository,
            audit,
            max_spaces,
            rbac_enabled,
            user,
        }
    }

    fn ensure_authorized(
        &self,
        action: &'static str,
        privilege: &str,
        space_ids: &[&str],
    ) -> Result<(), SpacesError> {
        if let Some(user) = self.check_privilege(action, privilege, space_ids)? {
            self.audit.authorization_success(&user.username, action, space_ids);
        }
        Ok(())
    }

    /// Returns the granted caller, or `None` when RBAC is disabled. Only
    /// failures are audited here.
    fn check_privilege(
        &self,
        action: &'static str,
        privilege: &str,
        space_ids: &[&str],
    ) -> Result<Option<&AuthUser>, SpacesError> {
        if !self.rbac_enabled {
            return Ok(None);
        }

        let Some(user) = &self.user else {
            self.audit.authorization_failure("anonymous", action, space_ids);
            return Err(SpacesError::Forbidden { action });
        };

        // manage implies read
        let granted = user.has_privilege(privilege)
            || (privilege == PRIVILEGE_SPACE_READ && user.has_privilege(PRIVILEGE_SPACE_MANAGE));

        if granted {
            Ok(Some(user))
        } else {
            self.audit.authorization_failure(&user.username, action, space_ids);
            Err(SpacesError::Forbidden { action })
        }
    }

    /// All spaces, sorted by name
    pub async fn get_all(&self) -> Result<Vec<Space>, SpacesError> {
        let user = self.check_privilege("getAll", PRIVILEGE_SPACE_READ, &[])?;

        let found = self
            .repository
            .find(FindOptions::new(SPACE_TYPE).per_page(self.max_spaces).sort_by("name"))
            .await?;

        debug!("Found {} of {} spaces", found.saved_objects.len(), found.total);

        let spaces = found
            .saved_objects
            .into_iter()
            .map(Space::from_saved_object)
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(user) = user {
            let ids: Vec<&str> = spaces.iter().map(|space| space.id.as_str()).collect();
            self.audit.authorization_success(&user.username, "getAll", &ids);
        }
        Ok(spaces)
    }

    pub async fn get(&self, id: &str) -> Result<Space, SpacesError> {
        self.ensure_authorized("get", PRIVILEGE_SPACE_READ, &[id])?;

        let object = self
            .repository
            .get(SPACE_TYPE, id)
            .await
            .map_err(|e| SpacesError::from_lookup(id, e))?;

        Space::from_saved_object(object)
    }

    pub async fn create(&self, payload: &SpacePayload) -> Result<Space, SpacesError> {
        self.ensure_authorized("create", PRIVILEGE_SPACE_MANAGE, &[])?;

        let existing = self
            .repository
            .find(FindOptions::new(SPACE_TYPE).per_page(0))
            .await?;
        if existing.total >= self.max_spaces {
            return Err(SpacesError::MaxSpacesExceeded(self.max_spaces));
        }

        let created = self
            .repository
            .create(SPACE_TYPE, &payload.id, payload.to_attributes(), false)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    SpacesError::AlreadyExists(payload.id.clone())
                } else {
                    SpacesError::Repository(e)
                }
            })?;

        info!("Created space '{}'", created.id);
        Space::from_saved_object(created)
    }

    /// Update an existing space. Never creates: an unknown id is `NotFound`
    /// and the repository is not written.
    pub async fn update(&self, id: &str, payload: &SpacePayload) -> Result<Space, SpacesError> {
        self.ensure_authorized("update", PRIVILEGE_SPACE_MANAGE, &[id])?;

        self.repository
            .get(SPACE_TYPE, id)
            .await
            .map_err(|e| SpacesError::from_lookup(id, e))?;

        let updated = self
            .repository
            .update(SPACE_TYPE, id, payload.to_attributes())
            .await
            .map_err(|e| SpacesError::from_lookup(id, e))?;

        info!("Updated space '{}'", id);
        Space::from_saved_object(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), SpacesError> {
        self.ensure_authorized("delete", PRIVILEGE_SPACE_MANAGE, &[id])?;

        let object = self
            .repository
            .get(SPACE_TYPE, id)
            .await
            .map_err(|e| SpacesError::from_lookup(id, e))?;

        if Space::from_saved_object(object)?.is_reserved() {
            return Err(SpacesError::Reserved(id.to_string()));
        }

        self.repository
            .delete(SPACE_TYPE, id)
            .await
            .map_err(|e| SpacesError::from_lookup(id, e))?;

        info!("Deleted space '{}'", id);
        Ok(())
    }
}
