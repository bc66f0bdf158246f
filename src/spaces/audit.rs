use tracing::{info, warn};

/// Records space authorization decisions on the `spaces::audit` target
#[derive(Debug, Clone, Copy)]
pub struct SpacesAuditLogger {
    enabled: bool,
}

impl SpacesAuditLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn authorization_failure(&self, username: &str, action: &str, space_ids: &[&str]) {
        if !self.enabled {
            return;
        }
        warn!(
            target: "spaces::audit",
            event = "spaces_authorization_failure",
            username,
            action,
            space_ids = %space_ids.join(","),
            "{} unauthorized to {} spaces",
            username,
            action
        );
    }

    pub fn authorization_success(&self, username: &str, action: &str, space_ids: &[&str]) {
        if !self.enabled {
            return;
        }
        info!(
            target: "spaces::audit",
            event = "spaces_authorization_success",
            username,
            action,
            space_ids = %space_ids.join(","),
            "{} authorized to {} {} spaces",
            username,
            action,
            space_ids.join(",")
        );
    }
}
