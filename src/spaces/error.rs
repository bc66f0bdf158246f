use thiserror::Error;

use crate::saved_objects::RepositoryError;

#[derive(Debug, Error)]
pub enum SpacesError {
    #[error("Saved object [space/{0}] not found")]
    NotFound(String),

    #[error("A space with the identifier {0} already exists.")]
    AlreadyExists(String),

    #[error("This Space cannot be deleted because it is reserved.")]
    Reserved(String),

    #[error("Unable to create Space, this exceeds the maximum number of spaces ({0})")]
    MaxSpacesExceeded(usize),

    #[error("Unauthorized to {action} spaces")]
    Forbidden { action: &'static str },

    #[error("Space [{id}] is corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SpacesError {
    /// Turn a repository not-found into the space-level one, pass everything else through
    pub(crate) fn from_lookup(id: &str, err: RepositoryError) -> Self {
        if err.is_not_found() {
            SpacesError::NotFound(id.to_string())
        } else {
            SpacesError::Repository(err)
        }
    }
}
