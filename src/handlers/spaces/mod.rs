pub mod collection;
pub mod space;

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::ApiError;
use crate::spaces::SpacePayload;

// Re-export handler functions for use in routing
pub use collection::get as get_all;
pub use collection::post as create;
pub use space::delete;
pub use space::get;
pub use space::put as update;

/// Unwrap the JSON body and apply field validation
pub(crate) fn parse_space_payload(
    payload: Result<Json<SpacePayload>, JsonRejection>,
) -> Result<SpacePayload, ApiError> {
    let Json(payload) = payload?;

    payload
        .validate()
        .map_err(|field_errors| ApiError::validation_error("Invalid space", Some(field_errors)))?;

    Ok(payload)
}
