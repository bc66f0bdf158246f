use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use super::parse_space_payload;
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::spaces::{Space, SpacePayload};

/// GET /api/spaces/space/:id - Get a single space
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<AuthUser>>,
) -> ApiResult<Space> {
    let client = state.spaces.scoped_client(user.map(|Extension(u)| u));
    let space = client.get(&id).await?;
    Ok(ApiResponse::success(space))
}

/**
 * PUT /api/spaces/space/:id - Update an existing space
 *
 * The path id selects the space; the body is the full space definition:
 * ```json
 * {
 *   "id": "a-space",
 *   "name": "my updated space",
 *   "description": "",            // optional, empty string is kept as-is
 *   "disabledFeatures": ["foo"]   // optional, defaults to []
 * }
 * ```
 * Responds 200 with the updated space, 404 when no such space exists
 * (nothing is written), 400 on an invalid body.
 */
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<AuthUser>>,
    payload: Result<Json<SpacePayload>, JsonRejection>,
) -> ApiResult<Space> {
    let payload = parse_space_payload(payload)?;

    let client = state.spaces.scoped_client(user.map(|Extension(u)| u));
    let space = client.update(&id, &payload).await?;
    Ok(ApiResponse::success(space))
}

/// DELETE /api/spaces/space/:id - Delete a space; reserved spaces are refused
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<AuthUser>>,
) -> ApiResult<()> {
    let client = state.spaces.scoped_client(user.map(|Extension(u)| u));
    client.delete(&id).await?;
    Ok(ApiResponse::no_content())
}
