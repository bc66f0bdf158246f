use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use super::parse_space_payload;
use crate::app::AppState;
use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::spaces::{Space, SpacePayload};

/// GET /api/spaces/space - List all spaces, sorted by name
pub async fn get(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
) -> ApiResult<Vec<Space>> {
    let client = state.spaces.scoped_client(user.map(|Extension(u)| u));
    let spaces = client.get_all().await?;
    Ok(ApiResponse::success(spaces))
}

/// POST /api/spaces/space - Create a space; the body id becomes the space id
pub async fn post(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    payload: Result<Json<SpacePayload>, JsonRejection>,
) -> ApiResult<Space> {
    let payload = parse_space_payload(payload)?;

    let client = state.spaces.scoped_client(user.map(|Extension(u)| u));
    let space = client.create(&payload).await?;
    Ok(ApiResponse::success(space))
}
