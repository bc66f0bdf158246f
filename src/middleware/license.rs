use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::license::LICENSE_INVALID_MESSAGE;

/// Refuses every request on the wrapped routes unless the license is valid.
/// Runs before extraction, so the body is never looked at.
pub async fn licensed_route_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let check = state.license.check();
    if !check.is_valid() {
        tracing::warn!(
            license_state = check.state.as_str(),
            "Rejecting {} {}: license is not valid for spaces",
            request.method(),
            request.uri().path()
        );
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": LICENSE_INVALID_MESSAGE })),
        )
            .into_response();
    }

    next.run(request).await
}
