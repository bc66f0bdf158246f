use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, PersistenceBackend};
use crate::handlers;
use crate::license::{LicenseChecker, StaticLicense};
use crate::middleware::{jwt_auth_middleware, licensed_route_middleware};
use crate::saved_objects::{InMemoryRepository, PgRepository, RepositoryError, SavedObjectsRepository};
use crate::spaces::SpacesService;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub spaces: Arc<SpacesService>,
    pub license: Arc<dyn LicenseChecker>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn SavedObjectsRepository>,
        license: Arc<dyn LicenseChecker>,
    ) -> Self {
        let spaces = Arc::new(SpacesService::new(repository, &config));
        Self {
            config: Arc::new(config),
            spaces,
            license,
        }
    }

    /// Build state from configuration: pick the repository backend and a
    /// license checker reporting the configured state.
    pub async fn from_config(config: AppConfig) -> Result<Self, RepositoryError> {
        let repository: Arc<dyn SavedObjectsRepository> = match config.persistence.backend {
            PersistenceBackend::Memory => Arc::new(InMemoryRepository::new()),
            PersistenceBackend::Postgres => Arc::new(PgRepository::connect(&config.persistence).await?),
        };
        let license = Arc::new(StaticLicense::new(config.license.state));

        Ok(Self::new(config, repository, license))
    }
}

pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let security = &state.config.security;

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Licensed spaces API
        .merge(spaces_routes(state.clone()))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes));

    if security.enable_cors {
        router = router.layer(cors_layer(&security.cors_origins));
    }
    if api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn spaces_routes(state: AppState) -> Router<AppState> {
    use handlers::spaces;

    Router::new()
        .route("/api/spaces/space", get(spaces::get_all).post(spaces::create))
        .route(
            "/api/spaces/space/:id",
            get(spaces::get)
                .put(spaces::update)
                .post(spaces::update)
                .delete(spaces::delete),
        )
        // Layers run outermost-last: the license gate sees the request before auth
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware))
        .route_layer(middleware::from_fn_with_state(state, licensed_route_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Spaces API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "spaces": "/api/spaces/space[/:id] (licensed)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.spaces.repository().health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "repository": "ok",
                "license": state.license.check().state,
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "repository_error": e.to_string(),
                })),
            )
        }
    }
}
