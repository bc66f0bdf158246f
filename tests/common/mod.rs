#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use spaces_api::config::AppConfig;
use spaces_api::license::{LicenseChecker, StaticLicense};
use spaces_api::saved_objects::{
    Attributes, FindOptions, FindResponse, InMemoryRepository, RepositoryError, SavedObject,
    SavedObjectsRepository,
};
use spaces_api::spaces::{Space, SPACE_TYPE};
use spaces_api::{app, AppState};

pub fn space_object(id: &str, attributes: Value) -> SavedObject {
    SavedObject {
        object_type: SPACE_TYPE.to_string(),
        id: id.to_string(),
        attributes: attributes.as_object().cloned().unwrap_or_default(),
        version: None,
        updated_at: None,
    }
}

/// Fixture spaces: two regular spaces and the reserved default space
pub fn fixture_spaces() -> Vec<SavedObject> {
    vec![
        space_object("a-space", json!({ "name": "a space", "disabledFeatures": [] })),
        space_object("b-space", json!({ "name": "b space", "disabledFeatures": [] })),
        space_object("default", Value::Object(Space::default_space_attributes())),
    ]
}

/// Repository wrapper that records every `update` call
pub struct RecordingRepository {
    inner: InMemoryRepository,
    updates: Mutex<Vec<(String, String, Attributes)>>,
}

impl RecordingRepository {
    pub fn new(objects: Vec<SavedObject>) -> Self {
        Self {
            inner: InMemoryRepository::with_objects(objects),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn updates(&self) -> Vec<(String, String, Attributes)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SavedObjectsRepository for RecordingRepository {
    async fn get(&self, object_type: &str, id: &str) -> Result<SavedObject, RepositoryError> {
        self.inner.get(object_type, id).await
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, RepositoryError> {
        self.inner.find(options).await
    }

    async fn create(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
        overwrite: bool,
    ) -> Result<SavedObject, RepositoryError> {
        self.inner.create(object_type, id, attributes, overwrite).await
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: Attributes,
    ) -> Result<SavedObject, RepositoryError> {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((object_type.to_string(), id.to_string(), attributes.clone()));
        }
        self.inner.update(object_type, id, attributes).await
    }

    async fn delete(&self, object_type: &str, id: &str) -> Result<(), RepositoryError> {
        self.inner.delete(object_type, id).await
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        self.inner.health_check().await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config
}

pub fn state_with(
    config: AppConfig,
    repository: Arc<dyn SavedObjectsRepository>,
    license: StaticLicense,
) -> AppState {
    let license: Arc<dyn LicenseChecker> = Arc::new(license);
    AppState::new(config, repository, license)
}

/// Drive a single request through the router in-process
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok((status, value))
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// Serve the app on a free local port for tests that go over the wire
    pub async fn spawn(state: AppState) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self { port, base_url };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
