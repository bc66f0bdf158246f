mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;

use spaces_api::license::StaticLicense;
use spaces_api::saved_objects::InMemoryRepository;

use common::{state_with, test_config, TestServer};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let state = state_with(test_config(), Arc::new(InMemoryRepository::new()), StaticLicense::valid());
    let server = TestServer::spawn(state).await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["license"], "valid");
    Ok(())
}

#[tokio::test]
async fn root_and_health_are_not_license_gated() -> Result<()> {
    let state = state_with(test_config(), Arc::new(InMemoryRepository::new()), StaticLicense::invalid());
    let server = TestServer::spawn(state).await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["name"], "Spaces API");

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
