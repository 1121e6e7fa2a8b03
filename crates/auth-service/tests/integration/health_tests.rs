//! Integration tests for operational endpoints

use auth_test_utils::TestAuthServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_root_reports_app_and_environment() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(server.url()).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "auth-service running (test)");
    Ok(())
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok_when_healthy() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "healthy");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_prometheus_text() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    // Generate at least one request so there is something to render
    reqwest::get(format!("{}/health", server.url())).await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    response.text().await?;
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/v1/auth/user/token", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
