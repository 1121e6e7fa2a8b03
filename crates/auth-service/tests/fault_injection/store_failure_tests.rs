//! Store outage and latency tests
//!
//! A store that is down or slower than `STORE_TIMEOUT_MS` must surface as a
//! retryable 503, never as a 401 that would make clients discard credentials.

use auth_test_utils::{TestAuthServer, TEST_EMAIL_ALICE, TEST_EMAIL_BOB, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;

async fn assert_unavailable(response: reqwest::Response) -> Result<(), anyhow::Error> {
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    Ok(())
}

#[tokio::test]
async fn test_refresh_during_outage_is_503_and_token_survives() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    server.store().set_unavailable(true);
    assert_unavailable(server.refresh(&registered.refresh_token).await?).await?;

    server.store().set_unavailable(false);
    let retry = server.refresh(&registered.refresh_token).await?;
    assert_eq!(retry.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_slow_store_times_out_as_503() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    server.store().set_latency(Duration::from_secs(2));
    assert_unavailable(server.refresh(&registered.refresh_token).await?).await?;

    server.store().set_latency(Duration::ZERO);
    let retry = server.refresh(&registered.refresh_token).await?;
    assert_eq!(retry.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_during_user_store_outage_is_503() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    server.users().set_unavailable(true);
    let response = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
        )
        .await?;

    assert_unavailable(response).await
}

#[tokio::test]
async fn test_register_returns_no_tokens_when_refresh_store_down() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.store().set_unavailable(true);

    let response = server
        .post_json(
            "/register",
            &json!({"email": TEST_EMAIL_BOB, "password": TEST_PASSWORD}),
        )
        .await?;

    assert_unavailable(response).await
}

#[tokio::test]
async fn test_logout_during_outage_still_succeeds() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    server.store().set_unavailable(true);
    let response = server
        .post_json(
            "/logout",
            &json!({"refresh_token": registered.refresh_token}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_access_token_verification_needs_no_store() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    server.store().set_unavailable(true);
    server.users().set_unavailable(true);
    let response = reqwest::Client::new()
        .get(format!("{}/me", server.url()))
        .bearer_auth(&registered.access_token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_readiness_follows_store_health() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let ready_url = format!("{}/ready", server.url());

    server.store().set_unavailable(true);
    assert!(!server.refresh_health().await);

    let response = reqwest::get(&ready_url).await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["store"], "unhealthy");
    assert_eq!(body["error"], "Service dependencies unavailable");

    server.store().set_unavailable(false);
    assert!(server.refresh_health().await);
    let response = reqwest::get(&ready_url).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
