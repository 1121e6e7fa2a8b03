//! Integration tests for logout (refresh token revocation)

use auth_test_utils::{TestAuthServer, TEST_EMAIL_ALICE, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_logout_revokes_refresh_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let response = server
        .post_json(
            "/logout",
            &json!({"refresh_token": registered.refresh_token}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body, json!({"ok": true}));

    let refresh = server.refresh(&registered.refresh_token).await?;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_logout_is_idempotent() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let body = json!({"refresh_token": registered.refresh_token});

    for _ in 0..2 {
        let response = server.post_json("/logout", &body).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_logout_unknown_and_consumed_tokens_succeed() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    server.refresh(&registered.refresh_token).await?;

    for token in [registered.refresh_token.as_str(), "not-a-real-token"] {
        let response = server
            .post_json("/logout", &json!({"refresh_token": token}))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn test_logout_empty_token_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for body in [json!({"refresh_token": ""}), json!({})] {
        let response = server.post_json("/logout", &body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    Ok(())
}
