//! Integration tests for refresh token rotation

use auth_test_utils::{TestAuthServer, TokenAssertions, TEST_EMAIL_ALICE, TEST_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashSet;

#[tokio::test]
async fn test_refresh_rotates_pair() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let response = server.refresh(&registered.refresh_token).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["token_type"], "Bearer");
    assert_ne!(body["refresh_token"], registered.refresh_token.as_str());
    body["access_token"]
        .as_str()
        .unwrap()
        .assert_valid_jwt()
        .assert_has_role("user");
    Ok(())
}

#[tokio::test]
async fn test_refresh_token_is_single_use() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let first = server.refresh(&registered.refresh_token).await?;
    assert_eq!(first.status(), StatusCode::OK);

    let second = server.refresh(&registered.refresh_token).await?;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    assert!(second.headers().contains_key("www-authenticate"));
    let body: serde_json::Value = second.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");
    Ok(())
}

#[tokio::test]
async fn test_refresh_chain_leaves_only_latest_valid() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let mut chain = vec![registered.refresh_token.clone()];
    for _ in 0..5 {
        let latest = chain.last().unwrap().clone();
        let response = server.refresh(&latest).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await?;
        chain.push(body["refresh_token"].as_str().unwrap().to_string());
    }

    let distinct: HashSet<&String> = chain.iter().collect();
    assert_eq!(distinct.len(), chain.len());

    for stale in chain.iter().take(chain.len() - 1) {
        let response = server.refresh(stale).await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = server.refresh(chain.last().unwrap()).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_refresh_unknown_token_is_unauthorized() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server.refresh("not-a-real-token").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_refresh_empty_token_is_bad_request() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for body in [json!({}), json!({"refresh_token": ""}), json!({"refresh_token": "   "})] {
        let response = server.post_json("/refresh", &body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
    Ok(())
}

#[tokio::test]
async fn test_refresh_trims_surrounding_whitespace() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let padded = format!("  {}\n", registered.refresh_token);
    let response = server.refresh(&padded).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let replay = server.refresh(&registered.refresh_token).await?;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_refresh_picks_up_role_changes() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let verifier = common::jwt::TokenVerifier::from_public_key_pem(
        &server.config().jwt_public_key_pem,
        &server.config().jwt_issuer,
        &server.config().jwt_audience,
    )?;
    let sub = verifier.verify(&registered.access_token)?.sub;
    server
        .users()
        .set_roles(&sub, vec!["user".to_string(), "admin".to_string()])?;

    let response = server.refresh(&registered.refresh_token).await?;

    let body: serde_json::Value = response.json().await?;
    body["access_token"]
        .as_str()
        .unwrap()
        .assert_for_subject(&sub)
        .assert_roles(&["user", "admin"]);
    Ok(())
}

#[tokio::test]
async fn test_refresh_refused_for_suspended_principal() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    server.users().set_status(TEST_EMAIL_ALICE, "suspended")?;

    let response = server.refresh(&registered.refresh_token).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");
    assert!(body.get("access_token").is_none());

    // Reactivation restores the untouched token
    server.users().set_status(TEST_EMAIL_ALICE, "active")?;
    let response = server.refresh(&registered.refresh_token).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
