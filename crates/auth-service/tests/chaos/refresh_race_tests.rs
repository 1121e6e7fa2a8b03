//! Concurrent redemption over HTTP
//!
//! Many clients presenting the same refresh token at once must produce
//! exactly one rotation.

use auth_test_utils::{TestAuthServer, TEST_EMAIL_ALICE, TEST_PASSWORD};
use futures::future::join_all;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

const CONCURRENT_CLIENTS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_single_winner() -> Result<(), anyhow::Error> {
    let server = Arc::new(TestAuthServer::spawn().await?);
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let attempts = (0..CONCURRENT_CLIENTS).map(|_| {
        let server = server.clone();
        let token = registered.refresh_token.clone();
        tokio::spawn(async move {
            let response = server.refresh(&token).await?;
            Ok::<StatusCode, anyhow::Error>(response.status())
        })
    });

    let mut ok = 0;
    let mut unauthorized = 0;
    for result in join_all(attempts).await {
        match result?? {
            StatusCode::OK => ok += 1,
            StatusCode::UNAUTHORIZED => unauthorized += 1,
            other => anyhow::bail!("unexpected status {other}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(unauthorized, CONCURRENT_CLIENTS - 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_refresh_racing_logout_leaves_original_dead() -> Result<(), anyhow::Error> {
    let server = Arc::new(TestAuthServer::spawn().await?);
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;
    let token = registered.refresh_token.clone();

    let refresh = {
        let server = server.clone();
        let token = token.clone();
        tokio::spawn(async move { server.refresh(&token).await })
    };
    let logout = {
        let server = server.clone();
        let token = token.clone();
        tokio::spawn(async move {
            server
                .post_json("/logout", &json!({"refresh_token": token}))
                .await
        })
    };

    let refresh_status = refresh.await??.status();
    let logout_status = logout.await??.status();

    assert_eq!(logout_status, StatusCode::OK);
    assert!(matches!(
        refresh_status,
        StatusCode::OK | StatusCode::UNAUTHORIZED
    ));

    // Whatever the interleaving, the original token is now dead
    let again = server.refresh(&token).await?;
    assert_eq!(again.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_issue_distinct_refresh_tokens() -> Result<(), anyhow::Error> {
    let server = Arc::new(TestAuthServer::spawn().await?);
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let logins = (0..8).map(|_| {
        let server = server.clone();
        tokio::spawn(async move {
            let response = server
                .post_json(
                    "/login",
                    &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
                )
                .await?;
            anyhow::ensure!(response.status() == StatusCode::OK, "login failed");
            let body: serde_json::Value = response.json().await?;
            Ok::<String, anyhow::Error>(body["refresh_token"].as_str().unwrap_or_default().to_string())
        })
    });

    let mut tokens = HashSet::new();
    for result in join_all(logins).await {
        tokens.insert(result??);
    }
    assert_eq!(tokens.len(), 8);
    Ok(())
}
