//! Integration tests for registration and password login

use auth_test_utils::{
    TestAuthServer, TokenAssertions, TEST_AUDIENCE, TEST_EMAIL_ALICE, TEST_EMAIL_BOB,
    TEST_ISSUER, TEST_PASSWORD,
};
use auth_service::crypto::hash_password;
use auth_service::config::MIN_BCRYPT_COST;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_returns_created_token_pair() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = server
        .post_json(
            "/register",
            &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());

    body["access_token"]
        .as_str()
        .unwrap()
        .assert_valid_jwt()
        .assert_roles(&["user"])
        .assert_issued_for(TEST_ISSUER, TEST_AUDIENCE)
        .assert_expires_in(900);
    Ok(())
}

#[tokio::test]
async fn test_register_normalizes_email() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    server.register("  Alice@Example.COM ", TEST_PASSWORD).await?;

    let response = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let response = server
        .post_json(
            "/register",
            &json!({"email": TEST_EMAIL_ALICE, "password": "another-password"}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_bad_input() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for body in [
        json!({"email": TEST_EMAIL_ALICE, "password": "short"}),
        json!({"email": "", "password": TEST_PASSWORD}),
        json!({"email": TEST_EMAIL_ALICE}),
        json!({}),
    ] {
        let response = server.post_json("/register", &body).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
    Ok(())
}

#[tokio::test]
async fn test_login_returns_same_subject_as_register() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_BOB, TEST_PASSWORD).await?;

    let response = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_BOB, "password": TEST_PASSWORD}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    let verifier = server_verifier(&server);
    let registered_sub = verifier.verify(&registered.access_token)?.sub;
    let login_sub = verifier.verify(body["access_token"].as_str().unwrap())?.sub;
    assert_eq!(registered_sub, login_sub);
    Ok(())
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let wrong_password = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_ALICE, "password": "wrong-password"}),
        )
        .await?;
    let unknown_email = server
        .post_json(
            "/login",
            &json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
        )
        .await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a: serde_json::Value = wrong_password.json().await?;
    let b: serde_json::Value = unknown_email.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["error"]["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn test_login_inactive_principal_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let hash = hash_password(TEST_PASSWORD, MIN_BCRYPT_COST)?;
    server
        .users()
        .insert_user(TEST_EMAIL_ALICE, &hash, "suspended")?;

    let response = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
        )
        .await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_login_carries_assigned_roles_in_order() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let hash = hash_password(TEST_PASSWORD, MIN_BCRYPT_COST)?;
    let user = server
        .users()
        .insert_user(TEST_EMAIL_ALICE, &hash, "active")?;
    server.users().set_roles(
        &user.id.to_string(),
        vec!["admin".to_string(), "user".to_string(), "admin".to_string()],
    )?;

    let response = server
        .post_json(
            "/login",
            &json!({"email": TEST_EMAIL_ALICE, "password": TEST_PASSWORD}),
        )
        .await?;

    let body: serde_json::Value = response.json().await?;
    body["access_token"]
        .as_str()
        .unwrap()
        .assert_for_subject(&user.id.to_string())
        .assert_roles(&["admin", "user", "admin"]);
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected_before_handler() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/login", server.url()))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert!(response.status().is_client_error());
    Ok(())
}

fn server_verifier(server: &TestAuthServer) -> common::jwt::TokenVerifier {
    common::jwt::TokenVerifier::from_public_key_pem(
        &server.config().jwt_public_key_pem,
        TEST_ISSUER,
        TEST_AUDIENCE,
    )
    .unwrap()
}
