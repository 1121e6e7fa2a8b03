//! Integration tests for bearer introspection (`/me`)

use auth_test_utils::{
    tamper_signature, TestAuthServer, TestTokenBuilder, PRIMARY_PUBLIC_KEY_PEM, TEST_AUDIENCE,
    TEST_EMAIL_ALICE, TEST_ISSUER, TEST_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::json;

async fn get_me(server: &TestAuthServer, authorization: Option<&str>) -> reqwest::Response {
    let mut request = reqwest::Client::new().get(format!("{}/me", server.url()));
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    request.send().await.expect("request should succeed")
}

#[tokio::test]
async fn test_me_returns_claims_for_issued_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let registered = server.register(TEST_EMAIL_ALICE, TEST_PASSWORD).await?;

    let response = get_me(
        &server,
        Some(&format!("Bearer {}", registered.access_token)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["roles"], json!(["user"]));
    assert_eq!(body["iss"], TEST_ISSUER);
    assert_eq!(body["aud"], TEST_AUDIENCE);
    assert!(body["sub"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(body["exp"].as_i64().is_some());
    Ok(())
}

#[tokio::test]
async fn test_me_accepts_lowercase_scheme() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let token = TestTokenBuilder::new().for_subject("u1").sign();

    let response = get_me(&server, Some(&format!("bearer {token}"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["sub"], "u1");
    Ok(())
}

#[tokio::test]
async fn test_me_rejects_missing_or_non_bearer_header() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    for header in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer "), Some("Bearer")] {
        let response = get_me(&server, header).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header: {header:?}");
        assert!(response.headers().contains_key("www-authenticate"));
    }
    Ok(())
}

#[tokio::test]
async fn test_me_rejects_hostile_tokens() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let builder = TestTokenBuilder::new().for_subject("u1");

    let hostile = [
        ("rogue key", builder.sign_with_rogue_key()),
        ("es256", builder.sign_es256()),
        ("hs256 confusion", builder.sign_hs256(PRIMARY_PUBLIC_KEY_PEM.as_bytes())),
        ("alg none", builder.unsigned()),
        ("tampered", tamper_signature(&builder.sign())),
        ("expired", builder.clone().expires_in(-60).sign()),
        ("wrong issuer", builder.clone().with_issuer("someone-else").sign()),
        ("wrong audience", builder.clone().with_audience("other-platform").sign()),
        ("missing roles", builder.clone().without_claim("roles").sign()),
        (
            "unknown claim",
            builder.clone().with_extra_claim("scope", json!("admin")).sign(),
        ),
        ("garbage", "not.a.jwt".to_string()),
    ];

    for (name, token) in hostile {
        let response = get_me(&server, Some(&format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "case: {name}");
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["error"]["code"], "INVALID_TOKEN", "case: {name}");
        assert_eq!(
            body["error"]["message"], "The access token is invalid or expired",
            "case: {name}"
        );
    }
    Ok(())
}
