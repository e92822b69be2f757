mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{ADMIN_EMAIL, PASSWORD};

#[tokio::test]
async fn login_with_valid_credentials_returns_token() -> Result<()> {
    let server = common::spawn_seeded_server().await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "  TEST1@google.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["roles"], json!(["admin", "user"]));
    assert!(body["data"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn login_failures_name_the_wrong_field() -> Result<()> {
    let server = common::spawn_seeded_server().await?;

    let cases = [
        ("nobody@google.com", PASSWORD, "Credentials are not valid (email)"),
        (ADMIN_EMAIL, "wrong-password", "Credentials are not valid (password)"),
    ];

    for (email, password, message) in cases {
        let res = server
            .client
            .post(server.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = res.json::<Value>().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["message"], message);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_login_body_is_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
