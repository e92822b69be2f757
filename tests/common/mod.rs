#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use teslo_api::auth::JwtKeys;
use teslo_api::config::AppConfig;
use teslo_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "Abc123";

/// Seeded accounts: admin, plain user, super-user
pub const ADMIN_EMAIL: &str = "test1@google.com";
pub const USER_EMAIL: &str = "test2@google.com";
pub const SUPER_EMAIL: &str = "test3@google.com";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub ws_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_seed_route = true;
    config
}

/// Start an in-process server on a free port with its own empty in-memory store
pub async fn spawn_server() -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let state = AppState::in_memory(test_config())?;
    let router = app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        ws_url: format!("ws://127.0.0.1:{}/ws", port),
        state,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

/// Fresh server with the fixture users and products loaded
pub async fn spawn_seeded_server() -> Result<TestServer> {
    let server = spawn_server().await?;
    server.seed().await?;
    Ok(server)
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn keys(&self) -> JwtKeys {
        JwtKeys::new(TEST_SECRET, 1).expect("test secret is not empty")
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub async fn seed(&self) -> Result<()> {
        let res = self.client.get(self.url("/seed")).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "seed failed: {}", res.status());
        Ok(())
    }

    /// Log in and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    /// Register an account (role `user`) and return its token
    pub async fn register(&self, email: &str, full_name: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": PASSWORD, "fullName": full_name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("register response without token")
    }

    /// POST /api/products, returning the response as-is
    pub async fn create_product(&self, token: &str, payload: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url("/api/products"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?)
    }
}

pub fn product_payload(title: &str, images: &[&str]) -> Value {
    json!({
        "title": title,
        "price": 10,
        "sizes": ["M", "L"],
        "gender": "unisex",
        "images": images,
    })
}
