//! Shared wiremock helpers for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use orgsync_infrastructure::{ClientConfig, Connection};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "organization.test";
pub const CLIENT_SECRET: &str = "s3cret";
pub const TOKEN_PATH: &str = "/connect/token";

/// Settings pointing both endpoints at the mock server.
pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(CLIENT_ID, SecretString::from(CLIENT_SECRET.to_string()))
        .unwrap()
        .with_api_url(&format!("{}/public", server.uri()))
        .unwrap()
        .with_auth_url(&format!("{}{TOKEN_PATH}", server.uri()))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

/// A connection against the mock server.
pub fn connect(server: &MockServer) -> Connection {
    Connection::from_config(&config(server)).unwrap()
}

/// Token endpoint response body.
pub fn token_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "expires_in": 3600,
        "token_type": "Bearer",
        "scope": "api.organization"
    })
}

/// Mounts a token endpoint that always hands out `token`.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(token)))
        .mount(server)
        .await;
}

/// Bearer header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
