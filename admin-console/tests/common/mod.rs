#![allow(dead_code)]

use admin_console::config::{
    AuthServiceSettings, ClientSettings, GatewaySettings, Settings, TelemetrySettings,
};
use admin_console::models::TokenPair;
use admin_console::store::TokenStore;
use admin_console::Console;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Unsigned JWT whose `exp` is `ttl` from now (negative for expired).
pub fn jwt(subject: &str, ttl: Duration) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({
        "sub": subject,
        "iat": Utc::now().timestamp(),
        "exp": (Utc::now() + ttl).timestamp(),
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

pub fn fresh_jwt(subject: &str) -> String {
    jwt(subject, Duration::hours(1))
}

pub fn expired_jwt(subject: &str) -> String {
    jwt(subject, Duration::hours(-1))
}

pub fn settings(server: &MockServer, state_file: Option<PathBuf>) -> Settings {
    Settings {
        auth_service: AuthServiceSettings { url: server.uri() },
        gateway: GatewaySettings { url: server.uri() },
        client: ClientSettings {
            timeout_secs: 5,
            state_file,
        },
        telemetry: TelemetrySettings::default(),
    }
}

/// Console over an in-memory store, left in its initializing state.
pub fn console(server: &MockServer, tokens: TokenStore) -> Console {
    Console::new(&settings(server, None), tokens).expect("console should build")
}

pub fn profile(username: &str, is_superuser: bool) -> Value {
    json!({
        "id": format!("id-{}", username),
        "username": username,
        "email": format!("{}@example.com", username),
        "is_superuser": is_superuser,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

pub fn token_response(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
    }))
}

pub fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "detail": "Could not validate credentials" }))
}

/// `/auth/me` answering `profile` for requests carrying `access`.
pub async fn mount_me(server: &MockServer, access: &str, profile: Value) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {}", access).as_str()))
        .respond_with(ok(profile))
        .mount(server)
        .await;
}

/// Store holding `access`/`refresh`.
pub fn stored(access: &str, refresh: &str) -> TokenStore {
    let tokens = TokenStore::in_memory();
    tokens
        .save(&TokenPair::new(access, refresh))
        .expect("in-memory save");
    tokens
}

/// Stored tokens plus a session restored through `/auth/me`.
pub async fn signed_in(server: &MockServer, username: &str, is_superuser: bool) -> Console {
    let access = fresh_jwt(username);
    mount_me(server, &access, profile(username, is_superuser)).await;

    let console = console(server, stored(&access, "refresh-1"));
    let session = console.session.initialize().await;
    assert!(session.is_authenticated);
    console
}
