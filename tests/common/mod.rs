#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use producto_api::albums::AlbumsClient;
use producto_api::auth::{AuthMethod, JwtVerifier};
use producto_api::server::{build_router, AppState, Config};
use producto_api::{Backend, DbProvider};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config(auth_method: AuthMethod, db_path: &Path, albums_url: &str) -> Config {
    Config {
        db_provider: DbProvider::Json,
        mongo_uri: String::new(),
        json_db_path: db_path.to_path_buf(),
        auth_method,
        api_key: TEST_API_KEY.to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_expires_in_secs: 3600,
        albums_url: albums_url.to_string(),
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        cors_allow_origins: Vec::new(),
    }
}

/// Build the full application over the flat-file backend.
pub async fn test_app(config: Config) -> Router {
    let backend = Backend::connect(
        config.db_provider,
        &config.mongo_uri,
        &config.json_db_path,
    )
    .await
    .unwrap();

    let state = AppState {
        products: backend.products.clone(),
        users: backend.users.clone(),
        jwt: Arc::new(JwtVerifier::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.jwt_expires_in_secs),
        )),
        albums: Arc::new(AlbumsClient::new(config.albums_url.clone())),
        config: Arc::new(config),
    };

    build_router(state)
}

/// Fire one request and decode the response body.
///
/// Non-JSON bodies (the CSV export) come back as a `Value::String`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    (status, value)
}

/// Serve a fixed albums payload on an ephemeral port; returns its URL.
pub async fn spawn_albums_fixture(albums: Value) -> String {
    let app = Router::new().route(
        "/albums",
        get(move || {
            let albums = albums.clone();
            async move { Json(albums) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/albums")
}
