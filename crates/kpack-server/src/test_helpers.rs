//! Shared fixtures for endpoint tests.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use crate::env::{Environment, GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET};
use crate::search::SearchIndex;
use crate::server::{router, ServerConfig, ServerState, SharedState};

pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        root: root.to_path_buf(),
        ..Default::default()
    }
}

pub fn test_env() -> Environment {
    Environment::fixed([
        (GITHUB_CLIENT_ID, "test-client"),
        (GITHUB_CLIENT_SECRET, "test-secret"),
    ])
}

pub fn state_with(config: ServerConfig, env: Environment, index: SearchIndex) -> SharedState {
    Arc::new(ServerState::new(config, env, index).unwrap())
}

pub fn test_app(root: &Path) -> Router {
    router(state_with(test_config(root), test_env(), SearchIndex::default()))
}

/// Drive one request through the router and collect the body as text.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub fn parse_json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}
