//! Content file gateway.
//!
//! Reads and writes Markdown/MDX sources for the CMS. The only access
//! control is the `content/` prefix allow-list, checked before the
//! filesystem is touched. Writes are unguarded: concurrent writers to the
//! same path race and the last one wins.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::SharedState;

/// Paths must start with this prefix to be readable or writable.
pub const CONTENT_PREFIX: &str = "content/";

/// Map a request path onto the site root, enforcing the allow-list.
pub fn resolve(root: &Path, path: &str) -> Result<PathBuf, ApiError> {
    if !path.starts_with(CONTENT_PREFIX) || path.contains('\0') {
        return Err(ApiError::AccessDenied);
    }

    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ApiError::AccessDenied);
    }

    Ok(root.join(relative))
}

/// Read a content file as text. Invalid UTF-8 is replaced, not rejected.
pub async fn read_file(root: &Path, path: &str) -> Result<String, ApiError> {
    let full_path = resolve(root, path)?;

    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ApiError::not_found("File not found"),
            _ => ApiError::internal(format!("reading {}: {}", full_path.display(), e)),
        })?;

    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Create or overwrite a content file, creating parent directories.
pub async fn write_file(root: &Path, path: &str, content: &str) -> Result<(), ApiError> {
    let full_path = resolve(root, path)?;

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ApiError::internal(format!("creating {}: {}", parent.display(), e)))?;
    }

    tokio::fs::write(&full_path, content)
        .await
        .map_err(|e| ApiError::internal(format!("writing {}: {}", full_path.display(), e)))
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    path: Option<String>,
}

/// Body of a save request.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    path: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    success: bool,
    message: &'static str,
}

/// `GET /api/docs/content?path=content/...`
pub async fn read_content(
    State(state): State<SharedState>,
    Query(query): Query<ContentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let path = query
        .path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("File path is required"))?;

    let content = read_file(&state.config.root, &path).await?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], content))
}

/// `POST /api/docs/content` with `{path, content}`.
pub async fn write_content(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    let request: SaveRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;

    let (Some(path), Some(content)) = (request.path.filter(|p| !p.is_empty()), request.content)
    else {
        return Err(ApiError::bad_request("Path and content are required"));
    };

    write_file(&state.config.root, &path, &content).await?;
    tracing::info!("Saved {}", path);

    Ok(Json(SaveResponse {
        success: true,
        message: "File saved successfully",
    }))
}
