//! CMS configuration endpoints and the admin entry point.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::env::{Environment, DECAP_DISPLAY_URL, DECAP_SITE_URL, GITHUB_CLIENT_ID};
use crate::error::ApiError;
use crate::server::{ServerConfig, SharedState};

/// Admin UI entry inside the public directory.
pub const ADMIN_INDEX: &str = "/admin/index.html";

/// CMS configuration document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CmsConfig {
    pub backend: Backend,
    pub site_url: String,
    pub display_url: String,
    pub name: String,
    pub logo_url: String,
    pub media_folder: String,
    pub public_folder: String,
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Backend {
    pub name: String,
    pub repo: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Collection {
    pub name: String,
    pub label: String,
    pub folder: String,
    pub create: bool,
    pub slug: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Field {
    pub label: String,
    pub name: String,
    pub widget: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl Field {
    fn new(label: &str, name: &str, widget: &str) -> Self {
        Self {
            label: label.to_string(),
            name: name.to_string(),
            widget: widget.to_string(),
            required: None,
        }
    }

    fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }
}

impl CmsConfig {
    /// Generate the configuration, reading environment overrides now.
    pub fn generate(config: &ServerConfig, env: &Environment) -> Self {
        let site_url = env
            .get(DECAP_SITE_URL)
            .unwrap_or_else(|| config.site_url.clone());
        let display_url = env
            .get(DECAP_DISPLAY_URL)
            .unwrap_or_else(|| config.site_url.clone());

        Self {
            backend: Backend {
                name: "github".to_string(),
                repo: config.repo.clone(),
                branch: config.branch.clone(),
                client_id: env.get(GITHUB_CLIENT_ID),
            },
            site_url,
            display_url,
            name: "decap-cms".to_string(),
            logo_url: "https://decapcms.org/img/decap-logo.svg".to_string(),
            media_folder: "public/images".to_string(),
            public_folder: "/images".to_string(),
            collections: vec![docs_collection()],
        }
    }
}

/// The single `docs` collection edited through the CMS.
pub fn docs_collection() -> Collection {
    Collection {
        name: "docs".to_string(),
        label: "Documentation".to_string(),
        folder: "content/docs".to_string(),
        create: true,
        slug: "{{slug}}".to_string(),
        fields: vec![
            Field::new("Title", "title", "string"),
            Field::new("Description", "description", "string").optional(),
            Field::new("Body", "body", "markdown"),
            Field::new("Order", "order", "number").optional(),
        ],
    }
}

/// `GET /api/admin/config`: the static `public/admin/config.yml`.
pub async fn admin_config(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let path = state.config.public_dir().join("admin").join("config.yml");

    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
        tracing::error!("Error loading {}: {}", path.display(), e);
        ApiError::not_found("Config file not found")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/yaml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        content,
    ))
}

/// `GET /api/decap-config`: generated JSON configuration.
pub async fn decap_config(State(state): State<SharedState>) -> Json<CmsConfig> {
    Json(CmsConfig::generate(&state.config, &state.env))
}

/// `GET /admin`: hand off to the bundled admin UI.
pub async fn admin_redirect() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, ADMIN_INDEX)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchIndex;
    use crate::test_helpers::{get, parse_json, state_with, test_app, test_config};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn admin_config_missing_is_not_found() {
        let temp = tempdir().unwrap();

        let (status, _, body) = get(test_app(temp.path()), "/api/admin/config").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse_json(&body), json!({"error": "Config file not found"}));
    }

    #[tokio::test]
    async fn admin_config_served_verbatim() {
        let temp = tempdir().unwrap();
        let yaml = "backend:\n  name: github\n  branch: main\n";
        fs::create_dir_all(temp.path().join("public/admin")).unwrap();
        fs::write(temp.path().join("public/admin/config.yml"), yaml).unwrap();

        let (status, headers, body) = get(test_app(temp.path()), "/api/admin/config").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/yaml");
        assert_eq!(headers["cache-control"], "no-cache");
        assert_eq!(body, yaml);
    }

    #[tokio::test]
    async fn decap_config_reads_environment() {
        let temp = tempdir().unwrap();
        let env = Environment::fixed([
            (GITHUB_CLIENT_ID, "client-123"),
            (DECAP_SITE_URL, "https://docs.example.com"),
        ]);
        let app = crate::server::router(state_with(
            test_config(temp.path()),
            env,
            SearchIndex::default(),
        ));

        let (status, _, body) = get(app, "/api/decap-config").await;
        let config = parse_json(&body);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            config["backend"],
            json!({
                "name": "github",
                "repo": "mail-drafts7/fumadocs_decapcrm_setup",
                "branch": "main",
                "client_id": "client-123",
            })
        );
        assert_eq!(config["site_url"], "https://docs.example.com");
        assert_eq!(config["display_url"], "http://localhost:3001");
        assert_eq!(config["media_folder"], "public/images");
        assert_eq!(config["public_folder"], "/images");
    }

    #[test]
    fn omits_unset_client_id() {
        let env = Environment::empty();
        let config = CmsConfig::generate(&ServerConfig::default(), &env);

        let value = serde_json::to_value(&config).unwrap();

        assert!(value["backend"].get("client_id").is_none());
    }

    #[test]
    fn docs_collection_has_four_fields() {
        let value = serde_json::to_value(docs_collection()).unwrap();

        assert_eq!(
            value,
            json!({
                "name": "docs",
                "label": "Documentation",
                "folder": "content/docs",
                "create": true,
                "slug": "{{slug}}",
                "fields": [
                    {"label": "Title", "name": "title", "widget": "string"},
                    {"label": "Description", "name": "description", "widget": "string", "required": false},
                    {"label": "Body", "name": "body", "widget": "markdown"},
                    {"label": "Order", "name": "order", "widget": "number", "required": false},
                ]
            })
        );
    }

    #[tokio::test]
    async fn admin_redirects_to_bundled_ui() {
        let temp = tempdir().unwrap();

        let (status, headers, _) = get(test_app(temp.path()), "/admin").await;

        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(headers["location"], ADMIN_INDEX);
    }
}
