//! Server setup and routing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::env::Environment;
use crate::search::SearchIndex;
use crate::watcher::{ContentEvent, ContentWatcher};
use crate::{cms, content, oauth, search};

/// Quiet period after a content change before the search index is rebuilt.
const REINDEX_DEBOUNCE: Duration = Duration::from_millis(250);

/// Timeout for outbound requests to the OAuth provider.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the docs server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Site root holding `content/` and `public/`
    pub root: PathBuf,

    /// Public URL of the site, used for OAuth redirects
    pub site_url: String,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// GitHub repository the CMS commits to
    pub repo: String,

    /// Branch the CMS commits to
    pub branch: String,

    /// OAuth provider authorization endpoint
    pub authorize_url: String,

    /// OAuth provider token endpoint
    pub token_url: String,

    /// Rebuild the search index when content files change
    pub watch: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            site_url: "http://localhost:3001".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            repo: "mail-drafts7/fumadocs_decapcrm_setup".to_string(),
            branch: "main".to_string(),
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            watch: false,
        }
    }
}

impl ServerConfig {
    /// Directory holding the documentation pages.
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("content").join("docs")
    }

    /// Directory served as static files.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    /// Site URL without a trailing slash.
    pub fn site_base(&self) -> &str {
        self.site_url.trim_end_matches('/')
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// State shared by every handler.
pub struct ServerState {
    pub config: ServerConfig,
    pub env: Environment,
    pub http: reqwest::Client,
    pub search: RwLock<SearchIndex>,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(
        config: ServerConfig,
        env: Environment,
        index: SearchIndex,
    ) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| ServerError::HttpClient(e.to_string()))?;

        Ok(Self {
            config,
            env,
            http,
            search: RwLock::new(index),
        })
    }
}

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    let public = ServeDir::new(state.config.public_dir());

    Router::new()
        .route("/api/admin/config", get(cms::admin_config))
        .route("/api/decap-config", get(cms::decap_config))
        .route("/api/auth", get(oauth::authorize))
        .route("/api/auth/callback", get(oauth::callback))
        .route(
            "/api/docs/content",
            get(content::read_content).post(content::write_content),
        )
        .route("/api/search", get(search::search_handler))
        .route("/admin", get(cms::admin_redirect))
        .fallback_service(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Docs server.
pub struct Server {
    config: ServerConfig,
    env: Environment,
}

impl Server {
    /// Create a server reading secrets from the process environment.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            env: Environment::process(),
        }
    }

    /// Address the server will listen on.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.config.host, self.config.port);
        raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
    }

    /// Start serving. Runs until the listener fails.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.addr()?;

        let index = SearchIndex::load_or_empty(&self.config.docs_dir());
        tracing::info!("Indexed {} pages", index.len());

        let state = Arc::new(ServerState::new(self.config.clone(), self.env, index)?);

        if self.config.watch {
            spawn_reindexer(Arc::clone(&state))?;
        }

        let app = router(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Serving {} at http://{}", self.config.root.display(), addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Watch `content/` and rebuild the search index after changes settle.
fn spawn_reindexer(state: SharedState) -> Result<(), ServerError> {
    let content_dir = state.config.root.join("content");

    // The gateway may create content/ later; it has to exist to be watched.
    std::fs::create_dir_all(&content_dir).map_err(|e| {
        ServerError::WatchError(format!("creating {}: {}", content_dir.display(), e))
    })?;

    let (watcher, mut rx) = ContentWatcher::new(&[content_dir])
        .map_err(|e| ServerError::WatchError(e.to_string()))?;

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_event(&event);

            // Collapse a burst of events into one rebuild.
            tokio::time::sleep(REINDEX_DEBOUNCE).await;
            while let Ok(event) = rx.try_recv() {
                log_event(&event);
            }

            rebuild_index(&state).await;
        }
        // Keep watcher alive
        drop(watcher);
    });

    Ok(())
}

fn log_event(event: &ContentEvent) {
    match event {
        ContentEvent::Changed(path) => tracing::debug!("Content changed: {}", path.display()),
        ContentEvent::Removed(path) => tracing::debug!("Content removed: {}", path.display()),
    }
}

async fn rebuild_index(state: &SharedState) {
    let docs_dir = state.config.docs_dir();

    match tokio::task::spawn_blocking(move || SearchIndex::load_or_empty(&docs_dir)).await {
        Ok(index) => {
            tracing::info!("Reindexed {} pages", index.len());
            *state.search.write().await = index;
        }
        Err(e) => tracing::warn!("Search reindex task failed: {}", e),
    }
}
