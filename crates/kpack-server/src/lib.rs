//! HTTP backend for Knowledge Pack docs.
//!
//! Serves the public directory and the bundled CMS admin UI, and exposes the
//! endpoints the CMS needs: content file read/write, CMS configuration, the
//! GitHub OAuth bridge and page search.

pub mod cms;
pub mod content;
pub mod env;
pub mod error;
pub mod oauth;
pub mod search;
pub mod server;
pub mod watcher;

#[cfg(test)]
mod test_helpers;

pub use cms::CmsConfig;
pub use env::Environment;
pub use error::ApiError;
pub use search::{IndexError, SearchIndex, SearchResult};
pub use server::{router, Server, ServerConfig, ServerError, ServerState, SharedState};
pub use watcher::{ContentEvent, ContentWatcher};
