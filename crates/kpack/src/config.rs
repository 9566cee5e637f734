//! `kpack.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kpack_server::ServerConfig;
use serde::Deserialize;

/// Configuration file structure (kpack.toml).
///
/// Every key is optional; missing keys keep the server defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    cms: CmsSection,
    #[serde(default)]
    oauth: OAuthSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SiteSection {
    root: Option<PathBuf>,
    url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CmsSection {
    repo: Option<String>,
    branch: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct OAuthSection {
    authorize_url: Option<String>,
    token_url: Option<String>,
}

impl ConfigFile {
    /// Merge onto the server defaults.
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();

        ServerConfig {
            root: self.site.root.unwrap_or(defaults.root),
            site_url: self.site.url.unwrap_or(defaults.site_url),
            host: self.server.host.unwrap_or(defaults.host),
            port: self.server.port.unwrap_or(defaults.port),
            repo: self.cms.repo.unwrap_or(defaults.repo),
            branch: self.cms.branch.unwrap_or(defaults.branch),
            authorize_url: self.oauth.authorize_url.unwrap_or(defaults.authorize_url),
            token_url: self.oauth.token_url.unwrap_or(defaults.token_url),
            watch: defaults.watch,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}
