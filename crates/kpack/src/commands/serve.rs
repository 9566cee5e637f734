//! Docs server command.

use anyhow::{Context, Result};
use kpack_server::{Server, ServerConfig};

/// Run the serve command.
pub async fn run(config: ServerConfig, open: bool) -> Result<()> {
    if !config.root.join("content").exists() {
        tracing::warn!(
            "No content/ directory under {}. Run 'kpack init' first.",
            config.root.display()
        );
    }

    let server = Server::new(config);
    let addr = server.addr()?;

    if open {
        let url = format!("http://{}/admin", addr);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser: {}", e);
        }
    }

    server.start().await.context("Server stopped")?;

    Ok(())
}
