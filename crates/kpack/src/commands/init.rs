//! Scaffold a docs site: sample pages plus the CMS admin bundle.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kpack_server::{CmsConfig, Environment, ServerConfig};

/// Run the init command.
pub fn run(config: ServerConfig, config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing Knowledge Pack in {}...", config.root.display());

    let docs_dir = config.docs_dir();
    if docs_dir.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            docs_dir.display()
        );
        return Ok(());
    }

    // Secrets stay in the environment, never in the committed admin config.
    let cms = CmsConfig::generate(&config, &Environment::empty());
    let admin_config =
        serde_yaml::to_string(&cms).context("Failed to render CMS admin config")?;

    let admin_dir = config.public_dir().join("admin");
    let files = [
        (config_path.to_path_buf(), DEFAULT_CONFIG.to_string()),
        (docs_dir.join("getting-started.mdx"), DEFAULT_GETTING_STARTED.to_string()),
        (docs_dir.join("testing.mdx"), DEFAULT_TESTING.to_string()),
        (admin_dir.join("config.yml"), admin_config),
        (admin_dir.join("index.html"), ADMIN_INDEX_HTML.to_string()),
    ];

    for (path, content) in &files {
        if path.exists() && !yes {
            tracing::info!("Keeping existing {}", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    let images_dir = config.public_dir().join("images");
    fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    tracing::info!("Initialization complete!");
    tracing::info!("Set GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET, then run 'kpack serve'.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Knowledge Pack configuration

[site]
# Directory containing content/ and public/
root = "."

# Public URL, used for the OAuth callback
url = "http://localhost:3001"

[server]
host = "127.0.0.1"
port = 3001

[cms]
# Repository and branch the CMS commits to
repo = "mail-drafts7/fumadocs_decapcrm_setup"
branch = "main"
"#;

const DEFAULT_GETTING_STARTED: &str = r#"---
title: Getting Started
description: Welcome to Knowledge Pack
order: 1
---

## Quick Setup

Follow these steps to get started.

## Prerequisites

Node.js 16+ installed and basic knowledge of React.

## Installation

```bash
npm install @knowledgepack/core
```

## Configuration

Configure your Knowledge Pack settings.
"#;

const DEFAULT_TESTING: &str = r#"---
title: Testing
description: Testing strategies for your Knowledge Pack implementation
order: 2
---

## Unit Testing

Test individual components and functions in isolation.

## Integration Testing

Verify how different parts work together.

## End-to-End Testing

Test complete user workflows using Playwright or Cypress.
"#;

const ADMIN_INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Content Manager</title>
</head>
<body>
  <script src="https://unpkg.com/decap-cms@^3.0.0/dist/decap-cms.js"></script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> ServerConfig {
        ServerConfig {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn scaffolds_site() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("kpack.toml");

        run(config_for(temp.path()), &config_path, false).unwrap();

        assert!(config_path.exists());
        assert!(temp.path().join("content/docs/getting-started.mdx").exists());
        assert!(temp.path().join("public/admin/index.html").exists());
        assert!(temp.path().join("public/images").is_dir());

        let yaml = fs::read_to_string(temp.path().join("public/admin/config.yml")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["backend"]["name"].as_str(), Some("github"));
        assert!(value["backend"].get("client_id").is_none());
        assert_eq!(value["collections"][0]["folder"].as_str(), Some("content/docs"));
    }

    #[test]
    fn keeps_existing_content_without_yes() {
        let temp = tempdir().unwrap();
        let page = temp.path().join("content/docs/getting-started.mdx");
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, "mine").unwrap();

        run(config_for(temp.path()), &temp.path().join("kpack.toml"), false).unwrap();

        assert_eq!(fs::read_to_string(&page).unwrap(), "mine");
        assert!(!temp.path().join("public").exists());
    }

    #[test]
    fn overwrites_with_yes() {
        let temp = tempdir().unwrap();
        let page = temp.path().join("content/docs/getting-started.mdx");
        fs::create_dir_all(page.parent().unwrap()).unwrap();
        fs::write(&page, "mine").unwrap();

        run(config_for(temp.path()), &temp.path().join("kpack.toml"), true).unwrap();

        assert_eq!(fs::read_to_string(&page).unwrap(), DEFAULT_GETTING_STARTED);
    }
}
