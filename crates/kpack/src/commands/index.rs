//! Search index export command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kpack_server::{SearchIndex, ServerConfig};

/// Run the index command.
pub fn run(config: ServerConfig, output: &Path) -> Result<()> {
    let index = SearchIndex::build(&config.docs_dir())?;

    let json = serde_json::to_string_pretty(index.entries())
        .context("Failed to serialize search index")?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Indexed {} pages into {}", index.len(), output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_index_json() {
        let temp = tempdir().unwrap();
        let docs = temp.path().join("content/docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(
            docs.join("testing.mdx"),
            "---\ntitle: Testing\n---\n\n## Unit Testing\n",
        )
        .unwrap();

        let config = ServerConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        };
        let output = temp.path().join("search-index.json");

        run(config, &output).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json[0]["url"], "/docs/testing");
        assert_eq!(json[0]["structured_data"]["headings"][0]["id"], "unit-testing");
    }

    #[test]
    fn fails_without_docs_dir() {
        let temp = tempdir().unwrap();
        let config = ServerConfig {
            root: temp.path().to_path_buf(),
            ..Default::default()
        };

        assert!(run(config, &temp.path().join("out.json")).is_err());
    }
}
