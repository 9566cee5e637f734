//! Keyword search over the documentation pages.
//!
//! Each MDX page under `content/docs` becomes one index entry carrying its
//! title, description and outline. Queries are plain case-insensitive
//! substring matches; there is no ranking.

use std::fs;
use std::path::{Path, PathBuf};

use axum::{
    extract::{Query, State},
    Json,
};
use kpack_mdx::{parse_mdx, Heading, TextBlock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::server::SharedState;

/// URL prefix pages are served under.
pub const DOCS_BASE_URL: &str = "/docs";

/// Pages without an explicit order sort after ordered ones.
const DEFAULT_ORDER: i32 = 999;

/// Outline data attached to an entry.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StructuredData {
    pub headings: Vec<Heading>,
    pub contents: Vec<TextBlock>,
}

/// One page in the index.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    /// Page description, empty when the page has none
    pub content: String,
    pub structured_data: StructuredData,
    pub url: String,
    #[serde(skip)]
    order: i32,
}

/// Kind of match a result represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Page,
    Heading,
    Text,
}

/// A search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub content: String,
}

/// Errors that can occur while building the index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Docs directory not found: {0}")]
    MissingDir(PathBuf),
}

/// In-memory page index.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Index every `.md`/`.mdx` file below `docs_dir`.
    ///
    /// Pages that fail to read or parse are skipped with a warning so one
    /// bad edit cannot take search down.
    pub fn build(docs_dir: &Path) -> Result<Self, IndexError> {
        if !docs_dir.is_dir() {
            return Err(IndexError::MissingDir(docs_dir.to_path_buf()));
        }

        let sources: Vec<PathBuf> = WalkDir::new(docs_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_page(p))
            .collect();

        let mut entries: Vec<IndexEntry> = sources
            .par_iter()
            .filter_map(|path| match index_page(docs_dir, path) {
                Ok(entry) => Some(entry),
                Err(message) => {
                    tracing::warn!("Skipping {}: {}", path.display(), message);
                    None
                }
            })
            .collect();

        entries.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.url.cmp(&b.url)));

        Ok(Self { entries })
    }

    /// Like [`SearchIndex::build`], but a missing directory yields an empty index.
    pub fn load_or_empty(docs_dir: &Path) -> Self {
        Self::build(docs_dir).unwrap_or_else(|e| {
            tracing::warn!("{}; search index is empty", e);
            Self::default()
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find pages, headings and paragraphs containing `query`.
    ///
    /// Results are grouped per page: the page itself first, then its
    /// matching headings and paragraphs in document order.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let matches = |text: &str| text.to_lowercase().contains(&needle);

        let mut results = Vec::new();

        for entry in &self.entries {
            let mut hits = Vec::new();

            for heading in &entry.structured_data.headings {
                if matches(&heading.content) {
                    hits.push((
                        ResultKind::Heading,
                        format!("{}#{}", entry.url, heading.id),
                        heading.content.clone(),
                    ));
                }
            }

            for block in &entry.structured_data.contents {
                if matches(&block.content) {
                    let url = match &block.heading {
                        Some(id) => format!("{}#{}", entry.url, id),
                        None => entry.url.clone(),
                    };
                    hits.push((ResultKind::Text, url, block.content.clone()));
                }
            }

            let page_hit = matches(&entry.title) || matches(&entry.content);
            if !page_hit && hits.is_empty() {
                continue;
            }

            results.push(SearchResult {
                id: entry.id.clone(),
                url: entry.url.clone(),
                kind: ResultKind::Page,
                content: entry.title.clone(),
            });

            results.extend(
                hits.into_iter()
                    .enumerate()
                    .map(|(i, (kind, url, content))| SearchResult {
                        id: format!("{}-{}", entry.id, i),
                        url,
                        kind,
                        content,
                    }),
            );
        }

        results
    }
}

fn is_page(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("mdx")
    )
}

fn index_page(docs_dir: &Path, path: &Path) -> Result<IndexEntry, String> {
    let source = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc = parse_mdx(&source).map_err(|e| e.to_string())?;

    let relative = path.strip_prefix(docs_dir).unwrap_or(path);
    let frontmatter = doc.frontmatter.unwrap_or_default();

    let url = page_url(relative, frontmatter.slug.as_deref());
    let title = if frontmatter.title.is_empty() {
        relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string()
    } else {
        frontmatter.title
    };

    Ok(IndexEntry {
        id: url.clone(),
        title,
        content: frontmatter.description.unwrap_or_default(),
        structured_data: StructuredData {
            headings: doc.headings,
            contents: doc.blocks,
        },
        url,
        order: frontmatter.order.unwrap_or(DEFAULT_ORDER),
    })
}

/// URL for a page given its path relative to the docs directory.
///
/// `guides/setup.mdx` maps to `/docs/guides/setup`, `guides/index.mdx` to
/// `/docs/guides`. A frontmatter slug replaces the file stem.
pub fn page_url(relative: &Path, slug: Option<&str>) -> String {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .map(str::to_string)
        .collect();

    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index");

    match slug.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        Some(slug) => segments.push(slug.to_string()),
        None if stem != "index" => segments.push(stem.to_string()),
        None => {}
    }

    if segments.is_empty() {
        DOCS_BASE_URL.to_string()
    } else {
        format!("{}/{}", DOCS_BASE_URL, segments.join("/"))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

/// `GET /api/search?query=...`
pub async fn search_handler(
    State(state): State<SharedState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let query = params.query.unwrap_or_default();
    let index = state.search.read().await;

    Json(index.search(&query))
}
