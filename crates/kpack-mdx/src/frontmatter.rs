//! Frontmatter extraction and parsing.

use serde::Deserialize;

/// Frontmatter written by the CMS `docs` collection.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Frontmatter {
    /// Page title (required)
    pub title: String,

    /// Short summary shown under the title and used as search content
    #[serde(default)]
    pub description: Option<String>,

    /// Position in the page collection (lower = first)
    #[serde(default)]
    pub order: Option<i32>,

    /// Custom slug override
    #[serde(default)]
    pub slug: Option<String>,
}

/// Extract frontmatter from MDX content.
///
/// Returns the parsed frontmatter and the body that follows the closing
/// delimiter. Sources without a leading `---` have no frontmatter and are
/// returned untouched.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let trimmed = source.trim_start();

    let Some(after_open) = trimmed.strip_prefix("---") else {
        return Ok((None, source));
    };

    let Some(close_pos) = after_open.find("\n---") else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml = after_open[..close_pos].trim();

    // Skip the rest of the closing delimiter line.
    let rest = &after_open[close_pos + 4..];
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => "",
    };

    if yaml.is_empty() {
        return Err(FrontmatterError::MissingTitle);
    }

    let frontmatter: Frontmatter =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    if frontmatter.title.trim().is_empty() {
        return Err(FrontmatterError::MissingTitle);
    }

    Ok((Some(frontmatter), body.trim_start()))
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter has no title")]
    MissingTitle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_cms_frontmatter() {
        let source = r#"---
title: Getting Started
description: Welcome to Knowledge Pack
order: 1
---

# Quick Setup
"#;

        let (fm, body) = extract_frontmatter(source).unwrap();

        assert_eq!(
            fm.unwrap(),
            Frontmatter {
                title: "Getting Started".to_string(),
                description: Some("Welcome to Knowledge Pack".to_string()),
                order: Some(1),
                slug: None,
            }
        );
        assert!(body.starts_with("# Quick Setup"));
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let (fm, body) = extract_frontmatter(source).unwrap();

        assert!(fm.is_none());
        assert_eq!(body, source);
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let result = extract_frontmatter("---\ntitle: Test\n# No closing");

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let result = extract_frontmatter("---\ntitle: [invalid yaml\n---\n");

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_blank_title() {
        let result = extract_frontmatter("---\ntitle: \"  \"\n---\nbody");

        assert!(matches!(result, Err(FrontmatterError::MissingTitle)));
    }

    #[test]
    fn closing_delimiter_at_end_of_file() {
        let (fm, body) = extract_frontmatter("---\ntitle: Empty\n---").unwrap();

        assert_eq!(fm.unwrap().title, "Empty");
        assert_eq!(body, "");
    }
}
