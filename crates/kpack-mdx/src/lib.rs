//! MDX frontmatter and page outline extraction.
//!
//! Pages edited through the CMS are plain MDX files with a YAML frontmatter
//! block. This crate pulls out the frontmatter plus the headings and prose
//! that the search index is built from. It never renders HTML.

pub mod frontmatter;
pub mod parser;

pub use frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
pub use parser::{parse_mdx, Heading, ParseError, ParsedDoc, TextBlock};
