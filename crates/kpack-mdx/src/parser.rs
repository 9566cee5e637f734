//! MDX document parser.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed MDX document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Headings in document order
    pub headings: Vec<Heading>,

    /// Prose blocks, each tagged with the heading it sits under
    pub blocks: Vec<TextBlock>,
}

/// A document heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    /// Anchor ID
    pub id: String,
    /// Heading text
    pub content: String,
}

/// A block of plain text: a paragraph, list item or table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    /// Anchor ID of the closest preceding heading
    pub heading: Option<String>,
    /// Block text with inline markup stripped
    pub content: String,
}

/// Errors that can occur when parsing MDX.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// What the event loop is currently collecting text for.
enum Capture {
    None,
    Heading(String),
    Block(String),
}

/// Parse an MDX document.
///
/// Code blocks, raw HTML and JSX are skipped. Headings are kept, and so is
/// the text of paragraphs, list items and table rows.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let mut headings: Vec<Heading> = Vec::new();
    let mut blocks = Vec::new();

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut capture = Capture::None;
    let mut in_code_block = false;

    for event in Parser::new_ext(content, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,

            Event::Start(Tag::Heading { .. }) => {
                flush_block(&mut capture, &headings, &mut blocks);
                capture = Capture::Heading(String::new());
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Capture::Heading(text) = std::mem::replace(&mut capture, Capture::None) {
                    let text = text.trim().to_string();
                    headings.push(Heading {
                        id: unique_id(&headings, slugify(&text)),
                        content: text,
                    });
                }
            }

            // Tight list items carry their text without a paragraph, and a
            // nested list ends the text of the item that holds it.
            Event::Start(
                Tag::Paragraph | Tag::Item | Tag::TableHead | Tag::TableRow | Tag::List(_),
            ) => {
                flush_block(&mut capture, &headings, &mut blocks);
                capture = Capture::Block(String::new());
            }

            Event::End(
                TagEnd::Paragraph
                | TagEnd::Item
                | TagEnd::TableHead
                | TagEnd::TableRow
                | TagEnd::List(_),
            ) => flush_block(&mut capture, &headings, &mut blocks),

            Event::End(TagEnd::TableCell) => {
                if let Capture::Block(buf) = &mut capture {
                    buf.push(' ');
                }
            }

            Event::Text(text) | Event::Code(text) if !in_code_block => match &mut capture {
                Capture::Heading(buf) | Capture::Block(buf) => buf.push_str(&text),
                Capture::None => {}
            },

            Event::SoftBreak | Event::HardBreak => {
                if let Capture::Heading(buf) | Capture::Block(buf) = &mut capture {
                    buf.push(' ');
                }
            }

            _ => {}
        }
    }

    flush_block(&mut capture, &headings, &mut blocks);

    Ok(ParsedDoc {
        frontmatter,
        headings,
        blocks,
    })
}

/// Emit the open text block, if any, under the latest heading.
fn flush_block(capture: &mut Capture, headings: &[Heading], blocks: &mut Vec<TextBlock>) {
    let Capture::Block(buf) = capture else {
        return;
    };
    let text = buf.split_whitespace().collect::<Vec<_>>().join(" ");
    *capture = Capture::None;

    if !text.is_empty() {
        blocks.push(TextBlock {
            heading: headings.last().map(|h| h.id.clone()),
            content: text,
        });
    }
}

/// Suffix repeated anchors the way GitHub does (`setup`, `setup-1`, ...).
fn unique_id(existing: &[Heading], base: String) -> String {
    let taken = |id: &str| existing.iter().any(|h| h.id == id);

    if !taken(&base) {
        return base;
    }

    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
