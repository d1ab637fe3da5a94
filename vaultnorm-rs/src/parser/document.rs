//! Whole-note parsing: frontmatter, tags and aliases.

use crate::parser::frontmatter::{parse_frontmatter_block, split_frontmatter};
use crate::parser::tag::{merge_tags, parse_inline_tags};
use crate::types::Frontmatter;

/// A note split into its frontmatter head and body, with parsed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument<'a> {
    /// Frontmatter block, delimiters included, exactly as written.
    pub head: &'a str,
    pub frontmatter: Frontmatter,
    /// Frontmatter tags followed by inline tags, deduplicated.
    pub tags: Vec<String>,
    pub aliases: Vec<String>,
    /// Everything after the frontmatter block.
    pub body: &'a str,
}

/// Parse a note's raw text.
pub fn parse_document(text: &str) -> ParsedDocument<'_> {
    let split = split_frontmatter(text);

    let (frontmatter, fm_tags, aliases) = match split.yaml {
        Some(yaml) => parse_frontmatter_block(yaml),
        None => (Frontmatter::new(), Vec::new(), Vec::new()),
    };

    let inline = parse_inline_tags(split.body);
    let tags = merge_tags(&fm_tags, &inline);

    ParsedDocument {
        head: split.head,
        frontmatter,
        tags,
        aliases,
        body: split.body,
    }
}
