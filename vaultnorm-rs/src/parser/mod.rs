//! Parsers for Obsidian markdown syntax.

pub mod code_block;
pub mod document;
pub mod frontmatter;
pub mod heading;
pub mod link;
pub mod tag;

pub use code_block::{find_code_block_ranges, CodeBlockRange, CodeMasker, MaskedText};
pub use document::{parse_document, ParsedDocument};
pub use frontmatter::{parse_frontmatter_block, split_frontmatter, FrontmatterSplit};
pub use heading::parse_headings;
pub use link::{format_wikilink, is_external_url, WikiBody, MD_LINK, WIKILINK};
pub use tag::{merge_tags, parse_inline_tags};
