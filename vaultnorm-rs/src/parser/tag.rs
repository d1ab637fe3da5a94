//! Inline tag parsing (#tag and #tag/subtag).

use crate::parser::code_block::CodeMasker;
use crate::parser::link::{MD_LINK, WIKILINK};
use regex::Regex;
use std::sync::LazyLock;

// Rust regex has no lookbehind, so the "not preceded by a word character"
// rule is matched as an explicit leading boundary.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])#([A-Za-z0-9/_-]+)").unwrap());

/// Parse inline tags from a note body, in order of appearance, without `#`.
///
/// Code spans, wikilinks and Markdown links are ignored, so anchors such as
/// `[[Note#Section]]` never produce tags.
pub fn parse_inline_tags(body: &str) -> Vec<String> {
    let masked = CodeMasker::mask(body);
    let without_wikilinks = WIKILINK.replace_all(&masked.text, " ");
    let scannable = MD_LINK.replace_all(&without_wikilinks, " ");

    TAG.captures_iter(&scannable)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Merge frontmatter tags with inline tags, keeping first-seen order.
pub fn merge_tags(frontmatter_tags: &[String], inline_tags: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(frontmatter_tags.len() + inline_tags.len());
    for tag in frontmatter_tags.iter().chain(inline_tags) {
        if !merged.contains(tag) {
            merged.push(tag.clone());
        }
    }
    merged
}
