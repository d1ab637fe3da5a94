//! Heading extraction (ATX and Setext).

use crate::parser::code_block::{find_code_block_ranges, is_line_in_fenced_code_block};
use crate::types::Heading;
use regex::Regex;
use std::sync::LazyLock;

// ATX-style heading: # Heading, ## Heading ##, etc.
static ATX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})(?:[ \t]+(.+?))?(?:[ \t]+#+)?[ \t]*$").unwrap()
});

static SETEXT_H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*={3,}\s*$").unwrap());

static SETEXT_H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-{3,}\s*$").unwrap());

/// Extract headings from a note body in order of appearance.
///
/// Lines inside fenced code blocks are ignored. A Setext underline promotes
/// the previous line when that line is ordinary text.
pub fn parse_headings(content: &str) -> Vec<Heading> {
    let code_ranges = find_code_block_ranges(content);
    let mut headings = Vec::new();
    let mut prev_text: Option<&str> = None;

    for (line_idx, line) in content.lines().enumerate() {
        if is_line_in_fenced_code_block(line_idx + 1, &code_ranges) {
            prev_text = None;
            continue;
        }

        if let Some(cap) = ATX.captures(line) {
            let level = cap[1].len() as u8;
            let text = cap.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            if !text.is_empty() {
                headings.push(Heading::new(text, level));
            }
            prev_text = None;
            continue;
        }

        let setext_level = if SETEXT_H1.is_match(line) {
            Some(1)
        } else if SETEXT_H2.is_match(line) {
            Some(2)
        } else {
            None
        };

        match (setext_level, prev_text) {
            (Some(level), Some(text)) => {
                headings.push(Heading::new(text, level));
                prev_text = None;
            }
            (Some(_), None) => prev_text = None,
            (None, _) => {
                let trimmed = line.trim();
                prev_text = (!trimmed.is_empty()).then_some(trimmed);
            }
        }
    }

    headings
}
