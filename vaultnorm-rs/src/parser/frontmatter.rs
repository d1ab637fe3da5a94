//! Minimal frontmatter parsing.
//!
//! Only flat `key: value` pairs and the `tags:` / `aliases:` block lists are
//! understood. Lines of any other shape are skipped.

use crate::types::Frontmatter;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FM_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*---\s*$").unwrap());

static FM_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(?:---|\.\.\.)\s*$").unwrap());

static LIST_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(tags|aliases)\s*:\s*$").unwrap());

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-\s*(.+?)\s*$").unwrap());

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z0-9_.-]+)\s*:\s*(.*)$").unwrap());

/// Frontmatter extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// Everything up to and including the closing delimiter line, verbatim.
    pub head: &'a str,
    /// Lines between the delimiters, if a block was found.
    pub yaml: Option<&'a str>,
    /// The content after the frontmatter block.
    pub body: &'a str,
}

/// Split content into the frontmatter block and the body.
///
/// The block must open on the first line and have a closing `---` or `...`
/// line; otherwise the whole content is body. `head` + `body` always equals
/// the input.
pub fn split_frontmatter(content: &str) -> FrontmatterSplit<'_> {
    let no_block = FrontmatterSplit {
        head: "",
        yaml: None,
        body: content,
    };

    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return no_block;
    };
    if !FM_START.is_match(first.trim_end_matches(['\n', '\r'])) {
        return no_block;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for raw_line in lines {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        if FM_END.is_match(line) {
            let head_end = offset + raw_line.len();
            return FrontmatterSplit {
                head: &content[..head_end],
                yaml: Some(content[yaml_start..offset].trim_end_matches(['\n', '\r'])),
                body: &content[head_end..],
            };
        }
        offset += raw_line.len();
    }

    no_block
}

/// Parse the lines of a frontmatter block.
///
/// Returns the field map plus deduplicated `tags` and `aliases`.
pub fn parse_frontmatter_block(yaml: &str) -> (Frontmatter, Vec<String>, Vec<String>) {
    let mut fm = Frontmatter::new();
    let mut list_key: Option<String> = None;

    for line in yaml.lines() {
        if let Some(cap) = LIST_KEY.captures(line) {
            let key = cap[1].to_string();
            fm.insert(key.clone(), Value::Array(Vec::new()));
            list_key = Some(key);
            continue;
        }

        if let Some(key) = &list_key {
            if let Some(cap) = LIST_ITEM.captures(line) {
                if let Some(Value::Array(items)) = fm.get_mut(key) {
                    items.push(Value::String(cap[1].to_string()));
                }
                continue;
            }
        }

        if let Some(cap) = KEY_VALUE.captures(line) {
            fm.insert(cap[1].to_string(), Value::String(cap[2].to_string()));
            list_key = None;
        }
    }

    let tags = list_field(&fm, "tags");
    let aliases = list_field(&fm, "aliases");
    (fm, tags, aliases)
}

fn list_field(fm: &Frontmatter, key: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(Value::Array(items)) = fm.get(key) {
        for item in items.iter().filter_map(Value::as_str) {
            if !out.iter().any(|existing| existing == item) {
                out.push(item.to_string());
            }
        }
    }
    out
}
