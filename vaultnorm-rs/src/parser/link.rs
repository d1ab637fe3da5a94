//! Wikilink and Markdown link syntax.

use regex::Regex;
use std::sync::LazyLock;

/// `[text](url)` with an optional `!` image prefix.
pub static MD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<bang>!?)\[(?P<text>[^\]]*)\]\((?P<url>[^)]+)\)").unwrap()
});

/// `[[body]]` with an optional `!` embed prefix. The body is everything up to
/// the first `]]`, including any `#anchor` and `|alias`.
pub static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<bang>!?)\[\[(?P<body>.+?)\]\]").unwrap());

// A URL scheme (`https:`, `mailto:`) or a protocol-relative `//` prefix
static EXTERNAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*:|//)").unwrap());

/// The parts of a wikilink body: `target#anchor|alias`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WikiBody<'a> {
    /// Everything before the first `|` (target plus anchor).
    pub target_part: &'a str,
    /// The target path, without anchor.
    pub target: &'a str,
    /// Text after the first `#` of the target part.
    pub anchor: Option<&'a str>,
    /// Text after the first `|`.
    pub alias: Option<&'a str>,
}

impl<'a> WikiBody<'a> {
    pub fn parse(body: &'a str) -> Self {
        let (target_part, alias) = match body.split_once('|') {
            Some((t, a)) => (t, Some(a)),
            None => (body, None),
        };
        let (target, anchor) = match target_part.split_once('#') {
            Some((t, a)) => (t, Some(a)),
            None => (target_part, None),
        };
        Self {
            target_part,
            target,
            anchor,
            alias,
        }
    }
}

/// Whether a Markdown link URL points outside the vault.
pub fn is_external_url(url: &str) -> bool {
    EXTERNAL_URL.is_match(url)
}

/// Format a wikilink or embed.
pub fn format_wikilink(embed: bool, target: &str, alias: Option<&str>) -> String {
    let mut result = String::with_capacity(target.len() + 6);
    if embed {
        result.push('!');
    }
    result.push_str("[[");
    result.push_str(target);
    if let Some(alias) = alias {
        result.push('|');
        result.push_str(alias);
    }
    result.push_str("]]");
    result
}
