//! Link normalization: Markdown links to wikilinks, then wikilink canonicalization.

use crate::graph::resolution::{is_media_target, PathResolver, Resolution, Unresolved};
use crate::parser::code_block::CodeMasker;
use crate::parser::link::{format_wikilink, is_external_url, WikiBody, MD_LINK, WIKILINK};
use regex::Captures;
use std::borrow::Cow;
use tracing::debug;

/// A rewritten note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub body: String,
    /// Wikilinks left verbatim because several notes matched.
    pub ambiguous: usize,
}

/// Rewrites the links of one note body at a time.
#[derive(Debug, Clone, Copy)]
pub struct LinkNormalizer<'a> {
    resolver: PathResolver<'a>,
}

impl<'a> LinkNormalizer<'a> {
    pub fn new(resolver: PathResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PathResolver<'a> {
        &self.resolver
    }

    /// Run both passes over `body` of the note at `current` (root-relative).
    /// Code spans are masked for the duration and come back untouched.
    pub fn normalize(&self, current: &str, body: &str) -> Normalized {
        let masked = CodeMasker::mask(body);
        let stage1 = self.markdown_to_wikilinks(current, &masked.text);
        let stage2 = self.canonicalize_wikilinks(current, &stage1);
        Normalized {
            body: masked.restore(&stage2.body),
            ambiguous: stage2.ambiguous,
        }
    }

    /// Convert `[text](url)` links that point into the vault to wikilinks.
    ///
    /// Anchors (`#x`), external URLs and empty targets stay as they are.
    /// Attachments (by extension or `!` prefix) become `![[path]]`, notes
    /// become `[[/path]]` with the rooted canonical target.
    pub fn markdown_to_wikilinks(&self, current: &str, text: &str) -> String {
        MD_LINK
            .replace_all(text, |caps: &Captures| {
                let url = caps["url"].trim();
                if url.starts_with('#') || is_external_url(url) {
                    return caps[0].to_string();
                }

                let url = percent_decode(url);
                let embed = !caps["bang"].is_empty() || is_media_target(&url);
                let target = if embed {
                    self.resolver.resolve_asset(current, &url)
                } else {
                    self.resolver.find_target_path(current, &url)
                };
                // `[[]]` is not a link; keep the original text
                if target.is_empty() {
                    return caps[0].to_string();
                }
                format_wikilink(embed, &target, None)
            })
            .into_owned()
    }

    /// Rewrite every wikilink target to its shortest form.
    ///
    /// A link whose written target already equals the computed one is kept
    /// byte-for-byte, alias and spacing included.
    pub fn canonicalize_wikilinks(&self, current: &str, text: &str) -> Normalized {
        let mut ambiguous = 0;

        let body = WIKILINK
            .replace_all(text, |caps: &Captures| {
                let wiki = WikiBody::parse(caps.name("body").map_or("", |m| m.as_str()));

                if !caps["bang"].is_empty() {
                    let asset = self.resolver.resolve_asset(current, wiki.target_part);
                    if asset.is_empty() || asset == wiki.target_part.trim() {
                        return caps[0].to_string();
                    }
                    return format_wikilink(true, &asset, wiki.alias);
                }

                let Some(target) = self.resolver.resolve_note(current, &caps["body"]) else {
                    return caps[0].to_string();
                };
                if let Resolution::Verbatim {
                    reason: Unresolved::Ambiguous(candidates),
                    ..
                } = target.resolution
                {
                    debug!(
                        from = current,
                        link = wiki.target,
                        candidates,
                        "ambiguous link target kept verbatim"
                    );
                    ambiguous += 1;
                }

                if target.text.is_empty() || target.text == wiki.target_part.trim() {
                    return caps[0].to_string();
                }
                format_wikilink(false, &target.text, wiki.alias)
            })
            .into_owned();

        Normalized { body, ambiguous }
    }
}

/// Decode `%XX` escapes; malformed input is returned as-is.
fn percent_decode(url: &str) -> Cow<'_, str> {
    urlencoding::decode(url).unwrap_or(Cow::Borrowed(url))
}
