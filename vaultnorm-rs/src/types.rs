//! Shared types for vaultnorm.

use serde::{Deserialize, Serialize};

/// Flat frontmatter fields in first-seen order.
///
/// Values are either strings (`key: value`) or string lists (`tags:` / `aliases:`).
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

/// A heading found in a note body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// The heading text (without the `#` markers or Setext underline).
    pub heading: String,

    /// The heading level (1-6).
    pub level: u8,
}

impl Heading {
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
        }
    }
}

/// An outgoing link recorded in the metadata graph.
///
/// Note links carry the target's basename in `link`. Anchor links carry
/// `#anchor` in `link` and the target's stem in `clean_link`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    pub link: String,

    /// Root-relative path of the target note, extension included.
    pub relative_path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl LinkEntry {
    /// A link to a whole note.
    pub fn note(link: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            relative_path: relative_path.into(),
            clean_link: None,
            display_text: None,
        }
    }

    /// A link to an anchor inside a note.
    pub fn anchor(
        anchor: &str,
        relative_path: impl Into<String>,
        clean_link: impl Into<String>,
    ) -> Self {
        Self {
            link: format!("#{}", anchor),
            relative_path: relative_path.into(),
            clean_link: Some(clean_link.into()),
            display_text: None,
        }
    }

    pub fn with_display_text(mut self, display_text: Option<String>) -> Self {
        self.display_text = display_text.filter(|s| !s.is_empty());
        self
    }

    /// Key used to deduplicate link entries within one note.
    pub fn dedup_key(&self) -> (&str, &str, Option<&str>) {
        (
            &self.link,
            &self.relative_path,
            self.display_text.as_deref(),
        )
    }
}

/// An incoming link, derived after all notes have been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkEntry {
    /// Stem of the source note.
    pub file_name: String,

    /// Stem of the note that owns this backlink.
    pub link: String,

    /// Root-relative path of the source note.
    pub relative_path: String,

    pub display_text: String,
}

/// Aggregated metadata for one note, as written to `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataItem {
    pub file_name: String,

    pub relative_path: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub frontmatter: Frontmatter,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<Heading>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backlinks: Vec<BacklinkEntry>,
}

impl MetadataItem {
    pub fn new(file_name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            relative_path: relative_path.into(),
            tags: Vec::new(),
            aliases: Vec::new(),
            frontmatter: Frontmatter::new(),
            headings: Vec::new(),
            links: Vec::new(),
            backlinks: Vec::new(),
        }
    }
}
