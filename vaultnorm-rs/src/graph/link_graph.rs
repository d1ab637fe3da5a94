//! Backlink inversion over the finished metadata items.

use crate::types::{BacklinkEntry, MetadataItem};
use crate::vault::stem_of;
use std::collections::HashMap;

/// Incoming links, keyed by target note path.
#[derive(Debug, Default)]
pub struct LinkGraph {
    /// Map from target path to the distinct notes linking to it, in scan
    /// order of first appearance.
    incoming: HashMap<String, Vec<String>>,
}

impl LinkGraph {
    /// Invert every item's forward links.
    pub fn from_items(items: &[MetadataItem]) -> Self {
        let mut graph = LinkGraph::default();

        for item in items {
            for link in &item.links {
                let sources = graph.incoming.entry(link.relative_path.clone()).or_default();
                if !sources.contains(&item.relative_path) {
                    sources.push(item.relative_path.clone());
                }
            }
        }

        graph
    }

    /// Notes linking to `target`.
    pub fn sources(&self, target: &str) -> &[String] {
        self.incoming.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Backlink entries for `target`. `link` and `display_text` carry the
    /// target's own stem.
    pub fn backlinks_for(&self, target: &str) -> Vec<BacklinkEntry> {
        let this_name = stem_of(target);
        self.sources(target)
            .iter()
            .map(|src| BacklinkEntry {
                file_name: stem_of(src).to_string(),
                link: this_name.to_string(),
                relative_path: src.clone(),
                display_text: this_name.to_string(),
            })
            .collect()
    }

    /// Fill in the backlinks of every item.
    pub fn apply(&self, items: &mut [MetadataItem]) {
        for item in items.iter_mut() {
            item.backlinks = self.backlinks_for(&item.relative_path);
        }
    }

    /// Number of notes with at least one incoming link.
    pub fn target_count(&self) -> usize {
        self.incoming.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkEntry;

    fn item(rel: &str, links: Vec<LinkEntry>) -> MetadataItem {
        let mut item = MetadataItem::new(stem_of(rel), rel);
        item.links = links;
        item
    }

    #[test]
    fn test_backlinks_use_target_stem() {
        let mut items = vec![
            item("Root.md", vec![LinkEntry::note("Child", "Sub/Child.md")]),
            item("Sub/Child.md", vec![]),
        ];
        LinkGraph::from_items(&items).apply(&mut items);

        assert!(items[0].backlinks.is_empty());
        assert_eq!(
            items[1].backlinks,
            vec![BacklinkEntry {
                file_name: "Root".to_string(),
                link: "Child".to_string(),
                relative_path: "Root.md".to_string(),
                display_text: "Child".to_string(),
            }]
        );
    }

    #[test]
    fn test_distinct_sources_in_scan_order() {
        let items = vec![
            item(
                "b.md",
                vec![
                    LinkEntry::note("t", "t.md"),
                    LinkEntry::anchor("H", "t.md", "t"),
                ],
            ),
            item("a.md", vec![LinkEntry::note("t", "t.md")]),
            item("t.md", vec![]),
        ];
        let graph = LinkGraph::from_items(&items);
        assert_eq!(graph.sources("t.md"), ["b.md".to_string(), "a.md".to_string()]);
        assert_eq!(graph.backlinks_for("t.md").len(), 2);
        assert_eq!(graph.target_count(), 1);
    }

    #[test]
    fn test_self_anchor_is_a_backlink() {
        let mut items = vec![item(
            "Notes/A.md",
            vec![LinkEntry::anchor("Intro", "Notes/A.md", "A")
                .with_display_text(Some("text".to_string()))],
        )];
        LinkGraph::from_items(&items).apply(&mut items);
        assert_eq!(items[0].backlinks.len(), 1);
        assert_eq!(items[0].backlinks[0].relative_path, "Notes/A.md");
    }

    #[test]
    fn test_symmetry() {
        let mut items = vec![
            item("a.md", vec![LinkEntry::note("b", "b.md")]),
            item("b.md", vec![LinkEntry::note("c", "x/c.md")]),
            item("x/c.md", vec![]),
        ];
        LinkGraph::from_items(&items).apply(&mut items);
        for source in &items {
            for link in &source.links {
                let target = items
                    .iter()
                    .find(|i| i.relative_path == link.relative_path)
                    .unwrap();
                assert!(target
                    .backlinks
                    .iter()
                    .any(|b| b.relative_path == source.relative_path));
            }
        }
    }
}
