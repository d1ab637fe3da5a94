//! Whole-vault pass: normalize every note, collect metadata, invert links.

use crate::error::{Result, VaultError};
use crate::graph::link_graph::LinkGraph;
use crate::graph::normalize::LinkNormalizer;
use crate::graph::resolution::{PathResolver, ResolveMode};
use crate::note::{write_file, Note};
use crate::parser::code_block::CodeMasker;
use crate::parser::document::parse_document;
use crate::parser::heading::parse_headings;
use crate::parser::link::{WikiBody, MD_LINK, WIKILINK};
use crate::types::{LinkEntry, MetadataItem};
use crate::vault::{file_name_of, stem_of, VaultFile, VaultIndex};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// A note that could not be read or written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub relative_path: String,
    pub message: String,
}

impl FileFailure {
    fn new(relative_path: &str, err: &VaultError) -> Self {
        Self {
            relative_path: relative_path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of one run over a vault.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One item per readable note, in scan order, backlinks filled in.
    pub items: Vec<MetadataItem>,

    /// Notes whose body changed (or would change, in a dry run).
    pub rewritten: Vec<String>,

    pub failures: Vec<FileFailure>,

    /// Wikilinks kept verbatim because their name matched several notes.
    pub ambiguous: usize,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Per-note outcome before aggregation.
#[derive(Debug)]
struct ProcessedNote {
    item: MetadataItem,
    changed: bool,
    ambiguous: usize,
    write_error: Option<VaultError>,
}

/// Drives normalization and metadata collection over a scanned vault.
#[derive(Debug, Clone, Copy)]
pub struct MetadataBuilder<'a> {
    index: &'a VaultIndex,
    mode: ResolveMode,
    threads: Option<usize>,
    dry_run: bool,
}

impl<'a> MetadataBuilder<'a> {
    pub fn new(index: &'a VaultIndex, mode: ResolveMode) -> Self {
        Self {
            index,
            mode,
            threads: None,
            dry_run: false,
        }
    }

    /// Worker thread count. `None` uses the rayon default.
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Compute everything but leave notes untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process every note and return the aggregated report.
    ///
    /// Notes are processed in parallel; the item order is the scan order.
    /// Read and write failures are recorded per note and never stop the run.
    pub fn build(&self) -> Result<RunReport> {
        let normalizer = LinkNormalizer::new(PathResolver::new(self.index, self.mode));
        let notes = self.index.list_notes();

        info!(
            root = %self.index.root().display(),
            notes = notes.len(),
            mode = ?self.mode,
            dry_run = self.dry_run,
            "normalizing vault"
        );

        let outcomes: Vec<Result<ProcessedNote>> = self.install(|| {
            notes
                .par_iter()
                .map(|file| self.process_note(&normalizer, file))
                .collect()
        })?;

        let mut report = RunReport::default();
        for (file, outcome) in notes.iter().zip(outcomes) {
            match outcome {
                Ok(processed) => {
                    report.ambiguous += processed.ambiguous;
                    match processed.write_error {
                        Some(err) => {
                            warn!(note = %file.relative, error = %err, "failed to write note");
                            report.failures.push(FileFailure::new(&file.relative, &err));
                        }
                        None if processed.changed => report.rewritten.push(file.relative.clone()),
                        None => {}
                    }
                    report.items.push(processed.item);
                }
                Err(err) => {
                    warn!(note = %file.relative, error = %err, "failed to read note");
                    report.failures.push(FileFailure::new(&file.relative, &err));
                }
            }
        }

        let graph = LinkGraph::from_items(&report.items);
        graph.apply(&mut report.items);

        info!(
            items = report.items.len(),
            rewritten = report.rewritten.len(),
            linked = graph.target_count(),
            failures = report.failures.len(),
            ambiguous = report.ambiguous,
            "vault pass complete"
        );

        Ok(report)
    }

    /// Run `op` on a dedicated pool when a thread count is configured.
    fn install<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| VaultError::Other(format!("Failed to start worker pool: {}", e)))?;
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }

    fn process_note(&self, normalizer: &LinkNormalizer<'_>, file: &VaultFile) -> Result<ProcessedNote> {
        let mut note = Note::load(file)?;
        let doc = parse_document(&note.content);

        let normalized = normalizer.normalize(&file.relative, doc.body);
        let changed = normalized.body != doc.body;
        let rewritten = changed.then(|| format!("{}{}", doc.head, normalized.body));

        let mut item = MetadataItem::new(&file.stem, &file.relative);
        item.tags = doc.tags;
        item.aliases = doc.aliases;
        item.frontmatter = doc.frontmatter;
        item.headings = parse_headings(&normalized.body);
        item.links = extract_links(normalizer.resolver(), &file.relative, &normalized.body);

        debug!(
            note = %file.relative,
            changed,
            links = item.links.len(),
            headings = item.headings.len(),
            "processed note"
        );

        let write_error = match rewritten {
            Some(content) if !self.dry_run => note.save(content).err(),
            _ => None,
        };

        Ok(ProcessedNote {
            item,
            changed,
            ambiguous: normalized.ambiguous,
            write_error,
        })
    }
}

/// Collect the graph edges of a normalized body.
///
/// Wikilinks (not embeds) whose target is a scanned note become note or
/// anchor entries. Markdown `[text](#anchor)` links become anchor entries on
/// the note itself. Entries are deduplicated by (link, target, display text).
pub fn extract_links(resolver: &PathResolver<'_>, current: &str, body: &str) -> Vec<LinkEntry> {
    let masked = CodeMasker::mask(body);
    let mut links = Vec::new();

    for caps in WIKILINK.captures_iter(&masked.text) {
        if !caps["bang"].is_empty() {
            continue;
        }
        let raw = &caps["body"];
        let Some(metadata_path) = resolver
            .resolve_note(current, raw)
            .and_then(|target| target.metadata_path)
        else {
            continue;
        };

        let wiki = WikiBody::parse(raw);
        let entry = match wiki.anchor {
            Some(anchor) => {
                let clean = stem_of(&metadata_path).to_string();
                LinkEntry::anchor(anchor, metadata_path, clean)
            }
            None => LinkEntry::note(file_name_of(wiki.target_part.trim()), metadata_path),
        };
        links.push(entry.with_display_text(wiki.alias.map(|a| masked.restore(a))));
    }

    for caps in MD_LINK.captures_iter(&masked.text) {
        let Some(anchor) = caps["url"].trim().strip_prefix('#') else {
            continue;
        };
        let text = masked.restore(caps["text"].trim());
        let display = if text.is_empty() { anchor.to_string() } else { text };
        links.push(
            LinkEntry::anchor(anchor, current, stem_of(current)).with_display_text(Some(display)),
        );
    }

    dedup_links(links)
}

fn dedup_links(links: Vec<LinkEntry>) -> Vec<LinkEntry> {
    let mut unique: Vec<LinkEntry> = Vec::with_capacity(links.len());
    for link in links {
        if !unique.iter().any(|seen| seen.dedup_key() == link.dedup_key()) {
            unique.push(link);
        }
    }
    unique
}

/// Serialize items as the metadata document: pretty JSON, trailing newline.
pub fn to_json(items: &[MetadataItem]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(items)?;
    json.push('\n');
    Ok(json)
}

/// Write the metadata document.
pub fn write_metadata(items: &[MetadataItem], output: &Path) -> Result<()> {
    write_file(output, &to_json(items)?)
}
