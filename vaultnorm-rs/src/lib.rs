//! vaultnorm - link normalization and metadata graph for Markdown vaults.
//!
//! # Overview
//!
//! A run scans a vault once, then for every note:
//! - Rewrites Markdown links to wikilinks and shortens wikilink targets
//!   (`vault` mode: shortest unique path suffix, `relative` mode: path from
//!   the linking note's folder)
//! - Rewrites attachment embeds relative to the linking note
//! - Collects frontmatter, tags, aliases, headings and outgoing links
//!
//! Outgoing links are then inverted into backlinks and the whole set is
//! written as a JSON metadata document.
//!
//! # Example
//!
//! ```no_run
//! use vaultnorm::graph::{write_metadata, MetadataBuilder, ResolveMode};
//! use vaultnorm::vault::VaultIndex;
//!
//! let index = VaultIndex::scan("/path/to/vault").unwrap();
//! let report = MetadataBuilder::new(&index, ResolveMode::Vault).build().unwrap();
//! write_metadata(&report.items, &index.root().join("metadata.json")).unwrap();
//! println!("{} notes, {} rewritten", report.items.len(), report.rewritten.len());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod note;
pub mod parser;
pub mod types;
pub mod vault;

// Re-export main types at crate root
pub use config::Config;
pub use error::{Result, VaultError};
pub use graph::{LinkNormalizer, MetadataBuilder, PathResolver, ResolveMode, RunReport};
pub use note::Note;
pub use types::*;
pub use vault::{VaultFile, VaultIndex};
