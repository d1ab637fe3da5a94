//! Link resolution, normalization and the metadata graph.

mod link_graph;
pub mod metadata;
pub mod normalize;
pub mod resolution;

pub use link_graph::LinkGraph;
pub use metadata::{extract_links, to_json, write_metadata, FileFailure, MetadataBuilder, RunReport};
pub use normalize::{LinkNormalizer, Normalized};
pub use resolution::{NoteTarget, PathResolver, Resolution, ResolveMode, Unresolved};
