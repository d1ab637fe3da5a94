//! CLI argument definitions using clap.

use crate::graph::ResolveMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vaultnorm")]
#[command(author, version, about = "Normalize links in a Markdown vault and build its metadata graph", long_about = None)]
pub struct Cli {
    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (can be repeated)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite links in place and write the metadata document
    Normalize(NormalizeArgs),
}

#[derive(clap::Args, Debug)]
pub struct NormalizeArgs {
    /// Root folder of the vault
    pub vault_root: PathBuf,

    /// Metadata output path (default: <VAULT_ROOT>/metadata.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How note links are shortened
    #[arg(long, value_enum, alias = "mode")]
    pub shortest: Option<ResolveMode>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Worker threads for per-note processing
    #[arg(short = 'j', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub threads: Option<usize>,
}
