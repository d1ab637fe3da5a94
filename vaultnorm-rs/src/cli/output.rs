//! Output formatting for CLI commands.

use crate::error::Result;
use crate::graph::FileFailure;
use serde::Serialize;

/// Helper for printing command results.
pub struct Output {
    quiet: bool,
    verbose: u8,
}

impl Output {
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Print a serializable value as pretty JSON.
    pub fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a result line unless in quiet mode.
    pub fn message(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    /// Print extra detail when `-v` was given.
    pub fn detail(&self, message: &str) {
        if self.verbose > 0 && !self.quiet {
            eprintln!("{}", message);
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// Dry-run response showing what would change.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub action: String,
    pub vault: String,
    pub output: String,
    pub items: usize,
    pub rewritten: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
}
