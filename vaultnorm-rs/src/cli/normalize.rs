//! Normalize command implementation.

use crate::cli::args::NormalizeArgs;
use crate::cli::output::{DryRunResponse, Output};
use crate::config::Config;
use crate::error::{ExitCode, Result};
use crate::graph::{write_metadata, MetadataBuilder};
use crate::vault::VaultIndex;

pub fn run(args: &NormalizeArgs, config: &Config, output: &Output) -> Result<ExitCode> {
    let index = VaultIndex::scan_with_exclusions(&args.vault_root, &config.exclude)?;
    run_with_index(&index, args, config, output)
}

/// Normalize an already scanned vault and write its metadata document.
///
/// Per-note failures are reported through [`ExitCode::FilesFailed`]; the
/// document is still written for every note that could be read.
pub fn run_with_index(
    index: &VaultIndex,
    args: &NormalizeArgs,
    config: &Config,
    output: &Output,
) -> Result<ExitCode> {
    let mode = args.shortest.unwrap_or(config.shortest);
    let out_path = match &args.output {
        Some(path) => path.clone(),
        None => config.output_path(index.root()),
    };

    let report = MetadataBuilder::new(index, mode)
        .threads(args.threads.or(config.threads))
        .dry_run(args.dry_run)
        .build()?;

    if args.dry_run {
        output.print(&DryRunResponse {
            action: "normalize".to_string(),
            vault: index.root().display().to_string(),
            output: out_path.display().to_string(),
            items: report.items.len(),
            rewritten: report.rewritten.clone(),
            failures: report.failures.clone(),
        })?;
    } else {
        write_metadata(&report.items, &out_path)?;
        output.message(&format!(
            "Wrote {} with {} items",
            out_path.display(),
            report.items.len()
        ));
        output.detail(&format!(
            "Rewrote {} notes, {} failed, {} ambiguous links kept as typed",
            report.rewritten.len(),
            report.failures.len(),
            report.ambiguous
        ));
    }

    Ok(if report.has_failures() {
        ExitCode::FilesFailed
    } else {
        ExitCode::Success
    })
}
