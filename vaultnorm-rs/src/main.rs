//! vaultnorm CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use vaultnorm::cli::args::{Cli, Commands};
use vaultnorm::cli::normalize;
use vaultnorm::cli::output::Output;
use vaultnorm::config::Config;
use vaultnorm::error::{ExitCode as VaultExitCode, VaultError};
use vaultnorm::logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(cli.quiet, cli.verbose);

    match run(&cli, &output) {
        Ok(code) => ExitCode::from(code.code() as u8),
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli, output: &Output) -> Result<VaultExitCode, VaultError> {
    match &cli.command {
        Commands::Normalize(args) => {
            let config = Config::load(&args.vault_root)?;
            logging::init(&config.log_level, cli.verbose, cli.quiet);
            normalize::run(args, &config, output)
        }
    }
}
