//! Run configuration.
//!
//! Settings are layered: built-in defaults, then the global config file
//! (`<config_dir>/vaultnorm/config.toml`), then `<vault>/.vaultnorm.toml`,
//! then command-line flags.

use crate::error::{Result, VaultError};
use crate::graph::ResolveMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the vault-local config file.
pub const VAULT_CONFIG_FILE: &str = ".vaultnorm.toml";

/// Default metadata document name, written at the vault root.
pub const DEFAULT_OUTPUT_FILE: &str = "metadata.json";

/// Default scan exclusions: any path with a dot-prefixed component
/// (`.obsidian`, `.git`, `.trash`).
pub const DEFAULT_EXCLUDE: &[&str] = &[".*", "*/.*"];

/// Effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Shortest-reference strategy for note links.
    pub shortest: ResolveMode,

    /// Metadata output path. `None` means `<vault>/metadata.json`.
    pub output: Option<PathBuf>,

    /// Default log level when `RUST_LOG` is not set.
    pub log_level: String,

    /// Worker threads for per-note processing. `None` lets rayon decide.
    pub threads: Option<usize>,

    /// Glob patterns (relative to the vault root) of files the scan skips.
    /// A config layer that sets this replaces the defaults.
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shortest: ResolveMode::Vault,
            output: None,
            log_level: "warn".to_string(),
            threads: None,
            exclude: DEFAULT_EXCLUDE.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// One config file layer. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub shortest: Option<ResolveMode>,
    pub output: Option<PathBuf>,
    pub log_level: Option<String>,
    pub threads: Option<usize>,
    pub exclude: Option<Vec<String>>,
}

impl ConfigFile {
    /// Read a config layer. A missing file is an empty layer.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        let layer: ConfigFile = toml::from_str(&text)
            .map_err(|e| VaultError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Ok(Some(layer))
    }
}

impl Config {
    /// Load the global and vault-local layers on top of the defaults.
    pub fn load(vault_root: &Path) -> Result<Self> {
        let mut config = Config::default();

        if let Some(global) = Self::global_config_path() {
            if let Some(layer) = ConfigFile::read(&global)? {
                config.apply(layer, Some(vault_root));
            }
        }

        if let Some(layer) = ConfigFile::read(&vault_root.join(VAULT_CONFIG_FILE))? {
            config.apply(layer, Some(vault_root));
        }

        config.validate()?;
        Ok(config)
    }

    /// Path of the global config file, if the platform has a config dir.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vaultnorm").join("config.toml"))
    }

    /// Merge a layer into this config. Relative `output` paths are taken
    /// relative to `base` when given.
    pub fn apply(&mut self, layer: ConfigFile, base: Option<&Path>) {
        if let Some(mode) = layer.shortest {
            self.shortest = mode;
        }
        if let Some(output) = layer.output {
            self.output = Some(match base {
                Some(base) if output.is_relative() => base.join(output),
                _ => output,
            });
        }
        if let Some(level) = layer.log_level {
            self.log_level = level;
        }
        if let Some(threads) = layer.threads {
            self.threads = Some(threads);
        }
        if let Some(exclude) = layer.exclude {
            self.exclude = exclude;
        }
    }

    /// Where the metadata document goes for a given vault.
    pub fn output_path(&self, vault_root: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| vault_root.join(DEFAULT_OUTPUT_FILE))
    }

    fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(VaultError::ConfigError(
                "threads must be at least 1".to_string(),
            ));
        }
        for pattern in &self.exclude {
            glob::Pattern::new(pattern)?;
        }
        Ok(())
    }
}
