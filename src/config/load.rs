use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::warn;

use super::types::{CONFIG_VERSION, CompressConfig, UnatlasConfig};
use crate::cli::CompressionLevel;

/// A loaded configuration file with its associated directory.
///
/// Input paths in the config are relative to the config file location.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: UnatlasConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load and validate a config file.
    ///
    /// Files written by a newer unatlas (higher `version`) and an empty
    /// `atlas_type` are rejected here rather than at dispatch time.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: UnatlasConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if config.version > CONFIG_VERSION {
            bail!(
                "config version {} is newer than the supported version {}",
                config.version,
                CONFIG_VERSION
            );
        }
        if config.atlas_type.trim().is_empty() {
            bail!("config has an empty atlas_type");
        }

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Expand `input` entries into descriptor files and directories.
    ///
    /// Entries are joined onto the config directory. Globs expand in
    /// sorted order and a glob matching nothing is logged. A path listed
    /// more than once is kept only at its first position so no atlas is
    /// unpacked twice in the same run.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut results: Vec<PathBuf> = Vec::new();
        let mut push = |path: PathBuf| {
            if !results.contains(&path) {
                results.push(path);
            }
        };

        for entry in &self.config.input {
            let joined = self.config_dir.join(entry);
            if !is_glob_pattern(entry) {
                push(joined);
                continue;
            }

            let mut matched = glob::glob(&joined.to_string_lossy())
                .with_context(|| format!("invalid glob pattern in input: {}", entry))?
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to expand input: {}", entry))?;
            matched.sort();

            if matched.is_empty() {
                warn!("Input pattern '{}' matched nothing", entry);
            }
            matched.into_iter().for_each(&mut push);
        }

        Ok(results)
    }

    /// Compression level from the config, if any.
    pub fn compression(&self) -> Result<Option<CompressionLevel>> {
        self.config
            .compress
            .as_ref()
            .map(|c| match c {
                CompressConfig::Level(n) => n.to_string().parse(),
                CompressConfig::Max(s) => s.parse(),
            })
            .transpose()
            .map_err(|e: String| anyhow::anyhow!("invalid compress value in config: {}", e))
    }
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
