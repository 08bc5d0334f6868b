use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::types::UnatlasConfig;

/// Write `config` as pretty JSON to a new file.
///
/// An existing file at `path` is never overwritten.
pub fn save_config(config: &UnatlasConfig, path: &Path) -> Result<()> {
    let mut content =
        serde_json::to_string_pretty(config).context("failed to serialize config to JSON")?;
    content.push('\n');

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("refusing to overwrite existing file: {}", path.display())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to create config file: {}", path.display()));
        }
    };

    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write config file: {}", path.display()))
}
