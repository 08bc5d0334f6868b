use serde::{Deserialize, Serialize};

/// Highest config `version` this build understands
pub const CONFIG_VERSION: u32 = 1;

/// PNG compression level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompressConfig {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression ("max")
    Max(String),
}

/// Unpacker configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnatlasConfig {
    /// Config file version
    pub version: u32,
    /// Descriptor files, directories or glob patterns
    pub input: Vec<String>,
    /// Registered atlas type to parse with ("cc", "json", ...)
    pub atlas_type: String,
    /// Override the file-name pattern used when walking directories
    pub pattern: Option<String>,
    /// PNG compression for written sprites (optional)
    pub compress: Option<CompressConfig>,
}

impl Default for UnatlasConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            input: Vec::new(),
            atlas_type: "cc".to_string(),
            pattern: None,
            compress: None,
        }
    }
}
