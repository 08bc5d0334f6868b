use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a descriptor file into an [`AtlasDescriptor`](crate::descriptor::AtlasDescriptor).
#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Descriptor file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read descriptor '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse plist descriptor '{path}': {source}")]
    Plist {
        path: PathBuf,
        source: plist::Error,
    },

    #[error("Failed to parse JSON descriptor '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Descriptor '{path}' is missing required field '{field}'")]
    MissingField { path: PathBuf, field: String },

    #[error("Descriptor '{path}' has invalid value for '{field}': {value}")]
    InvalidValue {
        path: PathBuf,
        field: String,
        value: String,
    },

    #[error("Descriptor '{path}' uses unsupported format version {format}")]
    UnsupportedFormat { path: PathBuf, format: i64 },
}

#[derive(Error, Debug)]
pub enum UnatlasError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("Unknown atlas type '{0}'")]
    UnknownAtlasType(String),

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to load atlas image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to save image '{path}': {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to compress PNG '{path}': {message}")]
    PngCompress { path: PathBuf, message: String },

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),
}

impl UnatlasError {
    /// True for environment failures that should stop a multi-file run
    /// rather than being reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UnatlasError::CreateDir { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}
