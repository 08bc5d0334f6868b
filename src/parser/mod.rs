mod cocos;
mod registry;
mod texturepacker;

use std::path::Path;

use crate::descriptor::AtlasDescriptor;
use crate::error::DescriptorError;

pub use cocos::CocosPlistParser;
pub use registry::{
    ParserRef, ParserRegistry, Registration, register_parser, registered_types, resolve_parser,
};
pub use texturepacker::TexturePackerJsonParser;

/// An adapter that understands one atlas descriptor format.
///
/// Implementations must be side-effect free apart from reading the
/// descriptor itself. Resolve the atlas image path relative to the
/// descriptor's directory so the result can be used from any working
/// directory.
pub trait AtlasParser: Send + Sync {
    /// Short human-readable label, shown by `unatlas formats`
    fn description(&self) -> &str;

    fn parse(&self, descriptor_path: &Path) -> Result<AtlasDescriptor, DescriptorError>;
}

/// Read a descriptor's raw bytes, mapping a missing file to `NotFound`.
pub(crate) fn read_descriptor(path: &Path) -> Result<Vec<u8>, DescriptorError> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DescriptorError::NotFound(path.to_path_buf())
        } else {
            DescriptorError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Join an atlas file name from a descriptor onto the descriptor's directory.
pub(crate) fn resolve_atlas_path(descriptor_path: &Path, image: &str) -> std::path::PathBuf {
    descriptor_path
        .parent()
        .map(|dir| dir.join(image))
        .unwrap_or_else(|| Path::new(image).to_path_buf())
}
