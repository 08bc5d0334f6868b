pub mod batch;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod parser;
pub mod reconstruct;

pub use batch::{BatchReport, Dispatcher, FileOutcome, unpack};
pub use cli::{CliArgs, Command, CompressionLevel, UnpackArgs};
pub use descriptor::{AtlasDescriptor, Rect, Size, SpriteEntry};
pub use error::{DescriptorError, UnatlasError};
pub use parser::{
    AtlasParser, ParserRef, ParserRegistry, Registration, register_parser, registered_types,
    resolve_parser,
};
pub use reconstruct::{
    Reconstruction, ReconstructionWarning, Reconstructor, reconstruct, reconstruct_sprite,
};
