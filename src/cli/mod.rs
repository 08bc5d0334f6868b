mod args;

pub use args::{CliArgs, Command, CompressionLevel, UnpackArgs};
