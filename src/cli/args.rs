use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unatlas")]
#[command(version, about = "Sprite atlas unpacker", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rebuild the sprites of one or more atlases
    Unpack(UnpackArgs),
    /// List the registered atlas types
    Formats,
    /// Write a default config file
    Init {
        /// Where to write the config [default: unatlas.json]
        #[arg(default_value = "unatlas.json")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct UnpackArgs {
    /// Descriptor files or directories (searched recursively)
    #[arg(required_unless_present = "config")]
    pub input: Vec<PathBuf>,

    /// Load settings from a config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Atlas type to parse ("cc" for Cocos2d plist, "json" for TexturePacker JSON) [default: cc]
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub atlas_type: Option<String>,

    /// File-name pattern for descriptors when walking directories (e.g. "*_hd.plist")
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Compress PNG output (0-6 or 'max'). Default level is 2 if flag is present without value.
    #[arg(long, value_name = "LEVEL", default_missing_value = "2", num_args = 0..=1)]
    pub compress: Option<CompressionLevel>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// PNG compression level (0-6 or max)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    /// Optimization level 0-6
    Level(u8),
    /// Maximum compression
    Max,
}

impl std::str::FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(CompressionLevel::Max)
        } else {
            s.parse::<u8>()
                .map_err(|_e| format!("invalid compression level: {}", s))
                .and_then(|n| {
                    if n <= 6 {
                        Ok(CompressionLevel::Level(n))
                    } else {
                        Err(format!("compression level must be 0-6 or 'max', got {}", n))
                    }
                })
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        CompressionLevel::Level(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unpack_args() {
        let cli = CliArgs::try_parse_from([
            "unatlas", "unpack", "assets", "-t", "json", "--compress", "--pattern", "*.tp.json",
        ])
        .unwrap();

        let Command::Unpack(args) = cli.command else {
            panic!("expected unpack");
        };
        assert_eq!(args.input, vec![PathBuf::from("assets")]);
        assert_eq!(args.atlas_type.as_deref(), Some("json"));
        assert_eq!(args.pattern.as_deref(), Some("*.tp.json"));
        assert_eq!(args.compress, Some(CompressionLevel::Level(2)));
    }

    #[test]
    fn test_unpack_requires_input_or_config() {
        assert!(CliArgs::try_parse_from(["unatlas", "unpack"]).is_err());
        assert!(CliArgs::try_parse_from(["unatlas", "unpack", "-c", "unatlas.json"]).is_ok());
    }

    #[test]
    fn test_compression_level_from_str() {
        assert_eq!("max".parse::<CompressionLevel>(), Ok(CompressionLevel::Max));
        assert_eq!("MAX".parse::<CompressionLevel>(), Ok(CompressionLevel::Max));
        assert_eq!("0".parse::<CompressionLevel>(), Ok(CompressionLevel::Level(0)));
        assert!("7".parse::<CompressionLevel>().is_err());
        assert!("fast".parse::<CompressionLevel>().is_err());
    }
}
