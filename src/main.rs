use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use unatlas::batch::Dispatcher;
use unatlas::cli::{CliArgs, Command, CompressionLevel, UnpackArgs};
use unatlas::config::{LoadedConfig, UnatlasConfig, save_config};
use unatlas::parser::{ParserRef, register_parser, registered_types, resolve_parser};
use unatlas::reconstruct::Reconstructor;

#[allow(clippy::print_stderr)]
fn main() {
    if let Err(e) = run() {
        // Use eprintln instead of error! because logger may not be initialized
        // (e.g., config loading fails before logger init)
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CliArgs::parse();

    match cli.command {
        Command::Unpack(args) => unpack(&args),
        Command::Formats => {
            list_formats();
            Ok(())
        }
        Command::Init { path } => {
            save_config(&UnatlasConfig::default(), &path)?;
            init_logger(false);
            info!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn unpack(args: &UnpackArgs) -> Result<()> {
    let merged = merge_config_with_args(args)?;

    init_logger(merged.verbose);

    info!("unatlas v{}", env!("CARGO_PKG_VERSION"));

    if let Some(pattern) = &merged.pattern {
        let existing = resolve_parser(&merged.atlas_type)?;
        register_parser(&merged.atlas_type, existing.parser, pattern)?;
    }
    let registration = resolve_parser(&merged.atlas_type)?;

    let dispatcher = Dispatcher::new(Reconstructor::new().compress(merged.compress));
    let report = dispatcher.unpack_all(&merged.input, &ParserRef::Resolved(registration))?;

    let base = std::env::current_dir().unwrap_or_default();
    let with_warnings = report
        .outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|r| (&o.descriptor, r.warnings.len())))
        .filter(|(_, skipped)| *skipped > 0);
    for (descriptor, skipped) in with_warnings {
        warn!(
            "{}: skipped {} sprite(s)",
            descriptor.strip_prefix(&base).unwrap_or(descriptor).display(),
            skipped
        );
    }

    if let Some(fatal) = report.fatal() {
        bail!("cannot continue: {}", fatal);
    }

    info!(
        "Done! {} sprite(s) from {} atlas(es), {} file(s) failed",
        report.written(),
        report.succeeded().count(),
        report.failed().count()
    );

    Ok(())
}

#[allow(clippy::print_stdout)]
fn list_formats() {
    for (atlas_type, registration) in registered_types() {
        println!(
            "{:<8} {:<12} {}",
            atlas_type,
            registration.pattern.as_str(),
            registration.parser.description()
        );
    }
}

fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Merged configuration from CLI args and optional config file.
struct MergedConfig {
    input: Vec<PathBuf>,
    atlas_type: String,
    pattern: Option<String>,
    compress: Option<CompressionLevel>,
    verbose: bool,
}

/// Merge config file values with CLI arguments.
/// CLI arguments always take precedence over config values.
fn merge_config_with_args(args: &UnpackArgs) -> Result<MergedConfig> {
    let loaded_config = if let Some(config_path) = &args.config {
        Some(
            LoadedConfig::load(config_path)
                .with_context(|| format!("failed to load config: {}", config_path.display()))?,
        )
    } else {
        None
    };

    // Determine input paths: CLI args override config
    let input = if !args.input.is_empty() {
        args.input.clone()
    } else if let Some(ref lc) = loaded_config {
        lc.resolve_inputs()
            .context("failed to resolve input files from config")?
    } else {
        // This shouldn't happen due to clap's required_unless_present
        Vec::new()
    };

    if input.is_empty() {
        bail!("no input files or directories given");
    }

    // Atlas type: CLI > config > default
    let atlas_type = args.atlas_type.clone().unwrap_or_else(|| {
        loaded_config
            .as_ref()
            .map(|lc| lc.config.atlas_type.clone())
            .unwrap_or_else(|| "cc".to_string())
    });

    let pattern = args.pattern.clone().or_else(|| {
        loaded_config
            .as_ref()
            .and_then(|lc| lc.config.pattern.clone())
    });

    // Compress: CLI option overrides config
    let compress = if args.compress.is_some() {
        args.compress
    } else if let Some(ref lc) = loaded_config {
        lc.compression()?
    } else {
        None
    };

    Ok(MergedConfig {
        input,
        atlas_type,
        pattern,
        compress,
        verbose: args.verbose,
    })
}
