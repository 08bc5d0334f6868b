use std::fs;
use std::path::{Component, Path, PathBuf};

use image::{ImageReader, RgbaImage, imageops};
use log::{debug, info, warn};
use thiserror::Error;

use super::save_sprite_image;
use crate::cli::CompressionLevel;
use crate::descriptor::{AtlasDescriptor, Size, SpriteEntry};
use crate::error::UnatlasError;

/// A sprite entry that was skipped; the rest of the atlas is still unpacked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Skipped sprite '{sprite}': {reason}")]
pub struct ReconstructionWarning {
    pub sprite: String,
    pub reason: String,
}

impl ReconstructionWarning {
    fn new(entry: &SpriteEntry, reason: impl Into<String>) -> Self {
        Self {
            sprite: entry.name.clone(),
            reason: reason.into(),
        }
    }
}

/// Result of unpacking one atlas
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    /// Files written, in descriptor order
    pub written: Vec<PathBuf>,
    pub warnings: Vec<ReconstructionWarning>,
}

/// Unpacks atlases described by an [`AtlasDescriptor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstructor {
    pub compress: Option<CompressionLevel>,
}

impl Reconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compress(mut self, compress: Option<CompressionLevel>) -> Self {
        self.compress = compress;
        self
    }

    /// Write every sprite of `descriptor` into the atlas output directory.
    ///
    /// Entries with unusable geometry are skipped and reported as warnings.
    /// Loading the atlas, creating directories and saving images fail the
    /// whole call.
    pub fn reconstruct(
        &self,
        descriptor: &AtlasDescriptor,
    ) -> Result<Reconstruction, UnatlasError> {
        let atlas = load_atlas(&descriptor.atlas_path)?;

        let output_dir = descriptor.output_dir();
        create_dir(&output_dir)?;

        let mut result = Reconstruction::default();

        for entry in &descriptor.items {
            let sprite = output_path(&output_dir, entry)
                .and_then(|path| reconstruct_sprite(&atlas, entry).map(|img| (path, img)));

            let (path, image) = match sprite {
                Ok(sprite) => sprite,
                Err(warning) => {
                    warn!("{}", warning);
                    result.warnings.push(warning);
                    continue;
                }
            };

            // Names may contain subdirectories
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }

            save_sprite_image(&image, &path, self.compress)?;
            debug!("Wrote {} ({}x{})", path.display(), image.width(), image.height());
            result.written.push(path);
        }

        info!(
            "Unpacked {} of {} sprites from {}",
            result.written.len(),
            descriptor.items.len(),
            descriptor.atlas_path.display()
        );

        Ok(result)
    }
}

/// Unpack one atlas with default options
pub fn reconstruct(descriptor: &AtlasDescriptor) -> Result<Reconstruction, UnatlasError> {
    Reconstructor::default().reconstruct(descriptor)
}

/// Restore a single sprite from the atlas: crop, undo rotation, re-pad trim.
pub fn reconstruct_sprite(
    atlas: &RgbaImage,
    entry: &SpriteEntry,
) -> Result<RgbaImage, ReconstructionWarning> {
    let frame = entry.frame;
    if frame.size().is_empty() {
        return Err(ReconstructionWarning::new(
            entry,
            format!("zero-area frame {}x{}", frame.width, frame.height),
        ));
    }

    let (atlas_width, atlas_height) = atlas.dimensions();
    if !frame.fits_within(Size::new(atlas_width, atlas_height)) {
        return Err(ReconstructionWarning::new(
            entry,
            format!(
                "frame ({}, {}, {}x{}) lies outside the {}x{} atlas",
                frame.x, frame.y, frame.width, frame.height, atlas_width, atlas_height
            ),
        ));
    }

    if entry.rotated && entry.degree.rem_euclid(90) != 0 {
        return Err(ReconstructionWarning::new(
            entry,
            format!("unsupported rotation of {} degrees", entry.degree),
        ));
    }

    let color = entry.source_color_rect;
    let restored = entry.restored_size();
    if restored != color.size() {
        return Err(ReconstructionWarning::new(
            entry,
            format!(
                "restored size {}x{} does not match trimmed size {}x{}",
                restored.width, restored.height, color.width, color.height
            ),
        ));
    }

    let cropped =
        imageops::crop_imm(atlas, frame.x, frame.y, frame.width, frame.height).to_image();

    let sprite = if entry.rotated {
        rotate(&cropped, entry.degree)
    } else {
        cropped
    };

    if !entry.was_trimmed() {
        return Ok(sprite);
    }

    if !color.fits_within(entry.source_size) {
        return Err(ReconstructionWarning::new(
            entry,
            format!(
                "trimmed region ({}, {}, {}x{}) does not fit the {}x{} source size",
                color.x,
                color.y,
                color.width,
                color.height,
                entry.source_size.width,
                entry.source_size.height
            ),
        ));
    }

    let mut canvas = RgbaImage::new(entry.source_size.width, entry.source_size.height);
    imageops::replace(&mut canvas, &sprite, i64::from(color.x), i64::from(color.y));
    Ok(canvas)
}

/// Rotate clockwise by a multiple of 90 degrees
fn rotate(image: &RgbaImage, degree: i32) -> RgbaImage {
    match degree.rem_euclid(360) {
        90 => imageops::rotate90(image),
        180 => imageops::rotate180(image),
        270 => imageops::rotate270(image),
        _ => image.clone(),
    }
}

/// Output file for an entry, refusing names that would leave `output_dir`.
fn output_path(
    output_dir: &Path,
    entry: &SpriteEntry,
) -> Result<PathBuf, ReconstructionWarning> {
    let name = Path::new(&entry.name);
    let escapes = name
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let has_file = name
        .components()
        .any(|c| matches!(c, Component::Normal(_)));

    if entry.name.is_empty() || !has_file {
        return Err(ReconstructionWarning::new(entry, "empty output name"));
    }
    if escapes {
        return Err(ReconstructionWarning::new(
            entry,
            "output name escapes the atlas output directory",
        ));
    }

    Ok(output_dir.join(name))
}

fn load_atlas(path: &Path) -> Result<RgbaImage, UnatlasError> {
    let img = ImageReader::open(path)
        .map_err(|e| UnatlasError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .with_guessed_format()
        .map_err(|e| UnatlasError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .decode()
        .map_err(|e| UnatlasError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?
        .into_rgba8();
    Ok(img)
}

// Idempotent: an existing directory is not an error.
fn create_dir(path: &Path) -> Result<(), UnatlasError> {
    fs::create_dir_all(path).map_err(|e| UnatlasError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}
