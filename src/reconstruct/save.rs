use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::cli::CompressionLevel;
use crate::error::UnatlasError;

/// Save a sprite, encoding by the file extension (PNG when there is none).
///
/// PNG output is optionally recompressed with oxipng. Formats without an
/// alpha channel receive the RGB channels only.
pub fn save_sprite_image(
    image: &RgbaImage,
    path: &Path,
    compress: Option<CompressionLevel>,
) -> Result<(), UnatlasError> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);

    // Encode in memory
    let mut encoded = Cursor::new(Vec::new());
    let written = if matches!(format, ImageFormat::Jpeg) {
        DynamicImage::ImageRgba8(image.clone())
            .into_rgb8()
            .write_to(&mut encoded, format)
    } else {
        image.write_to(&mut encoded, format)
    };
    written.map_err(|e| UnatlasError::ImageSave {
        path: path.to_path_buf(),
        source: e,
    })?;

    let output_data = match (format, compress) {
        (ImageFormat::Png, Some(level)) => {
            let opts = match level {
                CompressionLevel::Level(n) => oxipng::Options::from_preset(n),
                CompressionLevel::Max => oxipng::Options::max_compression(),
            };
            oxipng::optimize_from_memory(&encoded.into_inner(), &opts).map_err(|e| {
                UnatlasError::PngCompress {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?
        }
        _ => encoded.into_inner(),
    };

    fs::write(path, output_data).map_err(|e| UnatlasError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(1, 1, Rgba([200, 10, 20, 128]));
        img
    }

    #[test]
    fn test_png_round_trip_keeps_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");

        save_sprite_image(&sample(), &path, None).unwrap();

        let loaded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_compressed_png_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");

        save_sprite_image(&sample(), &path, Some(CompressionLevel::Level(2))).unwrap();

        let loaded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_no_extension_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_01");

        save_sprite_image(&sample(), &path, None).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");

        save_sprite_image(&sample(), &path, None).unwrap();

        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (4, 3));
    }
}
