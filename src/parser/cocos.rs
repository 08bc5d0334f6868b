//! Cocos2d sprite sheet `.plist` descriptors (formats 0 through 3).
//!
//! Geometry in formats 1+ is stored as strings such as `{{x,y},{w,h}}`.
//! Frame sizes are always written unrotated, so rotated frames have their
//! width and height swapped to describe the region actually stored in the
//! atlas. Packers rotate sprites 90° clockwise; undoing that is -90°.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};

use super::{AtlasParser, read_descriptor, resolve_atlas_path};
use crate::descriptor::{AtlasDescriptor, Rect, Size, SpriteEntry};
use crate::error::DescriptorError;

const UNROTATE_DEGREES: i32 = -90;

/// Parser for atlas type `cc`
#[derive(Debug, Clone, Copy, Default)]
pub struct CocosPlistParser;

impl AtlasParser for CocosPlistParser {
    fn description(&self) -> &str {
        "Cocos2d sprite sheet plist (formats 0-3)"
    }

    fn parse(&self, descriptor_path: &Path) -> Result<AtlasDescriptor, DescriptorError> {
        let bytes = read_descriptor(descriptor_path)?;
        let root = Value::from_reader(Cursor::new(bytes)).map_err(|e| DescriptorError::Plist {
            path: descriptor_path.to_path_buf(),
            source: e,
        })?;

        let root = root
            .as_dictionary()
            .ok_or_else(|| DescriptorError::InvalidValue {
                path: descriptor_path.to_path_buf(),
                field: "root".to_string(),
                value: "expected a dictionary".to_string(),
            })?;

        let metadata = root.get("metadata").and_then(Value::as_dictionary);
        let format = metadata
            .and_then(|m| m.get("format"))
            .and_then(Value::as_signed_integer)
            .unwrap_or(0);

        let frames = root
            .get("frames")
            .and_then(Value::as_dictionary)
            .ok_or_else(|| DescriptorError::MissingField {
                path: descriptor_path.to_path_buf(),
                field: "frames".to_string(),
            })?;

        let mut descriptor = AtlasDescriptor::new(atlas_path(descriptor_path, metadata));

        for (name, value) in frames.iter() {
            let dict = value
                .as_dictionary()
                .ok_or_else(|| DescriptorError::InvalidValue {
                    path: descriptor_path.to_path_buf(),
                    field: format!("frames.{}", name),
                    value: "expected a dictionary".to_string(),
                })?;

            let frame = FrameReader {
                path: descriptor_path,
                name,
                dict,
            };

            let entry = match format {
                0 => frame.format0()?,
                1 | 2 => frame.format2()?,
                3 => frame.format3()?,
                other => {
                    return Err(DescriptorError::UnsupportedFormat {
                        path: descriptor_path.to_path_buf(),
                        format: other,
                    });
                }
            };
            descriptor.items.push(entry);
        }

        Ok(descriptor)
    }
}

fn atlas_path(descriptor_path: &Path, metadata: Option<&Dictionary>) -> PathBuf {
    let texture = metadata.and_then(|m| {
        ["realTextureFileName", "textureFileName"]
            .into_iter()
            .find_map(|key| m.get(key).and_then(Value::as_string))
            .filter(|name| !name.is_empty())
    });

    match texture {
        Some(name) => resolve_atlas_path(descriptor_path, name),
        None => descriptor_path.with_extension("png"),
    }
}

/// Typed access to one entry of the `frames` dictionary
struct FrameReader<'a> {
    path: &'a Path,
    name: &'a str,
    dict: &'a Dictionary,
}

impl FrameReader<'_> {
    fn format0(&self) -> Result<SpriteEntry, DescriptorError> {
        let frame = Rect::new(
            self.pixels("x", self.number("x")?)?,
            self.pixels("y", self.number("y")?)?,
            self.pixels("width", self.number("width")?)?,
            self.pixels("height", self.number("height")?)?,
        );
        let source_size = Size::new(
            self.pixels("originalWidth", self.number("originalWidth")?.abs())?,
            self.pixels("originalHeight", self.number("originalHeight")?.abs())?,
        );
        let offset = (self.number("offsetX")?, self.number("offsetY")?);

        Ok(SpriteEntry {
            name: self.name.to_string(),
            frame,
            rotated: false,
            degree: 0,
            source_size,
            source_color_rect: self.centered_rect(frame.size(), source_size, offset)?,
        })
    }

    fn format2(&self) -> Result<SpriteEntry, DescriptorError> {
        let rotated = self.flag("rotated");
        let frame = self.rect("frame")?;
        let source_size = self.size("sourceSize")?;
        let source_color_rect = match self.dict.get("sourceColorRect") {
            Some(_) => self.rect("sourceColorRect")?,
            None => self.centered_rect(frame.size(), source_size, self.point("offset")?)?,
        };

        Ok(self.entry(frame, rotated, source_size, source_color_rect))
    }

    fn format3(&self) -> Result<SpriteEntry, DescriptorError> {
        let rotated = self.flag("textureRotated");
        let frame = self.rect("textureRect")?;
        let sprite_size = match self.dict.get("spriteSize") {
            Some(_) => self.size("spriteSize")?,
            None => frame.size(),
        };
        let source_size = self.size("spriteSourceSize")?;
        let source_color_rect =
            self.centered_rect(sprite_size, source_size, self.point("spriteOffset")?)?;

        Ok(self.entry(frame, rotated, source_size, source_color_rect))
    }

    fn entry(
        &self,
        frame: Rect,
        rotated: bool,
        source_size: Size,
        source_color_rect: Rect,
    ) -> SpriteEntry {
        let frame = if rotated {
            Rect::new(frame.x, frame.y, frame.height, frame.width)
        } else {
            frame
        };

        SpriteEntry {
            name: self.name.to_string(),
            frame,
            rotated,
            degree: if rotated { UNROTATE_DEGREES } else { 0 },
            source_size,
            source_color_rect,
        }
    }

    /// Colour rect from a center offset (y axis pointing up)
    fn centered_rect(
        &self,
        size: Size,
        source_size: Size,
        offset: (f64, f64),
    ) -> Result<Rect, DescriptorError> {
        let x = (f64::from(source_size.width) - f64::from(size.width)) / 2.0 + offset.0;
        let y = (f64::from(source_size.height) - f64::from(size.height)) / 2.0 - offset.1;

        Ok(Rect::new(
            self.pixels("offset", x)?,
            self.pixels("offset", y)?,
            size.width,
            size.height,
        ))
    }

    fn flag(&self, key: &str) -> bool {
        self.dict
            .get(key)
            .and_then(Value::as_boolean)
            .unwrap_or(false)
    }

    fn number(&self, key: &str) -> Result<f64, DescriptorError> {
        let value = self.get(key)?;
        value
            .as_real()
            .or_else(|| value.as_signed_integer().map(|n| n as f64))
            .or_else(|| value.as_string().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| self.invalid(key, &format!("{:?}", value)))
    }

    fn rect(&self, key: &str) -> Result<Rect, DescriptorError> {
        let [x, y, w, h] = self.numbers::<4>(key)?;
        Ok(Rect::new(
            self.pixels(key, x)?,
            self.pixels(key, y)?,
            self.pixels(key, w)?,
            self.pixels(key, h)?,
        ))
    }

    fn size(&self, key: &str) -> Result<Size, DescriptorError> {
        let [w, h] = self.numbers::<2>(key)?;
        Ok(Size::new(self.pixels(key, w)?, self.pixels(key, h)?))
    }

    fn point(&self, key: &str) -> Result<(f64, f64), DescriptorError> {
        let [x, y] = self.numbers::<2>(key)?;
        Ok((x, y))
    }

    /// Parse a brace-delimited list such as `{{1,2},{3,4}}`
    fn numbers<const N: usize>(&self, key: &str) -> Result<[f64; N], DescriptorError> {
        let raw = self
            .get(key)?
            .as_string()
            .ok_or_else(|| self.invalid(key, "expected a string"))?;

        let parsed: Vec<f64> = raw
            .split(|c: char| c == '{' || c == '}' || c == ',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|e| self.invalid(key, &format!("'{}' ({})", raw, e)))?;

        parsed
            .try_into()
            .map_err(|v: Vec<f64>| self.invalid(key, &format!("'{}' has {} numbers", raw, v.len())))
    }

    /// Round a coordinate to whole pixels, rejecting negative or out-of-range values
    fn pixels(&self, key: &str, value: f64) -> Result<u32, DescriptorError> {
        let rounded = value.round();
        if !rounded.is_finite() || rounded < 0.0 || rounded > f64::from(u32::MAX) {
            return Err(self.invalid(key, &value.to_string()));
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "range checked above"
        )]
        Ok(rounded as u32)
    }

    fn get(&self, key: &str) -> Result<&Value, DescriptorError> {
        self.dict
            .get(key)
            .ok_or_else(|| DescriptorError::MissingField {
                path: self.path.to_path_buf(),
                field: format!("frames.{}.{}", self.name, key),
            })
    }

    fn invalid(&self, key: &str, value: &str) -> DescriptorError {
        DescriptorError::InvalidValue {
            path: self.path.to_path_buf(),
            field: format!("frames.{}.{}", self.name, key),
            value: value.to_string(),
        }
    }
}
