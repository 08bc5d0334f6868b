use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{AtlasParser, read_descriptor, resolve_atlas_path};
use crate::descriptor::{AtlasDescriptor, Rect, Size, SpriteEntry};
use crate::error::DescriptorError;

/// Rotated frames are stored 90° clockwise
const UNROTATE_DEGREES: i32 = -90;

#[derive(Deserialize)]
struct TpDocument {
    frames: Value,
    #[serde(default)]
    meta: TpMeta,
}

#[derive(Deserialize, Default)]
struct TpMeta {
    image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TpFrame {
    frame: TpRect,
    #[serde(default)]
    rotated: bool,
    sprite_source_size: Option<TpRect>,
    source_size: Option<TpSize>,
}

/// Array-layout entry: the frame plus its name
#[derive(Deserialize)]
struct TpNamedFrame {
    filename: String,
    #[serde(flatten)]
    frame: TpFrame,
}

#[derive(Deserialize, Clone, Copy)]
struct TpRect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Deserialize, Clone, Copy)]
struct TpSize {
    w: u32,
    h: u32,
}

/// Parser for atlas type `json`: TexturePacker "JSON (Hash)" and "JSON (Array)"
#[derive(Debug, Clone, Copy, Default)]
pub struct TexturePackerJsonParser;

impl AtlasParser for TexturePackerJsonParser {
    fn description(&self) -> &str {
        "TexturePacker JSON (hash or array)"
    }

    fn parse(&self, descriptor_path: &Path) -> Result<AtlasDescriptor, DescriptorError> {
        let bytes = read_descriptor(descriptor_path)?;
        let document: TpDocument =
            serde_json::from_slice(&bytes).map_err(|e| DescriptorError::Json {
                path: descriptor_path.to_path_buf(),
                source: e,
            })?;

        let atlas_path = match document.meta.image.as_deref() {
            Some(image) if !image.is_empty() => resolve_atlas_path(descriptor_path, image),
            _ => descriptor_path.with_extension("png"),
        };
        let mut descriptor = AtlasDescriptor::new(atlas_path);

        match document.frames {
            Value::Object(map) => {
                for (name, value) in map {
                    let frame: TpFrame = serde_json::from_value(value).map_err(|e| {
                        DescriptorError::InvalidValue {
                            path: descriptor_path.to_path_buf(),
                            field: format!("frames.{}", name),
                            value: e.to_string(),
                        }
                    })?;
                    descriptor.items.push(to_entry(name, &frame));
                }
            }
            Value::Array(list) => {
                for (index, value) in list.into_iter().enumerate() {
                    let named: TpNamedFrame = serde_json::from_value(value).map_err(|e| {
                        DescriptorError::InvalidValue {
                            path: descriptor_path.to_path_buf(),
                            field: format!("frames[{}]", index),
                            value: e.to_string(),
                        }
                    })?;
                    descriptor.items.push(to_entry(named.filename, &named.frame));
                }
            }
            other => {
                return Err(DescriptorError::InvalidValue {
                    path: descriptor_path.to_path_buf(),
                    field: "frames".to_string(),
                    value: format!("expected an object or array, got {}", other),
                });
            }
        }

        Ok(descriptor)
    }
}

fn to_entry(name: String, tp: &TpFrame) -> SpriteEntry {
    let f = tp.frame;
    // `frame.w/h` is the unrotated size; the region in the atlas is swapped
    let frame = if tp.rotated {
        Rect::new(f.x, f.y, f.h, f.w)
    } else {
        Rect::new(f.x, f.y, f.w, f.h)
    };

    let source_color_rect = tp
        .sprite_source_size
        .map(|s| Rect::new(s.x, s.y, s.w, s.h))
        .unwrap_or_else(|| Rect::new(0, 0, f.w, f.h));
    let source_size = tp
        .source_size
        .map(|s| Size::new(s.w, s.h))
        .unwrap_or_else(|| Size::new(f.w, f.h));

    SpriteEntry {
        name,
        frame,
        rotated: tp.rotated,
        degree: if tp.rotated { UNROTATE_DEGREES } else { 0 },
        source_size,
        source_color_rect,
    }
}
