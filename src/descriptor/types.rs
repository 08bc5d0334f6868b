use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Rect, Size};

/// Placement of a single sprite inside a packed atlas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteEntry {
    /// Output file name, relative to the atlas output directory
    pub name: String,
    /// Region of the atlas holding the sprite, as stored (post-rotation)
    pub frame: Rect,
    /// True if the stored pixels are rotated relative to the sprite's natural orientation
    pub rotated: bool,
    /// Clockwise angle in degrees that restores the natural orientation
    pub degree: i32,
    /// Original size before trimming
    pub source_size: Size,
    /// Offset and size of the trimmed region within the untrimmed canvas
    pub source_color_rect: Rect,
}

impl SpriteEntry {
    /// Returns true if transparent borders were stripped before packing.
    ///
    /// Only sizes are compared; a colour rect at a non-zero offset with
    /// full source size still counts as untrimmed.
    pub fn was_trimmed(&self) -> bool {
        self.source_color_rect.size() != self.source_size
    }

    /// Size of the cropped frame once the stored rotation is undone
    pub fn restored_size(&self) -> Size {
        let frame = self.frame.size();
        if self.rotated && self.degree.rem_euclid(180) == 90 {
            frame.swapped()
        } else {
            frame
        }
    }
}

/// Everything needed to unpack one atlas image
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// The packed sheet
    pub atlas_path: PathBuf,
    /// Sprite placements in descriptor order
    pub items: Vec<SpriteEntry>,
}

impl AtlasDescriptor {
    pub fn new(atlas_path: impl Into<PathBuf>) -> Self {
        Self {
            atlas_path: atlas_path.into(),
            items: Vec::new(),
        }
    }

    /// Directory the sprites are written to: the atlas path minus its extension.
    pub fn output_dir(&self) -> PathBuf {
        self.atlas_path.with_extension("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(frame: Rect, rotated: bool, degree: i32) -> SpriteEntry {
        SpriteEntry {
            name: "hero.png".to_string(),
            frame,
            rotated,
            degree,
            source_size: Size::new(50, 30),
            source_color_rect: Rect::new(0, 0, 50, 30),
        }
    }

    #[test]
    fn test_output_dir_strips_extension() {
        let desc = AtlasDescriptor::new("/assets/ui/sheet.png");
        assert_eq!(desc.output_dir(), PathBuf::from("/assets/ui/sheet"));
    }

    #[test]
    fn test_output_dir_only_strips_last_extension() {
        let desc = AtlasDescriptor::new("/assets/ui.v2/sheet.hd.png");
        assert_eq!(desc.output_dir(), PathBuf::from("/assets/ui.v2/sheet.hd"));
    }

    #[test]
    fn test_was_trimmed_compares_size_not_offset() {
        let mut e = entry(Rect::new(0, 0, 50, 30), false, 0);
        assert!(!e.was_trimmed());

        e.source_color_rect = Rect::new(3, 4, 50, 30);
        assert!(!e.was_trimmed());

        e.source_color_rect = Rect::new(0, 0, 40, 30);
        assert!(e.was_trimmed());
    }

    #[test]
    fn test_restored_size() {
        assert_eq!(
            entry(Rect::new(0, 0, 50, 30), true, 90).restored_size(),
            Size::new(30, 50)
        );
        assert_eq!(
            entry(Rect::new(0, 0, 50, 30), true, -90).restored_size(),
            Size::new(30, 50)
        );
        assert_eq!(
            entry(Rect::new(0, 0, 50, 30), true, 180).restored_size(),
            Size::new(50, 30)
        );
        assert_eq!(
            entry(Rect::new(0, 0, 50, 30), false, 90).restored_size(),
            Size::new(50, 30)
        );
    }
}
