mod rect;
mod types;

pub use rect::{Rect, Size};
pub use types::{AtlasDescriptor, SpriteEntry};
