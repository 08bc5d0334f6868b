mod engine;
mod save;

pub use engine::{
    Reconstruction, ReconstructionWarning, Reconstructor, reconstruct, reconstruct_sprite,
};
pub use save::save_sprite_image;
