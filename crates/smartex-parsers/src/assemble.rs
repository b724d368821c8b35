//! Texture assembly from header metadata and extracted faces

use smallvec::SmallVec;
use smartex_core::{Face, TextureRecord};

use crate::traits::HeaderMeta;

/// Build the texture record handed to the caller
///
/// Faces stay in container order (+X, -X, +Y, -Y, +Z, -Z for cubemaps).
pub fn assemble(meta: &HeaderMeta, faces: Vec<Face>) -> TextureRecord {
    TextureRecord {
        format: meta.format,
        width: meta.width,
        height: meta.height,
        is_cubemap: meta.is_cubemap(),
        faces: SmallVec::from_vec(faces),
    }
}
