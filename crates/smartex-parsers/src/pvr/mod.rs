//! PVR container parser (PVRTC 2bpp / 4bpp)
//!
//! Two incompatible header versions exist in the wild:
//! - v3 stores the mip count as-is and is followed by a metadata block
//!   that has to be skipped to reach the data.
//! - v2 stores the number of levels *below* the top level, so the real
//!   count is one more; its header length is the absolute data offset.

mod format;
mod header;

pub use format::{resolve_v2, resolve_v3, PvrFormat};
pub use header::{PvrHeader, PvrHeaderV2, PvrHeaderV3, PREFIX_LENGTH, PVR_V2_MAGIC, PVR_V3_MAGIC};

use crate::traits::{ContainerParser, HeaderMeta, ParseResult};

/// Surface count that marks a cubemap
const CUBEMAP_FACES: u32 = 6;

/// PVR Parser
#[derive(Debug, Default, Clone, Copy)]
pub struct PvrParser;

impl PvrParser {
    /// Create a new PVR parser
    pub const fn new() -> Self {
        Self
    }
}

fn face_count(raw: u32) -> u32 {
    if raw == CUBEMAP_FACES {
        CUBEMAP_FACES
    } else {
        1
    }
}

impl ContainerParser for PvrParser {
    fn name(&self) -> &str {
        "PVR Texture Parser"
    }

    fn extensions(&self) -> &[&str] {
        &["pvr"]
    }

    fn supported_versions(&self) -> &[u32] {
        &[2, 3]
    }

    fn parse_header(&self, bytes: &[u8]) -> ParseResult<HeaderMeta> {
        let header = PvrHeader::parse(bytes)?;

        let meta = match header {
            PvrHeader::V3(v3) => {
                let pvr = resolve_v3(&v3)?;
                HeaderMeta {
                    format: pvr.format,
                    width: v3.width,
                    height: v3.height,
                    face_count: face_count(v3.face_count),
                    block_bytes: pvr.block_bytes(),
                    mip_count: v3.mipmap_count.max(1),
                    data_offset: v3.metadata_size as usize + PREFIX_LENGTH,
                }
            }
            PvrHeader::V2(v2) => {
                let pvr = resolve_v2(&v2)?;
                HeaderMeta {
                    format: pvr.format,
                    width: v2.width,
                    height: v2.height,
                    face_count: face_count(v2.surface_count),
                    block_bytes: pvr.block_bytes(),
                    mip_count: v2.mipmap_count.saturating_add(1),
                    data_offset: v2.header_length as usize,
                }
            }
        };

        tracing::trace!(
            version = header.version(),
            format = %meta.format,
            width = meta.width,
            height = meta.height,
            mip_count = meta.mip_count,
            "PVR header"
        );

        Ok(meta)
    }

    fn can_parse(&self, bytes: &[u8]) -> bool {
        PvrHeader::parse(bytes).is_ok()
    }
}
