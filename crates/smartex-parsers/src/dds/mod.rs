//! DDS (DirectDraw Surface) container parser
//!
//! Handles S3TC (DXT1/3/5), ETC1 and ATC payloads, plus 32-bit BGRA
//! uncompressed data. ETC1 and ATC textures are shipped in the same DDS
//! container under their own FourCC codes.
//!
//! # Header quirks
//! - The data offset is taken from the header size field (124) and moved
//!   past the 4-byte magic.
//! - The mip count field is only trusted when `DDSD_MIPMAPCOUNT` is set.
//! - A cubemap must declare all six faces.

mod format;
mod header;

pub use format::{resolve as resolve_format, DdsFormat, RGBA_BLOCK_BYTES};
pub use header::{caps2, flags, fourcc, fourcc_to_string, pf_flags, DdsHeader, DdsPixelFormat, HEADER_LENGTH};

use crate::traits::{ContainerParser, HeaderMeta, ParseError, ParseResult};

/// DDS file magic number "DDS "
pub const DDS_MAGIC: u32 = 0x2053_4444;

/// Bytes added to the header size field to reach the first level
const DATA_OFFSET_CORRECTION: usize = 4;

/// DDS Parser
#[derive(Debug, Default, Clone, Copy)]
pub struct DdsParser;

impl DdsParser {
    /// Create a new DDS parser
    pub const fn new() -> Self {
        Self
    }
}

impl ContainerParser for DdsParser {
    fn name(&self) -> &str {
        "DDS Texture Parser"
    }

    fn extensions(&self) -> &[&str] {
        &["dds", "atc", "etc"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(b"DDS ")
    }

    fn parse_header(&self, bytes: &[u8]) -> ParseResult<HeaderMeta> {
        if bytes.len() < 4 {
            return Err(ParseError::truncated(0, 4, bytes.len()));
        }
        if bytes[..4] != DDS_MAGIC.to_le_bytes() {
            return Err(ParseError::InvalidMagic {
                expected: DDS_MAGIC.to_le_bytes().to_vec(),
                found: bytes[..4].to_vec(),
            });
        }

        let header = DdsHeader::parse(bytes)?;
        let DdsFormat { format, block_bytes } = resolve_format(&header.pixel_format)?;

        let mip_count = if header.has_mipmap_count() {
            header.mipmap_count.max(1)
        } else {
            1
        };

        let face_count = if header.is_cubemap() {
            if !header.has_all_cube_faces() {
                return Err(ParseError::IncompleteCubemap { caps2: header.caps2 });
            }
            6
        } else {
            1
        };

        let data_offset = usize::try_from(header.size)
            .ok()
            .and_then(|size| size.checked_add(DATA_OFFSET_CORRECTION))
            .ok_or_else(|| ParseError::truncated(0, usize::MAX, bytes.len()))?;

        tracing::trace!(
            fourcc = %header.pixel_format.fourcc_string(),
            width = header.width,
            height = header.height,
            mip_count,
            face_count,
            "DDS header"
        );

        Ok(HeaderMeta {
            format,
            width: header.width,
            height: header.height,
            face_count,
            block_bytes,
            mip_count,
            data_offset,
        })
    }
}
