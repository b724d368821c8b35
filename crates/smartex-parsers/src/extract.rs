//! Block extraction: slice each face's mip chain out of a container.
//!
//! Levels are read strictly in order. Each level starts where the previous
//! one ended, so a single wrong size shifts everything after it; sizes are
//! therefore derived from the block geometry only, never from the file.

use bytes::Bytes;
use smartex_core::{BlockLayout, Face, MipLevel};

use crate::traits::{HeaderMeta, ParseError, ParseResult};

/// Levels preallocated per face; the header count is untrusted
const MAX_PREALLOCATED_LEVELS: usize = 16;

/// Byte length of one level of the given dimensions
pub fn level_size(meta: &HeaderMeta, width: u32, height: u32) -> usize {
    let (width, height) = (width as usize, height as usize);

    match meta.format.layout() {
        BlockLayout::Uncompressed => width.saturating_mul(height).saturating_mul(4),
        BlockLayout::Block4x4 => {
            let blocks = (width / 4).max(1).saturating_mul((height / 4).max(1));
            blocks.saturating_mul(meta.block_bytes as usize)
        }
        BlockLayout::Pvrtc { bpp } => {
            let bpp = bpp as usize;
            let (block_width, block_height) = if bpp == 2 { (8, 4) } else { (4, 4) };
            let blocks = (width / block_width)
                .max(2)
                .saturating_mul((height / block_height).max(2));
            blocks.saturating_mul(block_width * block_height * bpp / 8)
        }
    }
}

/// Reorder texels from B,G,R,A to R,G,B,A
pub fn bgra_to_rgba(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    for texel in src.chunks_exact(4) {
        out.extend_from_slice(&[texel[2], texel[1], texel[0], texel[3]]);
    }
    out
}

/// Extract every face and mip level described by `meta`
pub fn extract_faces(meta: &HeaderMeta, raw: &Bytes) -> ParseResult<Vec<Face>> {
    let mut faces = Vec::with_capacity(meta.face_count as usize);
    let mut offset = meta.data_offset;

    for _ in 0..meta.face_count {
        let mut mipmaps = Vec::with_capacity((meta.mip_count as usize).min(MAX_PREALLOCATED_LEVELS));
        let mut width = meta.width;
        let mut height = meta.height;

        for _ in 0..meta.mip_count {
            let length = level_size(meta, width, height);
            let end = offset
                .checked_add(length)
                .filter(|&end| end <= raw.len())
                .ok_or_else(|| ParseError::truncated(offset, length, raw.len()))?;

            let data = match meta.format.layout() {
                BlockLayout::Uncompressed => Bytes::from(bgra_to_rgba(&raw[offset..end])),
                _ => raw.slice(offset..end),
            };

            mipmaps.push(MipLevel { width, height, data });

            width = (width >> 1).max(1);
            height = (height >> 1).max(1);
            offset = end;
        }

        faces.push(Face { mipmaps });
    }

    Ok(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartex_core::PixelFormat;

    fn meta(format: PixelFormat, block_bytes: u32, width: u32, height: u32, mip_count: u32) -> HeaderMeta {
        HeaderMeta {
            format,
            width,
            height,
            face_count: 1,
            block_bytes,
            mip_count,
            data_offset: 0,
        }
    }

    #[test]
    fn test_block4x4_sizes() {
        let dxt1 = meta(PixelFormat::RgbS3tcDxt1, 8, 512, 512, 10);
        assert_eq!(level_size(&dxt1, 512, 512), 131_072);
        assert_eq!(level_size(&dxt1, 2, 2), 8);

        let dxt5 = meta(PixelFormat::RgbaS3tcDxt5, 16, 16, 8, 1);
        assert_eq!(level_size(&dxt5, 16, 8), 4 * 2 * 16);
    }

    #[test]
    fn test_pvrtc_sizes_have_two_block_minimum() {
        let two = meta(PixelFormat::RgbPvrtc2bpp, 8, 512, 512, 1);
        assert_eq!(level_size(&two, 512, 512), 64 * 128 * 8);
        assert_eq!(level_size(&two, 1, 1), 2 * 2 * 8);

        let four = meta(PixelFormat::RgbPvrtc4bpp, 8, 512, 512, 1);
        assert_eq!(level_size(&four, 512, 512), 128 * 128 * 8);
        assert_eq!(level_size(&four, 4, 4), 2 * 2 * 8);
    }

    #[test]
    fn test_bgra_swap() {
        assert_eq!(bgra_to_rgba(&[1, 2, 3, 4, 10, 20, 30, 40]), vec![3, 2, 1, 4, 30, 20, 10, 40]);
    }

    #[test]
    fn test_uncompressed_levels_are_swapped() {
        let m = meta(PixelFormat::Rgba8, 64, 1, 1, 1);
        let faces = extract_faces(&m, &Bytes::from_static(&[1, 2, 3, 4])).unwrap();
        assert_eq!(faces[0].mipmaps[0].data.as_ref(), &[3, 2, 1, 4]);
    }

    #[test]
    fn test_offsets_chain_across_levels() {
        // 8x8 DXT1: 32 bytes, then 4x4: 8 bytes, then 2x2: 8 bytes
        let m = meta(PixelFormat::RgbS3tcDxt1, 8, 8, 8, 3);
        let raw: Vec<u8> = (0..48u8).collect();
        let faces = extract_faces(&m, &Bytes::from(raw)).unwrap();

        let levels = &faces[0].mipmaps;
        assert_eq!(levels[0].data[0], 0);
        assert_eq!(levels[1].data[0], 32);
        assert_eq!(levels[2].data[0], 40);
        assert_eq!((levels[2].width, levels[2].height), (2, 2));
    }

    #[test]
    fn test_overrun_is_truncated_data() {
        let m = meta(PixelFormat::RgbS3tcDxt1, 8, 8, 8, 2);
        let err = extract_faces(&m, &Bytes::from(vec![0u8; 35])).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TruncatedData { offset: 32, requested: 8, available: 35 }
        ));
    }

    #[test]
    fn test_data_offset_past_end() {
        let m = HeaderMeta {
            data_offset: 1000,
            ..meta(PixelFormat::RgbS3tcDxt1, 8, 4, 4, 1)
        };
        assert!(extract_faces(&m, &Bytes::from(vec![0u8; 128])).is_err());
    }
}
