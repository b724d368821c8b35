//! DDS texture format detection

use std::collections::HashMap;

use once_cell::sync::Lazy;
use smartex_core::PixelFormat;

use super::header::{fourcc, DdsPixelFormat};
use crate::traits::{ParseError, ParseResult};

/// Format tag and block size a FourCC maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsFormat {
    pub format: PixelFormat,
    pub block_bytes: u32,
}

/// Conceptual block size of uncompressed RGBA: 4 texels of 4 bytes in a row of 4
pub const RGBA_BLOCK_BYTES: u32 = 64;

/// FourCC -> format table, built once
static FOURCC_FORMATS: Lazy<HashMap<u32, DdsFormat>> = Lazy::new(|| {
    let entries = [
        (b"DXT1", PixelFormat::RgbS3tcDxt1, 8),
        (b"DXT3", PixelFormat::RgbaS3tcDxt3, 16),
        (b"DXT5", PixelFormat::RgbaS3tcDxt5, 16),
        (b"ETC1", PixelFormat::RgbEtc1, 8),
        (b"ATC ", PixelFormat::RgbAtc, 8),
        (b"ATCI", PixelFormat::RgbaAtcInterpolatedAlpha, 16),
        (b"ATCA", PixelFormat::RgbaAtcExplicitAlpha, 16),
    ];

    entries
        .into_iter()
        .map(|(code, format, block_bytes)| (fourcc(code), DdsFormat { format, block_bytes }))
        .collect()
});

/// Resolve a DDS pixel format to a format tag and block size
pub fn resolve(pf: &DdsPixelFormat) -> ParseResult<DdsFormat> {
    if !pf.has_fourcc() && !pf.has_rgb() {
        return Err(ParseError::MissingFourCC { flags: pf.flags });
    }

    if let Some(known) = FOURCC_FORMATS.get(&pf.fourcc) {
        return Ok(*known);
    }

    if is_uncompressed_rgba(pf) {
        return Ok(DdsFormat {
            format: PixelFormat::Rgba8,
            block_bytes: RGBA_BLOCK_BYTES,
        });
    }

    Err(ParseError::UnsupportedFourCC {
        fourcc: pf.fourcc_string(),
    })
}

/// 32-bit BGRA layout with an alpha channel in the top byte
fn is_uncompressed_rgba(pf: &DdsPixelFormat) -> bool {
    pf.fourcc == 0
        && pf.rgb_bit_count == 32
        && pf.a_bit_mask == 0xFF00_0000
        && pf.r_bit_mask == 0x00FF_0000
        && pf.g_bit_mask == 0x0000_FF00
        && pf.b_bit_mask == 0x0000_00FF
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dds::header::pf_flags;

    fn pixel_format(flags: u32, code: u32) -> DdsPixelFormat {
        DdsPixelFormat {
            size: 32,
            flags,
            fourcc: code,
            rgb_bit_count: 0,
            r_bit_mask: 0,
            g_bit_mask: 0,
            b_bit_mask: 0,
            a_bit_mask: 0,
        }
    }

    fn rgba_format() -> DdsPixelFormat {
        DdsPixelFormat {
            rgb_bit_count: 32,
            a_bit_mask: 0xFF00_0000,
            r_bit_mask: 0x00FF_0000,
            g_bit_mask: 0x0000_FF00,
            b_bit_mask: 0x0000_00FF,
            ..pixel_format(pf_flags::RGB | pf_flags::ALPHAPIXELS, 0)
        }
    }

    #[test]
    fn test_fourcc_table() {
        let cases = [
            (b"DXT1", PixelFormat::RgbS3tcDxt1, 8),
            (b"DXT3", PixelFormat::RgbaS3tcDxt3, 16),
            (b"DXT5", PixelFormat::RgbaS3tcDxt5, 16),
            (b"ETC1", PixelFormat::RgbEtc1, 8),
            (b"ATC ", PixelFormat::RgbAtc, 8),
            (b"ATCI", PixelFormat::RgbaAtcInterpolatedAlpha, 16),
            (b"ATCA", PixelFormat::RgbaAtcExplicitAlpha, 16),
        ];

        for (code, format, block_bytes) in cases {
            let resolved = resolve(&pixel_format(pf_flags::FOURCC, fourcc(code))).unwrap();
            assert_eq!(resolved, DdsFormat { format, block_bytes });
        }
    }

    #[test]
    fn test_uncompressed_rgba() {
        let resolved = resolve(&rgba_format()).unwrap();
        assert_eq!(resolved.format, PixelFormat::Rgba8);
        assert_eq!(resolved.block_bytes, RGBA_BLOCK_BYTES);
    }

    #[test]
    fn test_rgba_with_wrong_masks_is_unsupported() {
        let pf = DdsPixelFormat {
            r_bit_mask: 0x0000_00FF,
            b_bit_mask: 0x00FF_0000,
            ..rgba_format()
        };
        assert!(matches!(resolve(&pf), Err(ParseError::UnsupportedFourCC { .. })));
    }

    #[test]
    fn test_missing_fourcc() {
        let err = resolve(&pixel_format(pf_flags::ALPHAPIXELS, fourcc(b"DXT1"))).unwrap_err();
        assert!(matches!(err, ParseError::MissingFourCC { flags: 0x1 }));
    }

    #[test]
    fn test_unsupported_fourcc() {
        let err = resolve(&pixel_format(pf_flags::FOURCC, fourcc(b"BC7U"))).unwrap_err();
        match err {
            ParseError::UnsupportedFourCC { fourcc } => assert_eq!(fourcc, "BC7U"),
            other => panic!("Expected UnsupportedFourCC, got {other:?}"),
        }
    }
}
