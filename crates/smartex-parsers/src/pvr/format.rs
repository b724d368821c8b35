//! PVR pixel format tables

use std::collections::HashMap;

use once_cell::sync::Lazy;
use smartex_core::PixelFormat;

use super::header::{PvrHeaderV2, PvrHeaderV3};
use crate::traits::{ParseError, ParseResult};

/// Format tag and bit depth a PVR format flag maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvrFormat {
    pub format: PixelFormat,
    pub bpp: u32,
}

impl PvrFormat {
    /// Texel footprint of one block
    pub fn block_dimensions(&self) -> (u32, u32) {
        if self.bpp == 2 {
            (8, 4)
        } else {
            (4, 4)
        }
    }

    /// Bytes per block: 8 for both PVRTC depths
    pub fn block_bytes(&self) -> u32 {
        let (width, height) = self.block_dimensions();
        width * height * self.bpp / 8
    }
}

/// v3 pixel format word -> format
static V3_FORMATS: Lazy<HashMap<u32, PvrFormat>> = Lazy::new(|| {
    HashMap::from([
        (0, PvrFormat { format: PixelFormat::RgbPvrtc2bpp, bpp: 2 }),
        (1, PvrFormat { format: PixelFormat::RgbaPvrtc2bpp, bpp: 2 }),
        (2, PvrFormat { format: PixelFormat::RgbPvrtc4bpp, bpp: 4 }),
        (3, PvrFormat { format: PixelFormat::RgbaPvrtc4bpp, bpp: 4 }),
    ])
});

/// v2 pixel type -> (opaque format, alpha format)
static V2_FORMATS: Lazy<HashMap<u32, (PvrFormat, PvrFormat)>> = Lazy::new(|| {
    HashMap::from([
        (
            24,
            (
                PvrFormat { format: PixelFormat::RgbPvrtc4bpp, bpp: 4 },
                PvrFormat { format: PixelFormat::RgbaPvrtc4bpp, bpp: 4 },
            ),
        ),
        (
            25,
            (
                PvrFormat { format: PixelFormat::RgbPvrtc2bpp, bpp: 2 },
                PvrFormat { format: PixelFormat::RgbaPvrtc2bpp, bpp: 2 },
            ),
        ),
    ])
});

/// Resolve the format of a v3 header
pub fn resolve_v3(header: &PvrHeaderV3) -> ParseResult<PvrFormat> {
    V3_FORMATS
        .get(&header.pixel_format)
        .copied()
        .ok_or(ParseError::UnsupportedPixelFormat {
            container: "PVR v3",
            flag: header.pixel_format,
        })
}

/// Resolve the format of a v2 header; the alpha mask picks the RGBA variant
pub fn resolve_v2(header: &PvrHeaderV2) -> ParseResult<PvrFormat> {
    let pixel_type = header.pixel_type();
    let (opaque, alpha) = V2_FORMATS
        .get(&pixel_type)
        .copied()
        .ok_or(ParseError::UnsupportedPixelFormat {
            container: "PVR v2",
            flag: pixel_type,
        })?;

    Ok(if header.has_alpha() { alpha } else { opaque })
}
