//! Common types used across smartex
//!
//! This module provides the texture data model produced by the parsers and
//! handed out by the loader, plus the encoding identifiers both sides key on.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Compressed texture family a platform may support natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingId {
    /// AMD/Qualcomm ATC
    Atc,
    /// Ericsson ETC1
    Etc1,
    /// S3TC / DXT
    S3tc,
    /// PowerVR PVRTC
    Pvrtc,
}

impl EncodingId {
    /// All encodings in default priority order
    pub const ALL: [EncodingId; 4] = [
        EncodingId::Atc,
        EncodingId::Etc1,
        EncodingId::S3tc,
        EncodingId::Pvrtc,
    ];

    /// Lowercase name used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingId::Atc => "atc",
            EncodingId::Etc1 => "etc1",
            EncodingId::S3tc => "s3tc",
            EncodingId::Pvrtc => "pvrtc",
        }
    }
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EncodingId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "atc" => Ok(EncodingId::Atc),
            "etc" | "etc1" => Ok(EncodingId::Etc1),
            "s3tc" | "dxt" => Ok(EncodingId::S3tc),
            "pvrtc" | "pvr" => Ok(EncodingId::Pvrtc),
            _ => Err(format!("Unknown encoding: {}", s)),
        }
    }
}

/// Pixel format tag of a decoded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// S3TC DXT1, 8 bytes per 4x4 block
    RgbS3tcDxt1,
    /// S3TC DXT3, 16 bytes per 4x4 block
    RgbaS3tcDxt3,
    /// S3TC DXT5, 16 bytes per 4x4 block
    RgbaS3tcDxt5,
    /// ETC1, 8 bytes per 4x4 block
    RgbEtc1,
    /// ATC RGB, 8 bytes per 4x4 block
    RgbAtc,
    /// ATC with explicit alpha, 16 bytes per 4x4 block
    RgbaAtcExplicitAlpha,
    /// ATC with interpolated alpha, 16 bytes per 4x4 block
    RgbaAtcInterpolatedAlpha,
    /// PVRTC RGB, 2 bits per pixel
    RgbPvrtc2bpp,
    /// PVRTC RGBA, 2 bits per pixel
    RgbaPvrtc2bpp,
    /// PVRTC RGB, 4 bits per pixel
    RgbPvrtc4bpp,
    /// PVRTC RGBA, 4 bits per pixel
    RgbaPvrtc4bpp,
    /// Uncompressed 8-bit RGBA
    Rgba8,
}

/// How the bytes of one mip level are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    /// 4 bytes per texel, stored B,G,R,A in the container
    Uncompressed,
    /// 4x4 texel blocks of a fixed byte size
    Block4x4,
    /// PVRTC blocks, 8x4 texels at 2bpp or 4x4 texels at 4bpp
    Pvrtc { bpp: u32 },
}

impl PixelFormat {
    /// Byte layout used when slicing mip levels
    pub fn layout(&self) -> BlockLayout {
        match self {
            PixelFormat::Rgba8 => BlockLayout::Uncompressed,
            PixelFormat::RgbPvrtc2bpp | PixelFormat::RgbaPvrtc2bpp => BlockLayout::Pvrtc { bpp: 2 },
            PixelFormat::RgbPvrtc4bpp | PixelFormat::RgbaPvrtc4bpp => BlockLayout::Pvrtc { bpp: 4 },
            _ => BlockLayout::Block4x4,
        }
    }

    /// Check if format is block-compressed
    pub fn is_compressed(&self) -> bool {
        !matches!(self, PixelFormat::Rgba8)
    }

    /// Check if format carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        !matches!(
            self,
            PixelFormat::RgbS3tcDxt1
                | PixelFormat::RgbEtc1
                | PixelFormat::RgbAtc
                | PixelFormat::RgbPvrtc2bpp
                | PixelFormat::RgbPvrtc4bpp
        )
    }

    /// Encoding family the GPU needs to support for this format
    pub fn encoding(&self) -> Option<EncodingId> {
        match self {
            PixelFormat::RgbS3tcDxt1 | PixelFormat::RgbaS3tcDxt3 | PixelFormat::RgbaS3tcDxt5 => {
                Some(EncodingId::S3tc)
            }
            PixelFormat::RgbEtc1 => Some(EncodingId::Etc1),
            PixelFormat::RgbAtc
            | PixelFormat::RgbaAtcExplicitAlpha
            | PixelFormat::RgbaAtcInterpolatedAlpha => Some(EncodingId::Atc),
            PixelFormat::RgbPvrtc2bpp
            | PixelFormat::RgbaPvrtc2bpp
            | PixelFormat::RgbPvrtc4bpp
            | PixelFormat::RgbaPvrtc4bpp => Some(EncodingId::Pvrtc),
            PixelFormat::Rgba8 => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::RgbS3tcDxt1 => "RGB_S3TC_DXT1",
            PixelFormat::RgbaS3tcDxt3 => "RGBA_S3TC_DXT3",
            PixelFormat::RgbaS3tcDxt5 => "RGBA_S3TC_DXT5",
            PixelFormat::RgbEtc1 => "RGB_ETC1",
            PixelFormat::RgbAtc => "RGB_ATC",
            PixelFormat::RgbaAtcExplicitAlpha => "RGBA_ATC_EXPLICIT_ALPHA",
            PixelFormat::RgbaAtcInterpolatedAlpha => "RGBA_ATC_INTERPOLATED_ALPHA",
            PixelFormat::RgbPvrtc2bpp => "RGB_PVRTC_2BPPV1",
            PixelFormat::RgbaPvrtc2bpp => "RGBA_PVRTC_2BPPV1",
            PixelFormat::RgbPvrtc4bpp => "RGB_PVRTC_4BPPV1",
            PixelFormat::RgbaPvrtc4bpp => "RGBA_PVRTC_4BPPV1",
            PixelFormat::Rgba8 => "RGBA8",
        };
        f.pad(name)
    }
}

/// Cubemap face, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Faces in the order they are stored in a container
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Index of this face in `TextureRecord::faces`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// A single mip level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    /// Level bytes; a zero-copy slice of the container for compressed formats
    pub data: Bytes,
}

impl MipLevel {
    /// Size of the level data in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One face of a texture: its mip chain, largest level first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    pub mipmaps: Vec<MipLevel>,
}

/// Decoded texture, ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub compressed: bool,
    pub is_cubemap: bool,
    /// One face, or six in `CubeFace::ALL` order
    pub faces: SmallVec<[Face; 6]>,
}

impl TextureRecord {
    /// Mip chain of the first face
    pub fn mipmaps(&self) -> &[MipLevel] {
        self.faces.first().map(|f| f.mipmaps.as_slice()).unwrap_or(&[])
    }

    /// Number of mip levels per face
    pub fn mip_count(&self) -> usize {
        self.mipmaps().len()
    }

    /// Get a cubemap face; `None` for plain textures
    pub fn face(&self, face: CubeFace) -> Option<&Face> {
        if self.is_cubemap {
            self.faces.get(face.index())
        } else {
            None
        }
    }

    /// Total bytes across all faces and levels
    pub fn total_bytes(&self) -> usize {
        self.faces
            .iter()
            .flat_map(|f| f.mipmaps.iter())
            .map(MipLevel::len)
            .sum()
    }

    /// Data-free description for reporting
    pub fn summary(&self) -> TextureSummary {
        TextureSummary {
            format: self.format,
            width: self.width,
            height: self.height,
            compressed: self.format.is_compressed(),
            is_cubemap: self.is_cubemap,
            face_count: self.faces.len(),
            mip_count: self.mip_count(),
            total_bytes: self.total_bytes(),
            levels: self
                .mipmaps()
                .iter()
                .map(|m| LevelSummary {
                    width: m.width,
                    height: m.height,
                    bytes: m.len(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a `TextureRecord`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSummary {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub compressed: bool,
    pub is_cubemap: bool,
    pub face_count: usize,
    pub mip_count: usize,
    pub total_bytes: usize,
    pub levels: Vec<LevelSummary>,
}

/// Serializable summary of one mip level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSummary {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}
