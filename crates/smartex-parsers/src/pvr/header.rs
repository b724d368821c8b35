//! PVR header structures
//!
//! Both header versions are read from the same 13-word prefix. v3 carries
//! its tag in word 0; v2 starts with the header length and carries its tag
//! in word 11.

use byteorder::{ByteOrder, LittleEndian};

use crate::traits::{ParseError, ParseResult};

/// Number of 32-bit words read for version detection
pub const PREFIX_WORDS: usize = 13;

/// Fixed size of the v3 header, and of the v2 prefix
pub const PREFIX_LENGTH: usize = PREFIX_WORDS * 4;

/// v3 tag in word 0 ("PVR\x03")
pub const PVR_V3_MAGIC: u32 = 0x0352_5650;

/// v2 tag in word 11 ("PVR!")
pub const PVR_V2_MAGIC: u32 = 0x2152_5650;

/// v2 flags: the pixel type lives in the low byte
const V2_PIXEL_TYPE_MASK: u32 = 0xFF;

/// Header layout selected by the version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PvrHeader {
    V2(PvrHeaderV2),
    V3(PvrHeaderV3),
}

impl PvrHeader {
    /// Read the prefix and dispatch on the version tag
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        if data.len() < PREFIX_LENGTH {
            return Err(ParseError::truncated(0, PREFIX_LENGTH, data.len()));
        }

        let mut words = [0u32; PREFIX_WORDS];
        LittleEndian::read_u32_into(&data[..PREFIX_LENGTH], &mut words);

        if words[0] == PVR_V3_MAGIC {
            Ok(PvrHeader::V3(PvrHeaderV3::from_words(&words)))
        } else if words[11] == PVR_V2_MAGIC {
            Ok(PvrHeader::V2(PvrHeaderV2::from_words(&words)))
        } else {
            Err(ParseError::UnknownContainerVersion {
                first_word: words[0],
                tag_word: words[11],
            })
        }
    }

    /// Container version number
    pub fn version(&self) -> u32 {
        match self {
            PvrHeader::V2(_) => 2,
            PvrHeader::V3(_) => 3,
        }
    }
}

/// PVR v3 header (52 bytes, followed by `metadata_size` bytes of metadata)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvrHeaderV3 {
    pub flags: u32,
    /// Low word of the 64-bit pixel format
    pub pixel_format: u32,
    pub pixel_format_high: u32,
    pub colour_space: u32,
    pub channel_type: u32,
    pub height: u32,
    pub width: u32,
    pub depth: u32,
    pub surface_count: u32,
    pub face_count: u32,
    pub mipmap_count: u32,
    pub metadata_size: u32,
}

impl PvrHeaderV3 {
    fn from_words(words: &[u32; PREFIX_WORDS]) -> Self {
        Self {
            flags: words[1],
            pixel_format: words[2],
            pixel_format_high: words[3],
            colour_space: words[4],
            channel_type: words[5],
            height: words[6],
            width: words[7],
            depth: words[8],
            surface_count: words[9],
            face_count: words[10],
            mipmap_count: words[11],
            metadata_size: words[12],
        }
    }
}

/// Legacy PVR v2 header (52 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvrHeaderV2 {
    /// Header length, which is also the absolute data offset
    pub header_length: u32,
    pub height: u32,
    pub width: u32,
    /// Number of mip levels below the top level
    pub mipmap_count: u32,
    pub flags: u32,
    pub data_length: u32,
    pub bits_per_pixel: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub alpha_bit_mask: u32,
    pub surface_count: u32,
}

impl PvrHeaderV2 {
    fn from_words(words: &[u32; PREFIX_WORDS]) -> Self {
        Self {
            header_length: words[0],
            height: words[1],
            width: words[2],
            mipmap_count: words[3],
            flags: words[4],
            data_length: words[5],
            bits_per_pixel: words[6],
            r_bit_mask: words[7],
            g_bit_mask: words[8],
            b_bit_mask: words[9],
            alpha_bit_mask: words[10],
            surface_count: words[12],
        }
    }

    /// Pixel type carried in the low byte of the flags
    pub fn pixel_type(&self) -> u32 {
        self.flags & V2_PIXEL_TYPE_MASK
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha_bit_mask > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(words: &[(usize, u32)]) -> Vec<u8> {
        let mut data = vec![0u8; PREFIX_LENGTH];
        for &(index, value) in words {
            data[index * 4..index * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_detects_v3() {
        let header = PvrHeader::parse(&prefix(&[(0, PVR_V3_MAGIC), (6, 32), (7, 64), (11, 3)])).unwrap();
        match header {
            PvrHeader::V3(v3) => {
                assert_eq!(v3.height, 32);
                assert_eq!(v3.width, 64);
                assert_eq!(v3.mipmap_count, 3);
            }
            other => panic!("Expected v3 header, got {other:?}"),
        }
    }

    #[test]
    fn test_detects_v2() {
        let header = PvrHeader::parse(&prefix(&[(0, 52), (1, 16), (2, 8), (4, 0x118), (11, PVR_V2_MAGIC)])).unwrap();
        assert_eq!(header.version(), 2);
        match header {
            PvrHeader::V2(v2) => {
                assert_eq!(v2.header_length, 52);
                assert_eq!(v2.pixel_type(), 0x18);
                assert!(!v2.has_alpha());
            }
            other => panic!("Expected v2 header, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_version() {
        let err = PvrHeader::parse(&prefix(&[(0, 0xDEAD_BEEF)])).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownContainerVersion { first_word: 0xDEAD_BEEF, tag_word: 0 }
        ));
    }

    #[test]
    fn test_short_prefix() {
        let err = PvrHeader::parse(&PVR_V3_MAGIC.to_le_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::TruncatedData { requested: 52, available: 4, .. }));
    }
}
