//! DDS header structures

use byteorder::{ByteOrder, LittleEndian};

use crate::traits::{ParseError, ParseResult};

/// DDS header flags
pub mod flags {
    pub const CAPS: u32 = 0x1;
    pub const HEIGHT: u32 = 0x2;
    pub const WIDTH: u32 = 0x4;
    pub const PITCH: u32 = 0x8;
    pub const PIXEL_FORMAT: u32 = 0x1000;
    pub const MIPMAP_COUNT: u32 = 0x20000;
}

/// Caps2 flags
pub mod caps2 {
    pub const CUBEMAP: u32 = 0x200;
    pub const CUBEMAP_POSITIVEX: u32 = 0x400;
    pub const CUBEMAP_NEGATIVEX: u32 = 0x800;
    pub const CUBEMAP_POSITIVEY: u32 = 0x1000;
    pub const CUBEMAP_NEGATIVEY: u32 = 0x2000;
    pub const CUBEMAP_POSITIVEZ: u32 = 0x4000;
    pub const CUBEMAP_NEGATIVEZ: u32 = 0x8000;

    /// All six face bits
    pub const CUBEMAP_ALL_FACES: u32 = CUBEMAP_POSITIVEX
        | CUBEMAP_NEGATIVEX
        | CUBEMAP_POSITIVEY
        | CUBEMAP_NEGATIVEY
        | CUBEMAP_POSITIVEZ
        | CUBEMAP_NEGATIVEZ;
}

/// DDS pixel format flags
pub mod pf_flags {
    pub const ALPHAPIXELS: u32 = 0x1;
    pub const FOURCC: u32 = 0x4;
    pub const RGB: u32 = 0x40;
}

/// Length of the fixed header, magic included, in bytes
pub const HEADER_LENGTH: usize = 128;

/// DDS header as 32-bit little-endian words following the magic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsHeader {
    pub magic: u32,
    /// Header size field; 124 in well-formed files
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mipmap_count: u32,
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
}

impl DdsHeader {
    /// Parse the 128-byte DDS prefix
    pub fn parse(data: &[u8]) -> ParseResult<Self> {
        if data.len() < HEADER_LENGTH {
            return Err(ParseError::truncated(0, HEADER_LENGTH, data.len()));
        }

        let word = |index: usize| LittleEndian::read_u32(&data[index * 4..index * 4 + 4]);

        Ok(DdsHeader {
            magic: word(0),
            size: word(1),
            flags: word(2),
            height: word(3),
            width: word(4),
            pitch_or_linear_size: word(5),
            depth: word(6),
            mipmap_count: word(7),
            // Words 8..=18 are reserved
            pixel_format: DdsPixelFormat::parse(&data[76..108]),
            caps: word(27),
            caps2: word(28),
        })
    }

    /// Check if the cubemap flag is set
    pub fn is_cubemap(&self) -> bool {
        self.caps2 & caps2::CUBEMAP != 0
    }

    /// Check if all six cubemap face bits are set
    pub fn has_all_cube_faces(&self) -> bool {
        self.caps2 & caps2::CUBEMAP_ALL_FACES == caps2::CUBEMAP_ALL_FACES
    }

    /// Check if the mip count field is declared valid by the header flags
    pub fn has_mipmap_count(&self) -> bool {
        self.flags & flags::MIPMAP_COUNT != 0
    }
}

/// DDS pixel format (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    /// FourCC packed little-endian
    pub fourcc: u32,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Parse pixel format from a 32-byte slice
    fn parse(data: &[u8]) -> Self {
        let word = |index: usize| LittleEndian::read_u32(&data[index * 4..index * 4 + 4]);

        DdsPixelFormat {
            size: word(0),
            flags: word(1),
            fourcc: word(2),
            rgb_bit_count: word(3),
            r_bit_mask: word(4),
            g_bit_mask: word(5),
            b_bit_mask: word(6),
            a_bit_mask: word(7),
        }
    }

    /// Check if the flags declare a FourCC-coded format
    pub fn has_fourcc(&self) -> bool {
        self.flags & pf_flags::FOURCC != 0
    }

    /// Check if the flags declare uncompressed RGB data
    pub fn has_rgb(&self) -> bool {
        self.flags & pf_flags::RGB != 0
    }

    /// Get FourCC as string
    pub fn fourcc_string(&self) -> String {
        fourcc_to_string(self.fourcc)
    }
}

/// Pack four ASCII characters into a little-endian integer
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

/// Unpack a little-endian FourCC into its characters
pub fn fourcc_to_string(value: u32) -> String {
    String::from_utf8_lossy(&value.to_le_bytes()).into_owned()
}
