// smartex-parsers/src/traits.rs
//! Core traits defining the parser interface for all container formats.
//!
//! Every container parser only has to validate its header and produce a
//! `HeaderMeta`; block extraction and assembly are shared, so all formats
//! go through the same offset-chained slicing.

use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smartex_core::{Error, PixelFormat, TextureRecord};

use crate::assemble::assemble;
use crate::extract::extract_faces;
use crate::logging::instrument_parse;

/// Errors that can occur during parsing operations
pub type ParseError = Error;

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Validated structural metadata read from a container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMeta {
    /// Pixel format tag
    pub format: PixelFormat,
    /// Width of the largest level
    pub width: u32,
    /// Height of the largest level
    pub height: u32,
    /// 1, or 6 for cubemaps
    pub face_count: u32,
    /// Bytes per compressed block (64 for uncompressed RGBA)
    pub block_bytes: u32,
    /// Mip count after container-specific correction, always >= 1
    pub mip_count: u32,
    /// Absolute offset of the first level after correction
    pub data_offset: usize,
}

impl HeaderMeta {
    /// Check if the header describes a cubemap
    pub fn is_cubemap(&self) -> bool {
        self.face_count == 6
    }
}

/// Configuration options for parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Extract the whole mip chain; when false only level 0 is kept
    pub load_mipmaps: bool,
    /// Whether to use memory mapping for large files
    pub use_memory_mapping: bool,
    /// Minimum file size to enable memory mapping
    pub memory_mapping_threshold: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            load_mipmaps: true,
            use_memory_mapping: true,
            memory_mapping_threshold: 10 * 1024 * 1024, // 10 MB
        }
    }
}

/// Core trait for all container parsers
///
/// Implementors validate one container family's header. Parsers are
/// stateless and shared process-wide through the encoding registry.
pub trait ContainerParser: Send + Sync {
    /// Returns a human-readable name for this parser
    fn name(&self) -> &str;

    /// Returns the file extensions this parser handles (e.g., ["dds"])
    fn extensions(&self) -> &[&str];

    /// Returns the magic bytes found at offset 0 (if the format has them there)
    fn magic_bytes(&self) -> Option<&[u8]> {
        None
    }

    /// Returns the container version(s) supported by this parser
    fn supported_versions(&self) -> &[u32] {
        &[]
    }

    /// Validate the header and read its structural metadata
    fn parse_header(&self, bytes: &[u8]) -> ParseResult<HeaderMeta>;

    /// Parse a whole container with default options
    fn parse(&self, raw: Bytes) -> ParseResult<TextureRecord> {
        self.parse_with_options(raw, &ParseOptions::default())
    }

    /// Parse a whole container: header, block extraction, assembly
    fn parse_with_options(&self, raw: Bytes, options: &ParseOptions) -> ParseResult<TextureRecord> {
        instrument_parse(self.name(), || {
            let mut meta = self.parse_header(&raw)?;
            if !options.load_mipmaps {
                meta.mip_count = 1;
            }

            let faces = extract_faces(&meta, &raw)?;
            Ok(assemble(&meta, faces))
        })
    }

    /// Parse from a file path
    fn parse_file(&self, path: &Path) -> ParseResult<TextureRecord> {
        self.parse_file_with_options(path, &ParseOptions::default())
    }

    /// Parse from a file path with options
    fn parse_file_with_options(&self, path: &Path, options: &ParseOptions) -> ParseResult<TextureRecord> {
        let raw = read_container(path, options)?;
        self.parse_with_options(raw, options)
    }

    /// Check if the buffer starts like this parser's container
    fn can_parse(&self, bytes: &[u8]) -> bool {
        match self.magic_bytes() {
            Some(magic) => bytes.starts_with(magic),
            None => false,
        }
    }
}

/// Read a container file, memory mapping it when it is large enough
pub fn read_container(path: &Path, options: &ParseOptions) -> ParseResult<Bytes> {
    let file = std::fs::File::open(path)?;

    if options.use_memory_mapping {
        let metadata = file.metadata()?;
        if metadata.len() >= options.memory_mapping_threshold {
            // SAFETY: the mapping is read-only and owned by the returned Bytes.
            let mmap = unsafe { memmap2::Mmap::map(&file)? };
            return Ok(Bytes::from_owner(mmap));
        }
    }

    Ok(Bytes::from(std::fs::read(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_options_default() {
        let options = ParseOptions::default();
        assert!(options.load_mipmaps);
        assert!(options.use_memory_mapping);
    }

    #[test]
    fn test_header_meta_cubemap() {
        let meta = HeaderMeta {
            format: PixelFormat::RgbS3tcDxt1,
            width: 4,
            height: 4,
            face_count: 6,
            block_bytes: 8,
            mip_count: 1,
            data_offset: 128,
        };
        assert!(meta.is_cubemap());
        assert!(!HeaderMeta { face_count: 1, ..meta }.is_cubemap());
    }

    #[test]
    fn test_read_container_both_paths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"DDS 0123456789").unwrap();

        let plain = read_container(file.path(), &ParseOptions::default()).unwrap();
        let mapped = read_container(
            file.path(),
            &ParseOptions {
                memory_mapping_threshold: 0,
                ..ParseOptions::default()
            },
        )
        .unwrap();

        assert_eq!(plain, mapped);
        assert_eq!(&plain[..4], b"DDS ");
    }
}
