//! smartex-parsers
//!
//! Parsers for the containers compressed GPU textures are shipped in.
//!
//! # Supported Formats
//!
//! | Container | Extension        | Payloads                                  |
//! |-----------|------------------|-------------------------------------------|
//! | DDS       | `.dds`           | S3TC DXT1 / DXT3 / DXT5, uncompressed BGRA |
//! | DDS       | `.atc`           | ATC, ATC explicit / interpolated alpha    |
//! | DDS       | `.etc`           | ETC1                                      |
//! | PVR v2/v3 | `.pvr`           | PVRTC 2bpp / 4bpp, RGB or RGBA            |
//!
//! # Example
//!
//! ```rust,ignore
//! use smartex_parsers::{ContainerParser, DdsParser};
//!
//! let texture = DdsParser.parse_file("grass.dds".as_ref())?;
//!
//! println!("{} {}x{}, {} levels", texture.format, texture.width, texture.height, texture.mip_count());
//! ```

pub mod assemble;
pub mod dds;
pub mod extract;
pub mod logging;
pub mod pvr;
pub mod registry;
pub mod traits;

// Re-export main types
pub use traits::{read_container, ContainerParser, HeaderMeta, ParseError, ParseOptions, ParseResult};

pub use registry::{EncodingDescriptor, EncodingInfo, EncodingRegistry, RegistryError, BUILTIN_ENCODINGS, GLOBAL_REGISTRY};

pub use assemble::assemble;
pub use dds::{DdsHeader, DdsParser};
pub use extract::{extract_faces, level_size};
pub use pvr::{PvrHeader, PvrParser};

/// Pick the parser whose container signature matches `bytes`
pub fn detect_container(bytes: &[u8]) -> Option<&'static dyn ContainerParser> {
    const PARSERS: [&dyn ContainerParser; 2] = [&DdsParser, &PvrParser];
    PARSERS.into_iter().find(|parser| parser.can_parse(bytes))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
