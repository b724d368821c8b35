//! Unified error handling for smartex
//!
//! This module provides the error taxonomy shared by the parsers and the
//! loader. Parse-time and transport errors are fatal to a single encoding
//! attempt only; `NoSupportedEncoding` is the one error a load surfaces to
//! its caller.

use std::fmt;

use thiserror::Error;

use crate::types::EncodingId;

/// Unified error type for all smartex operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Parse Errors ====================

    /// Magic number at the start of the container did not match
    #[error("Invalid magic bytes: expected {expected:02X?}, found {found:02X?}")]
    InvalidMagic {
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    /// DDS pixel format declares neither a FourCC nor uncompressed RGB data
    #[error("Unsupported DDS pixel format, must contain a FourCC code (flags 0x{flags:08X})")]
    MissingFourCC {
        flags: u32,
    },

    /// FourCC code not present in the DDS format table
    #[error("Unsupported FourCC code '{fourcc}'")]
    UnsupportedFourCC {
        fourcc: String,
    },

    /// Pixel format flag not present in a PVR format table
    #[error("Unsupported {container} pixel format {flag}")]
    UnsupportedPixelFormat {
        container: &'static str,
        flag: u32,
    },

    /// Neither the PVR v3 nor the PVR v2 magic was found
    #[error("Unknown container version (first word 0x{first_word:08X}, v2 tag word 0x{tag_word:08X})")]
    UnknownContainerVersion {
        first_word: u32,
        tag_word: u32,
    },

    /// Cubemap flag set but at least one face bit missing
    #[error("Incomplete cubemap faces (caps2 0x{caps2:08X})")]
    IncompleteCubemap {
        caps2: u32,
    },

    /// A header or mip level extends past the end of the buffer
    #[error("Truncated data: needed {requested} bytes at offset {offset}, buffer holds {available}")]
    TruncatedData {
        offset: usize,
        requested: usize,
        available: usize,
    },

    // ==================== Load Errors ====================

    /// The fetch collaborator could not deliver the bytes
    #[error("Transport failure for {url}: {message}")]
    TransportFailure {
        url: String,
        message: String,
    },

    /// Every candidate encoding failed to fetch or parse
    #[error("No supported encoding could be loaded for {url} ({} attempts)", .attempts.len())]
    NoSupportedEncoding {
        url: String,
        attempts: Vec<AttemptFailure>,
    },

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

/// One failed attempt recorded by the loader
#[derive(Debug)]
pub struct AttemptFailure {
    /// Encoding that was tried
    pub encoding: EncodingId,
    /// URL derived for that encoding
    pub url: String,
    /// Why the attempt failed
    pub error: Error,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.encoding, self.url, self.error)
    }
}

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a truncation error for a read of `requested` bytes at `offset`
    pub fn truncated(offset: usize, requested: usize, available: usize) -> Self {
        Error::TruncatedData {
            offset,
            requested,
            available,
        }
    }

    /// Create a transport error
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TransportFailure {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a structural parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.root(),
            Error::InvalidMagic { .. }
                | Error::MissingFourCC { .. }
                | Error::UnsupportedFourCC { .. }
                | Error::UnsupportedPixelFormat { .. }
                | Error::UnknownContainerVersion { .. }
                | Error::IncompleteCubemap { .. }
                | Error::TruncatedData { .. }
        )
    }

    /// Check if this is a fetch-time error
    pub fn is_transport_error(&self) -> bool {
        matches!(self.root(), Error::TransportFailure { .. } | Error::Io(_))
    }

    /// Check if this error ends a whole load rather than a single attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self.root(), Error::NoSupportedEncoding { .. })
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::IncompleteCubemap { caps2: 0x200 };
        let contextualized = err.with_context("while parsing cube.dds");

        assert!(contextualized.to_string().contains("while parsing cube.dds"));
        assert!(contextualized.is_parse_error());
    }

    #[test]
    fn test_is_parse_error() {
        assert!(Error::truncated(128, 64, 100).is_parse_error());
        assert!(Error::UnsupportedFourCC { fourcc: "BC7 ".into() }.is_parse_error());
        assert!(!Error::transport("a.dds", "HTTP 404").is_parse_error());
    }

    #[test]
    fn test_is_transport_error() {
        assert!(Error::transport("a.dds", "HTTP 404").is_transport_error());
        assert!(!Error::MissingFourCC { flags: 0 }.is_transport_error());
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let err = Error::NoSupportedEncoding {
            url: "shannon.png".into(),
            attempts: vec![AttemptFailure {
                encoding: EncodingId::S3tc,
                url: "shannon.dds".into(),
                error: Error::transport("shannon.dds", "HTTP 404"),
            }],
        };

        assert!(err.is_terminal());
        assert!(err.to_string().contains("1 attempts"));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::MissingFourCC { flags: 0x40 });
        let with_context = result.context("reading header");

        let err = with_context.unwrap_err();
        assert!(err.to_string().starts_with("reading header"));
        assert!(matches!(err.root(), Error::MissingFourCC { flags: 0x40 }));
    }
}
