//! smartex loader
//!
//! Picks the best compressed encoding of a texture the platform can use:
//! - Capability set built from the platform's extension tokens
//! - One derived URL per encoding (`grass.png` -> `grass.dds`, `grass.pvr`, ...)
//! - Fallback to the next encoding on any fetch or parse failure
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use smartex_loader::{CapabilitySet, FilesystemFetcher, TextureLoader};
//!
//! let loader = TextureLoader::new(Arc::new(FilesystemFetcher::new("assets")))
//!     .with_capabilities(CapabilitySet::from_tokens(["WEBGL_compressed_texture_s3tc"]));
//!
//! let encodings = loader.capabilities().ordered().to_vec();
//! let handle = loader.load(
//!     "textures/grass.png",
//!     &encodings,
//!     |loaded| println!("loaded {} as {}", loaded.url, loaded.encoding),
//!     |progress| println!("{} bytes", progress.loaded),
//!     |error| eprintln!("{error}"),
//! );
//! assert!(handle.state().is_terminal());
//! ```

pub mod capability;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod stream;
pub mod url;

pub use capability::CapabilitySet;
pub use config::LoaderConfig;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchError, FetchOptions, FetchProgress, FetchResult, Fetcher, FilesystemFetcher};
pub use loader::{LoadState, LoadedTexture, TextureHandle, TextureLoader};
pub use url::derive_encoding_url;
