//! smartex Core Library
//!
//! This crate provides the texture data model and the error taxonomy
//! shared across all smartex components.

pub mod error;
pub mod types;

pub use error::{AttemptFailure, Error, Result, ResultExt};
pub use types::*;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
    pub use crate::types::*;
}
