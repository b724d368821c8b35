//! Encoding registry: which container, URL suffix and platform capability
//! belong to each compressed texture family.
//!
//! The registry is built once and never mutated. Lookups by `EncodingId`
//! are total over the built-in table; string lookups (names typed by a
//! user, capability tokens reported by a platform) can fail and return a
//! `RegistryError`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use smartex_core::EncodingId;

use crate::dds::DdsParser;
use crate::pvr::PvrParser;
use crate::traits::ContainerParser;

/// Everything the loader needs to know about one encoding
#[derive(Clone, Copy)]
pub struct EncodingDescriptor {
    /// Encoding identifier
    pub id: EncodingId,
    /// Extension swapped into the texture URL (no leading dot)
    pub suffix: &'static str,
    /// Parser for the container this encoding ships in
    pub parser: &'static dyn ContainerParser,
    /// Platform extension token that signals native support
    pub capability: &'static str,
}

impl std::fmt::Debug for EncodingDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodingDescriptor")
            .field("id", &self.id)
            .field("suffix", &self.suffix)
            .field("parser", &self.parser.name())
            .field("capability", &self.capability)
            .finish()
    }
}

/// Built-in encodings in default priority order
pub const BUILTIN_ENCODINGS: [EncodingDescriptor; 4] = [
    EncodingDescriptor {
        id: EncodingId::Atc,
        suffix: "atc",
        parser: &DdsParser,
        capability: "WEBGL_compressed_texture_atc",
    },
    EncodingDescriptor {
        id: EncodingId::Etc1,
        suffix: "etc",
        parser: &DdsParser,
        capability: "WEBGL_compressed_texture_etc1",
    },
    EncodingDescriptor {
        id: EncodingId::S3tc,
        suffix: "dds",
        parser: &DdsParser,
        capability: "WEBGL_compressed_texture_s3tc",
    },
    EncodingDescriptor {
        id: EncodingId::Pvrtc,
        suffix: "pvr",
        parser: &PvrParser,
        capability: "WEBGL_compressed_texture_pvrtc",
    },
];

/// Read-only table of encodings
pub struct EncodingRegistry {
    /// Descriptors in priority order
    descriptors: Vec<EncodingDescriptor>,
    /// Map of encoding ID to index in `descriptors`
    by_id: HashMap<EncodingId, usize>,
    /// Map of capability token to encoding ID
    by_capability: HashMap<&'static str, EncodingId>,
}

impl EncodingRegistry {
    /// Registry holding the built-in encodings
    pub fn builtin() -> Self {
        Self::with_descriptors(BUILTIN_ENCODINGS).unwrap_or_else(|e| unreachable!("builtin table is valid: {e}"))
    }

    /// Build a registry from descriptors given in priority order
    pub fn with_descriptors(
        descriptors: impl IntoIterator<Item = EncodingDescriptor>,
    ) -> Result<Self, RegistryError> {
        let descriptors: Vec<_> = descriptors.into_iter().collect();
        let mut by_id = HashMap::with_capacity(descriptors.len());
        let mut by_capability = HashMap::with_capacity(descriptors.len());

        for (index, descriptor) in descriptors.iter().enumerate() {
            if by_id.insert(descriptor.id, index).is_some() {
                return Err(RegistryError::DuplicateId(descriptor.id));
            }
            by_capability.insert(descriptor.capability, descriptor.id);
        }

        Ok(Self {
            descriptors,
            by_id,
            by_capability,
        })
    }

    /// Descriptor for an encoding
    ///
    /// # Panics
    /// If `id` is not registered. Every `EncodingId` is in the built-in
    /// table, so this only fires for hand-built registries.
    pub fn get(&self, id: EncodingId) -> &EncodingDescriptor {
        match self.try_get(id) {
            Some(descriptor) => descriptor,
            None => panic!("encoding {id} is not registered"),
        }
    }

    /// Descriptor for an encoding, if registered
    pub fn try_get(&self, id: EncodingId) -> Option<&EncodingDescriptor> {
        self.by_id.get(&id).map(|&index| &self.descriptors[index])
    }

    /// Look up an encoding by a user-facing name ("s3tc", "pvr", ...)
    pub fn by_name(&self, name: &str) -> Result<&EncodingDescriptor, RegistryError> {
        let id: EncodingId = name
            .parse()
            .map_err(|_| RegistryError::UnknownEncoding(name.to_string()))?;
        self.try_get(id)
            .ok_or_else(|| RegistryError::UnknownEncoding(name.to_string()))
    }

    /// Look up an encoding by its platform capability token
    pub fn by_capability(&self, token: &str) -> Result<&EncodingDescriptor, RegistryError> {
        self.by_capability
            .get(token)
            .map(|&id| self.get(id))
            .ok_or_else(|| RegistryError::UnknownCapability(token.to_string()))
    }

    /// Descriptors in priority order
    pub fn iter(&self) -> impl Iterator<Item = &EncodingDescriptor> {
        self.descriptors.iter()
    }

    /// Display information for all registered encodings
    pub fn list(&self) -> Vec<EncodingInfo> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(priority, d)| EncodingInfo {
                id: d.id,
                suffix: d.suffix.to_string(),
                parser: d.parser.name().to_string(),
                capability: d.capability.to_string(),
                versions: d.parser.supported_versions().to_vec(),
                priority,
            })
            .collect()
    }

    /// Parser for a file extension (".dds", "PVR", ...)
    pub fn parser_for_extension(&self, ext: &str) -> Result<&'static dyn ContainerParser, RegistryError> {
        let ext_lower = ext.trim_start_matches('.').to_lowercase();

        self.descriptors
            .iter()
            .map(|d| d.parser)
            .find(|p| p.extensions().contains(&ext_lower.as_str()))
            .ok_or(RegistryError::NoParserForExtension(ext_lower))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for EncodingRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Encoding information for display
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EncodingInfo {
    pub id: EncodingId,
    pub suffix: String,
    pub parser: String,
    pub capability: String,
    /// Container versions the parser accepts, empty if unversioned
    pub versions: Vec<u32>,
    /// 0 is tried first
    pub priority: usize,
}

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Encoding '{0}' already registered")]
    DuplicateId(EncodingId),

    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("No encoding for capability '{0}'")]
    UnknownCapability(String),

    #[error("No parser available for extension '.{0}'")]
    NoParserForExtension(String),
}

/// Global registry instance
pub static GLOBAL_REGISTRY: Lazy<EncodingRegistry> = Lazy::new(EncodingRegistry::builtin);
