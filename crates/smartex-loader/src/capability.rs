//! Platform capability set
//!
//! Built once from the extension tokens a platform reports. The set keeps
//! registry priority order, so iterating it yields the fallback chain.

use smartex_core::EncodingId;
use smartex_parsers::{EncodingRegistry, GLOBAL_REGISTRY};

/// Encodings the platform can use natively, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    encodings: Vec<EncodingId>,
}

impl CapabilitySet {
    /// Every registered encoding
    pub fn all() -> Self {
        Self {
            encodings: GLOBAL_REGISTRY.iter().map(|d| d.id).collect(),
        }
    }

    /// No encodings at all
    pub fn empty() -> Self {
        Self { encodings: Vec::new() }
    }

    /// Filter the global registry by reported extension tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_tokens_in(&GLOBAL_REGISTRY, tokens)
    }

    /// Filter `registry` by reported extension tokens
    ///
    /// Unknown tokens are ignored; order always follows the registry.
    pub fn from_tokens_in<I, S>(registry: &EncodingRegistry, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        for token in &tokens {
            if registry.by_capability(token.as_ref()).is_err() {
                tracing::debug!(token = token.as_ref(), "Ignoring unknown capability token");
            }
        }

        let encodings = registry
            .iter()
            .filter(|d| tokens.iter().any(|t| t.as_ref() == d.capability))
            .map(|d| d.id)
            .collect();

        Self { encodings }
    }

    /// Use an explicit order; duplicates are dropped
    pub fn from_encodings(encodings: impl IntoIterator<Item = EncodingId>) -> Self {
        let mut ordered = Vec::new();
        for id in encodings {
            if !ordered.contains(&id) {
                ordered.push(id);
            }
        }
        Self { encodings: ordered }
    }

    pub fn contains(&self, id: EncodingId) -> bool {
        self.encodings.contains(&id)
    }

    /// Encodings in the order they are tried
    pub fn ordered(&self) -> &[EncodingId] {
        &self.encodings
    }

    pub fn len(&self) -> usize {
        self.encodings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encodings.is_empty()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_wins() {
        let set = CapabilitySet::from_tokens([
            "WEBGL_compressed_texture_pvrtc",
            "WEBGL_compressed_texture_s3tc",
        ]);
        assert_eq!(set.ordered(), &[EncodingId::S3tc, EncodingId::Pvrtc]);
        assert!(!set.contains(EncodingId::Atc));
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let set = CapabilitySet::from_tokens(vec![
            "WEBGL_compressed_texture_astc".to_string(),
            "WEBGL_compressed_texture_etc1".to_string(),
        ]);
        assert_eq!(set.ordered(), &[EncodingId::Etc1]);
    }

    #[test]
    fn test_all_and_empty() {
        assert_eq!(CapabilitySet::all().ordered(), &EncodingId::ALL);
        assert!(CapabilitySet::empty().is_empty());
        assert!(CapabilitySet::from_tokens(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_explicit_order_dedupes() {
        let set = CapabilitySet::from_encodings([EncodingId::Pvrtc, EncodingId::S3tc, EncodingId::Pvrtc]);
        assert_eq!(set.ordered(), &[EncodingId::Pvrtc, EncodingId::S3tc]);
        assert_eq!(set.len(), 2);
    }
}
