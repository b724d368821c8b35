//! Loader configuration

use serde::{Deserialize, Serialize};
use smartex_core::{Error, Result};
use smartex_parsers::{ParseOptions, GLOBAL_REGISTRY};

use crate::capability::CapabilitySet;
use crate::fetch::FetchOptions;

/// Settings for a `TextureLoader`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix prepended to every fetched URL
    pub path: Option<String>,
    /// Send credentials with cross-origin requests
    pub with_credentials: bool,
    /// Cross-origin mode label handed to the fetcher
    pub cross_origin: Option<String>,
    /// Container parsing options
    pub parse: ParseOptions,
    /// Platform extension tokens; `None` means every registered encoding
    pub capabilities: Option<Vec<String>>,
}

impl LoaderConfig {
    pub fn set_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn set_with_credentials(mut self, value: bool) -> Self {
        self.with_credentials = value;
        self
    }

    pub fn set_cross_origin(mut self, value: impl Into<String>) -> Self {
        self.cross_origin = Some(value.into());
        self
    }

    pub fn set_capabilities<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Reject capability tokens no encoding answers to
    pub fn validate(&self) -> Result<()> {
        if let Some(tokens) = &self.capabilities {
            for token in tokens {
                GLOBAL_REGISTRY
                    .by_capability(token)
                    .map_err(|e| Error::invalid_config(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Options passed through to the fetcher
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            path: self.path.clone(),
            with_credentials: self.with_credentials,
            cross_origin: self.cross_origin.clone(),
        }
    }

    /// Capability set described by this configuration
    pub fn capability_set(&self) -> CapabilitySet {
        match &self.capabilities {
            Some(tokens) => CapabilitySet::from_tokens(tokens),
            None => CapabilitySet::all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartex_core::EncodingId;

    #[test]
    fn test_setters() {
        let config = LoaderConfig::default()
            .set_path("textures/")
            .set_with_credentials(true)
            .set_cross_origin("anonymous");

        let options = config.fetch_options();
        assert_eq!(options.path.as_deref(), Some("textures/"));
        assert!(options.with_credentials);
        assert_eq!(options.cross_origin.as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_json_with_defaults() {
        let config: LoaderConfig = serde_json::from_str(
            r#"{
                "path": "assets/",
                "parse": { "load_mipmaps": false },
                "capabilities": ["WEBGL_compressed_texture_s3tc"]
            }"#,
        )
        .unwrap();

        assert!(!config.parse.load_mipmaps);
        assert!(config.parse.use_memory_mapping);
        assert!(!config.with_credentials);
        assert_eq!(config.capability_set().ordered(), &[EncodingId::S3tc]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_capability_is_invalid() {
        let config = LoaderConfig::default().set_capabilities(["WEBGL_compressed_texture_bptc"]);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_default_uses_every_encoding() {
        assert_eq!(LoaderConfig::default().capability_set(), CapabilitySet::all());
    }
}
