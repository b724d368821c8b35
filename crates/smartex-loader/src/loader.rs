//! Capability-negotiating texture loader
//!
//! A load walks an ordered list of encodings. For each one it derives a
//! URL, fetches it and parses the container; the first success wins and
//! any failure moves on to the next encoding. When the list runs out the
//! caller gets a single `NoSupportedEncoding` error carrying every attempt.
//!
//! ```text
//! Idle -> Attempting(e0) -> Attempting(e1) -> ... -> Succeeded(ek)
//!                                              \--> Exhausted
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;
use smartex_core::{AttemptFailure, EncodingId, Error, Result, TextureRecord};
use smartex_parsers::{log_attempt_failed, log_attempt_start, log_load_complete, log_load_exhausted};
use smartex_parsers::{EncodingDescriptor, EncodingRegistry, GLOBAL_REGISTRY};

use crate::capability::CapabilitySet;
use crate::config::LoaderConfig;
use crate::fetch::{FetchProgress, Fetcher};
use crate::url::derive_encoding_url;

/// Where a load is in its fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Attempting(EncodingId),
    Succeeded(EncodingId),
    Exhausted,
}

impl LoadState {
    /// Succeeded or Exhausted
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Succeeded(_) | LoadState::Exhausted)
    }
}

/// A successfully loaded texture and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTexture {
    /// Encoding that succeeded
    pub encoding: EncodingId,
    /// URL the container was fetched from (before the path prefix)
    pub url: String,
    pub texture: TextureRecord,
}

#[derive(Debug)]
struct HandleSlot {
    state: LoadState,
    texture: Option<Arc<LoadedTexture>>,
    error: Option<String>,
}

#[derive(Debug)]
struct HandleInner {
    slot: Mutex<HandleSlot>,
    finished: Condvar,
}

/// Shared view of one load
///
/// Empty until the load succeeds; filled exactly once and never replaced.
#[derive(Debug, Clone)]
pub struct TextureHandle {
    inner: Arc<HandleInner>,
}

impl TextureHandle {
    fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                slot: Mutex::new(HandleSlot {
                    state: LoadState::Idle,
                    texture: None,
                    error: None,
                }),
                finished: Condvar::new(),
            }),
        }
    }

    /// Current state of the load
    pub fn state(&self) -> LoadState {
        self.inner.slot.lock().state
    }

    /// True once a texture has been published
    pub fn is_ready(&self) -> bool {
        self.inner.slot.lock().texture.is_some()
    }

    /// The loaded texture, if the load succeeded
    pub fn get(&self) -> Option<Arc<LoadedTexture>> {
        self.inner.slot.lock().texture.clone()
    }

    /// Message of the terminal error, if the load was exhausted
    pub fn error(&self) -> Option<String> {
        self.inner.slot.lock().error.clone()
    }

    /// Block until the load reaches a terminal state
    pub fn wait(&self) -> Option<Arc<LoadedTexture>> {
        let mut slot = self.inner.slot.lock();
        while !slot.state.is_terminal() {
            self.inner.finished.wait(&mut slot);
        }
        slot.texture.clone()
    }

    fn transition(&self, state: LoadState) {
        self.inner.slot.lock().state = state;
    }

    fn fulfill(&self, loaded: Arc<LoadedTexture>) {
        let mut slot = self.inner.slot.lock();
        slot.state = LoadState::Succeeded(loaded.encoding);
        slot.texture = Some(loaded);
        self.inner.finished.notify_all();
    }

    fn fail(&self, error: &Error) {
        let mut slot = self.inner.slot.lock();
        slot.state = LoadState::Exhausted;
        slot.error = Some(error.to_string());
        self.inner.finished.notify_all();
    }
}

/// Loader that negotiates the best supported encoding per texture
pub struct TextureLoader {
    fetcher: Arc<dyn Fetcher>,
    registry: &'static EncodingRegistry,
    config: LoaderConfig,
    capabilities: CapabilitySet,
}

impl TextureLoader {
    /// Create a loader with default configuration (every encoding enabled)
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_config(fetcher, LoaderConfig::default())
    }

    /// Create a loader from a configuration
    pub fn with_config(fetcher: Arc<dyn Fetcher>, config: LoaderConfig) -> Self {
        let capabilities = config.capability_set();
        Self {
            fetcher,
            registry: &GLOBAL_REGISTRY,
            config,
            capabilities,
        }
    }

    /// Replace the capability set computed from the configuration
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.config.path = Some(path.into());
        self
    }

    pub fn set_with_credentials(&mut self, value: bool) -> &mut Self {
        self.config.with_credentials = value;
        self
    }

    pub fn set_cross_origin(&mut self, value: impl Into<String>) -> &mut Self {
        self.config.cross_origin = Some(value.into());
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Load `url`, trying `encodings` strictly in order
    ///
    /// Exactly one of `on_success` / `on_error` is called, after the handle
    /// has been updated. `on_progress` is forwarded from the fetcher.
    pub fn load<S, P, E>(
        &self,
        url: &str,
        encodings: &[EncodingId],
        on_success: S,
        mut on_progress: P,
        on_error: E,
    ) -> TextureHandle
    where
        S: FnOnce(&LoadedTexture),
        P: FnMut(FetchProgress),
        E: FnOnce(Error),
    {
        let handle = TextureHandle::new();

        match self.run(url, encodings, &mut on_progress, &handle) {
            Ok(loaded) => {
                let loaded = Arc::new(loaded);
                handle.fulfill(Arc::clone(&loaded));
                on_success(&loaded);
            }
            Err(error) => {
                handle.fail(&error);
                on_error(error);
            }
        }

        handle
    }

    /// Load `url` with the loader's capability set, returning the result
    pub fn load_blocking(&self, url: &str) -> Result<LoadedTexture> {
        let handle = TextureHandle::new();
        self.run(url, self.capabilities.ordered(), &mut |_| {}, &handle)
    }

    /// Load independent URLs in parallel
    pub fn load_batch<S>(&self, urls: &[S]) -> Vec<Result<LoadedTexture>>
    where
        S: AsRef<str> + Sync,
    {
        urls.par_iter().map(|url| self.load_blocking(url.as_ref())).collect()
    }

    /// Start a load on the rayon pool and return its handle immediately
    pub fn spawn(self: &Arc<Self>, url: impl Into<String>) -> TextureHandle {
        let handle = TextureHandle::new();
        let loader = Arc::clone(self);
        let task_handle = handle.clone();
        let url = url.into();

        rayon::spawn(move || {
            match loader.run(&url, loader.capabilities.ordered(), &mut |_| {}, &task_handle) {
                Ok(loaded) => task_handle.fulfill(Arc::new(loaded)),
                Err(error) => task_handle.fail(&error),
            }
        });

        handle
    }

    fn run(
        &self,
        url: &str,
        encodings: &[EncodingId],
        on_progress: &mut dyn FnMut(FetchProgress),
        handle: &TextureHandle,
    ) -> Result<LoadedTexture> {
        let span = tracing::info_span!("load", url = %url);
        let _guard = span.enter();

        let mut candidates: VecDeque<EncodingId> = encodings.iter().copied().collect();
        let mut attempts = Vec::new();

        while let Some(encoding) = candidates.pop_front() {
            handle.transition(LoadState::Attempting(encoding));

            let descriptor = self.registry.get(encoding);
            let encoding_url = derive_encoding_url(url, descriptor.suffix);

            let attempt_span = tracing::debug_span!("attempt", encoding = %encoding, url = %encoding_url);
            let _attempt_guard = attempt_span.enter();
            log_attempt_start!(encoding, encoding_url);

            match self.attempt(descriptor, &encoding_url, on_progress) {
                Ok(texture) => {
                    log_load_complete!(encoding, encoding_url, texture);
                    return Ok(LoadedTexture {
                        encoding,
                        url: encoding_url,
                        texture,
                    });
                }
                Err(error) => {
                    log_attempt_failed!(encoding, encoding_url, error);
                    attempts.push(AttemptFailure {
                        encoding,
                        url: encoding_url,
                        error,
                    });
                }
            }
        }

        log_load_exhausted!(url, attempts.len());
        Err(Error::NoSupportedEncoding {
            url: url.to_string(),
            attempts,
        })
    }

    /// Fetch and parse one candidate; any failure ends only this attempt
    fn attempt(
        &self,
        descriptor: &EncodingDescriptor,
        url: &str,
        on_progress: &mut dyn FnMut(FetchProgress),
    ) -> Result<TextureRecord> {
        let bytes = self
            .fetcher
            .fetch(url, &self.config.fetch_options(), on_progress)?;

        descriptor.parser.parse_with_options(bytes, &self.config.parse)
    }
}
