//! Codec negotiation over the static profile catalog.

use std::sync::Arc;

use crate::models::codec::{default_catalog, CodecProfile};
use crate::models::error::CaptureError;
use crate::traits::media_backend::MediaBackend;

/// Walks the ordered codec catalog against the runtime's reported support.
pub struct CodecNegotiator<B: MediaBackend> {
    backend: Arc<B>,
    catalog: Vec<CodecProfile>,
}

impl<B: MediaBackend> CodecNegotiator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_catalog(backend, default_catalog())
    }

    /// Use an externally supplied catalog (e.g. loaded from configuration).
    pub fn with_catalog(backend: Arc<B>, catalog: Vec<CodecProfile>) -> Self {
        Self { backend, catalog }
    }

    pub fn catalog(&self) -> &[CodecProfile] {
        &self.catalog
    }

    /// Pick a usable codec profile.
    ///
    /// A supported preference wins; otherwise the catalog is walked in
    /// priority order and the first supported entry is returned. An empty
    /// usable set is fatal — recording cannot proceed at all — so it is
    /// surfaced as `NoCodecAvailable`, never silently defaulted.
    pub fn negotiate(&self, preferred: Option<&str>) -> Result<CodecProfile, CaptureError> {
        if let Some(name) = preferred {
            if let Some(profile) = self.catalog.iter().find(|p| p.name == name) {
                if self.backend.is_type_supported(&profile.mime_type) {
                    return Ok(profile.clone());
                }
                log::warn!("preferred codec {} is not supported; walking catalog order", name);
            } else {
                log::warn!("preferred codec {} is not in the catalog; walking catalog order", name);
            }
        }

        self.catalog
            .iter()
            .find(|p| self.backend.is_type_supported(&p.mime_type))
            .cloned()
            .ok_or(CaptureError::NoCodecAvailable)
    }

    /// The catalog walk with no preference, for pre-flight UI display
    /// before a device is even selected.
    pub fn recommend_default(&self) -> Result<CodecProfile, CaptureError> {
        self.negotiate(None)
    }

    /// The ordered usable subset of the catalog.
    pub fn supported_profiles(&self) -> Vec<CodecProfile> {
        self.catalog
            .iter()
            .filter(|p| self.backend.is_type_supported(&p.mime_type))
            .cloned()
            .collect()
    }
}
