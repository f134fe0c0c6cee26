mod http;

pub use http::HttpManifestSource;

use async_trait::async_trait;
use log::debug;

use crate::cloud::{Manifest, Selector, VirtualizationType};

/// Anything that can hand back a channel's manifest.
///
/// Implementations must fetch fresh on every call; the resolver relies on that
/// to pick up upstream changes on read.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn fetch(&self, channel: &str) -> Result<Manifest, ResolveError>;
}

/// Scan `manifest` in feed order and return the image id of the first entry
/// for `region`.
pub fn find_image<'a>(manifest: &'a Manifest, region: &str, virtualization_type: VirtualizationType) -> Option<&'a str> {
    manifest
        .entries()
        .iter()
        .find(|entry| entry.region_name() == region)
        .map(|entry| entry.image_id(virtualization_type))
}

/// Resolves a [`Selector`] to an AMI id.
#[derive(Debug, Clone)]
pub struct AmiResolver<S> {
    source: S,
}

impl<S: ManifestSource> AmiResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the channel manifest and pick the image for the selector.
    ///
    /// Exactly one fetch per call; the id comes back exactly as published.
    pub async fn resolve(&self, selector: &Selector) -> Result<String, ResolveError> {
        let manifest = self.source.fetch(selector.channel()).await?;

        let image_id = find_image(&manifest, selector.region(), selector.virtualization_type())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ResolveError::NotFound {
                channel: selector.channel().to_string(),
                region: selector.region().to_string(),
            })?;

        debug!("resolved {} to {image_id}", selector.identity());
        Ok(image_id.to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("failed to fetch manifest from '{url}': {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode manifest from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no ami found")]
    NotFound { channel: String, region: String },
    #[error("invalid type: {0}")]
    InvalidType(String),
    #[error("empty channel")]
    EmptyChannel,
}

impl ResolveError {
    /// True for errors caused by the selector itself rather than the feed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ResolveError::InvalidType(_) | ResolveError::EmptyChannel)
    }
}
