//! Remote loaders over pluggable transports.
//!
//! The transports stay opaque: anything that can produce a feed payload or
//! image bytes plugs in here, and the loaders only translate transport
//! failures into the domain error vocabulary.

mod feed;
mod image;

pub use feed::RemoteFeedLoader;
pub use image::RemoteImageDataLoader;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use url::Url;

/// Opaque transport failure. The loaders do not care why a transport
/// failed, only that it did.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// One feed item as delivered by a remote backend. The image URL arrives
/// as a raw string and is validated during mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFeedItem {
  pub id: String,
  pub description: Option<String>,
  pub location: Option<String>,
  pub image: String,
}

/// Source of remote feed payloads.
#[async_trait]
pub trait FeedTransport: Send + Sync {
  async fn fetch_feed(&self) -> Result<Vec<RemoteFeedItem>, TransportError>;
}

/// Source of remote image bytes.
#[async_trait]
pub trait ImageTransport: Send + Sync {
  async fn fetch_image(&self, url: &Url) -> Result<Bytes, TransportError>;
}
