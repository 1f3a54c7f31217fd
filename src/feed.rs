//! Feed domain types and the capability seams loaders plug into.
//!
//! These types are deliberately encoding-free: what a feed item looks like
//! on disk or on the wire is the business of the store backends and the
//! transport adapters, not of the domain.

use async_trait::async_trait;
use url::Url;

use crate::store::StoreError;

/// A single entry of the feed, in display order.
///
/// Equality is value-based; two items with the same fields are the same
/// item regardless of where they were loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
  /// Opaque unique identifier.
  pub id: String,
  /// Optional description text.
  pub description: Option<String>,
  /// Optional location label.
  pub location: Option<String>,
  /// Where the item's image lives.
  pub image_url: Url,
}

/// Errors surfaced by feed loaders.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
  /// The remote feed could not be reached.
  #[error("could not reach the remote feed")]
  Connectivity,

  /// The remote feed answered with records this crate cannot make sense of.
  #[error("remote feed delivered invalid data")]
  InvalidData,

  /// The local store failed.
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Anything that can produce the current feed.
///
/// Implementations must report exactly one outcome per call. Dropping the
/// returned future abandons the load.
#[async_trait]
pub trait FeedLoader: Send + Sync {
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError>;
}

/// Anything that can persist a feed for later offline use.
///
/// `save` replaces whatever was cached before; there is no merging.
#[async_trait]
pub trait FeedCache: Send + Sync {
  async fn save(&self, items: &[FeedItem]) -> Result<(), FeedError>;
}

// A shared handle behaves like the loader it wraps, so one loader can sit
// in several compositions at once.

#[async_trait]
impl<L: FeedLoader + ?Sized> FeedLoader for std::sync::Arc<L> {
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError> {
    (**self).load().await
  }
}

#[async_trait]
impl<C: FeedCache + ?Sized> FeedCache for std::sync::Arc<C> {
  async fn save(&self, items: &[FeedItem]) -> Result<(), FeedError> {
    (**self).save(items).await
  }
}
