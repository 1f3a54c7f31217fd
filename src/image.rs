//! Image data capability seams.
//!
//! Image bytes are loaded and cached independently from the feed snapshot
//! that references them; a feed item's image may be cached before, after,
//! or never relative to the item itself.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::store::StoreError;

/// Result of an image data load.
pub type ImageDataResult = Result<Bytes, ImageDataError>;

/// Errors surfaced by image data loaders and caches.
///
/// A cache miss (`NotFound`) is a domain outcome, not an I/O failure:
/// callers that want to distinguish "we never cached this" from "the store
/// is broken" can.
#[derive(Debug, thiserror::Error)]
pub enum ImageDataError {
  /// No cached image exists for this URL.
  #[error("no cached image data for this url")]
  NotFound,

  /// The store failed while reading image data.
  #[error("failed to load image data")]
  LoadFailed(#[source] StoreError),

  /// The store failed while writing image data.
  #[error("failed to save image data")]
  SaveFailed(#[source] StoreError),

  /// The remote image could not be reached.
  #[error("could not reach the remote image")]
  Connectivity,

  /// The remote answered with a payload that is not a usable image.
  #[error("remote delivered invalid image data")]
  InvalidData,
}

/// Anything that can produce the bytes behind an image URL.
///
/// Implementations must report exactly one outcome per call and abandon
/// in-flight work when the returned future is dropped; that drop is the
/// cancellation path composites and [`crate::task::ImageLoadTask`] rely on.
#[async_trait]
pub trait ImageDataLoader: Send + Sync {
  async fn load_image_data(&self, url: &Url) -> ImageDataResult;
}

/// Anything that can persist image bytes under their URL.
#[async_trait]
pub trait ImageDataCache: Send + Sync {
  async fn save_image_data(&self, url: &Url, data: Bytes) -> Result<(), ImageDataError>;
}

// A shared handle behaves like the loader it wraps, so one loader can sit
// in several compositions at once.

#[async_trait]
impl<L: ImageDataLoader + ?Sized> ImageDataLoader for std::sync::Arc<L> {
  async fn load_image_data(&self, url: &Url) -> ImageDataResult {
    (**self).load_image_data(url).await
  }
}

#[async_trait]
impl<C: ImageDataCache + ?Sized> ImageDataCache for std::sync::Arc<C> {
  async fn save_image_data(&self, url: &Url, data: Bytes) -> Result<(), ImageDataError> {
    (**self).save_image_data(url, data).await
  }
}
