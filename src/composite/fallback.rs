//! Primary-then-fallback loader composition.

use async_trait::async_trait;
use url::Url;

use crate::feed::{FeedError, FeedItem, FeedLoader};
use crate::image::{ImageDataLoader, ImageDataResult};

/// Feed loader that answers from `primary` and falls back to `fallback`
/// only when the primary fails.
///
/// The fallback is never even consulted on a primary success; on a primary
/// failure its outcome is delivered as-is, errors included.
pub struct FeedLoaderWithFallback<P, F> {
  primary: P,
  fallback: F,
}

impl<P, F> FeedLoaderWithFallback<P, F>
where
  P: FeedLoader,
  F: FeedLoader,
{
  pub fn new(primary: P, fallback: F) -> Self {
    Self { primary, fallback }
  }
}

#[async_trait]
impl<P, F> FeedLoader for FeedLoaderWithFallback<P, F>
where
  P: FeedLoader,
  F: FeedLoader,
{
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError> {
    match self.primary.load().await {
      Ok(items) => Ok(items),
      Err(err) => {
        tracing::debug!(error = %err, "primary feed loader failed, trying fallback");
        self.fallback.load().await
      }
    }
  }
}

/// Image data loader with the same primary-then-fallback contract as
/// [`FeedLoaderWithFallback`].
pub struct ImageDataLoaderWithFallback<P, F> {
  primary: P,
  fallback: F,
}

impl<P, F> ImageDataLoaderWithFallback<P, F>
where
  P: ImageDataLoader,
  F: ImageDataLoader,
{
  pub fn new(primary: P, fallback: F) -> Self {
    Self { primary, fallback }
  }
}

#[async_trait]
impl<P, F> ImageDataLoader for ImageDataLoaderWithFallback<P, F>
where
  P: ImageDataLoader,
  F: ImageDataLoader,
{
  async fn load_image_data(&self, url: &Url) -> ImageDataResult {
    match self.primary.load_image_data(url).await {
      Ok(data) => Ok(data),
      Err(err) => {
        tracing::debug!(error = %err, "primary image loader failed, trying fallback");
        self.fallback.load_image_data(url).await
      }
    }
  }
}
