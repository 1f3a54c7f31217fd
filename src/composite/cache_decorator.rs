//! Decorators that cache whatever their loader delivers.

use async_trait::async_trait;
use url::Url;

use crate::feed::{FeedCache, FeedError, FeedItem, FeedLoader};
use crate::image::{ImageDataCache, ImageDataLoader, ImageDataResult};

/// Feed loader that saves every successful load into a [`FeedCache`].
///
/// The save runs to completion before the items are delivered, but its
/// outcome never changes the load's: a failed save is logged and dropped.
/// Fresh items matter more than a warm cache.
pub struct FeedLoaderCacheDecorator<L, C> {
  loader: L,
  cache: C,
}

impl<L, C> FeedLoaderCacheDecorator<L, C>
where
  L: FeedLoader,
  C: FeedCache,
{
  pub fn new(loader: L, cache: C) -> Self {
    Self { loader, cache }
  }
}

#[async_trait]
impl<L, C> FeedLoader for FeedLoaderCacheDecorator<L, C>
where
  L: FeedLoader,
  C: FeedCache,
{
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError> {
    let items = self.loader.load().await?;

    if let Err(err) = self.cache.save(&items).await {
      tracing::debug!(error = %err, "caching loaded feed failed");
    }
    Ok(items)
  }
}

/// Image data loader that saves every successful load into an
/// [`ImageDataCache`], with the same fire-and-forget save outcome as
/// [`FeedLoaderCacheDecorator`].
pub struct ImageDataLoaderCacheDecorator<L, C> {
  loader: L,
  cache: C,
}

impl<L, C> ImageDataLoaderCacheDecorator<L, C>
where
  L: ImageDataLoader,
  C: ImageDataCache,
{
  pub fn new(loader: L, cache: C) -> Self {
    Self { loader, cache }
  }
}

#[async_trait]
impl<L, C> ImageDataLoader for ImageDataLoaderCacheDecorator<L, C>
where
  L: ImageDataLoader,
  C: ImageDataCache,
{
  async fn load_image_data(&self, url: &Url) -> ImageDataResult {
    let data = self.loader.load_image_data(url).await?;

    if let Err(err) = self.cache.save_image_data(url, data.clone()).await {
      tracing::debug!(error = %err, "caching loaded image failed");
    }
    Ok(data)
  }
}
