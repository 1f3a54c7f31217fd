//! Image data loading and saving against the local store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::image::{ImageDataCache, ImageDataError, ImageDataLoader, ImageDataResult};
use crate::store::FeedStore;

/// Image data loader backed by a local [`FeedStore`].
///
/// Unlike the feed snapshot, cached images never expire; they are evicted
/// only by being overwritten.
pub struct LocalImageDataLoader<S> {
  store: Arc<S>,
}

impl<S: FeedStore> LocalImageDataLoader<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl<S: FeedStore> ImageDataLoader for LocalImageDataLoader<S> {
  async fn load_image_data(&self, url: &Url) -> ImageDataResult {
    match self.store.retrieve_image_data(url).await {
      Ok(Some(data)) => Ok(data),
      Ok(None) => Err(ImageDataError::NotFound),
      Err(err) => Err(ImageDataError::LoadFailed(err)),
    }
  }
}

#[async_trait]
impl<S: FeedStore> ImageDataCache for LocalImageDataLoader<S> {
  async fn save_image_data(&self, url: &Url, data: Bytes) -> Result<(), ImageDataError> {
    self
      .store
      .insert_image_data(url, data)
      .await
      .map_err(ImageDataError::SaveFailed)
  }
}
