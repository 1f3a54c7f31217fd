//! Image data loading from a remote transport.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::{ImageTransport, TransportError};
use crate::image::{ImageDataError, ImageDataLoader, ImageDataResult};

/// Image data loader that fetches bytes through an [`ImageTransport`].
///
/// Transport failures surface as [`ImageDataError::Connectivity`]. An
/// empty payload is treated as [`ImageDataError::InvalidData`], since no
/// renderable image is zero bytes long.
pub struct RemoteImageDataLoader<T> {
  transport: T,
}

impl<T: ImageTransport> RemoteImageDataLoader<T> {
  pub fn new(transport: T) -> Self {
    Self { transport }
  }
}

#[async_trait]
impl<T: ImageTransport> ImageDataLoader for RemoteImageDataLoader<T> {
  async fn load_image_data(&self, url: &Url) -> ImageDataResult {
    let data = self.transport.fetch_image(url).await.map_err(|err| {
      tracing::debug!(error = %err, "image transport failed");
      ImageDataError::Connectivity
    })?;

    if data.is_empty() {
      return Err(ImageDataError::InvalidData);
    }
    Ok(data)
  }
}
