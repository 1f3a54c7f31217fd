//! Feed loading from a remote transport.

use async_trait::async_trait;
use url::Url;

use super::{FeedTransport, RemoteFeedItem};
use crate::feed::{FeedError, FeedItem, FeedLoader};

/// Feed loader that pulls the latest payload from a [`FeedTransport`].
///
/// Transport failures surface as [`FeedError::Connectivity`]; payloads
/// that fail to map surface as [`FeedError::InvalidData`]. One bad item
/// invalidates the whole payload, so a partial feed is never delivered.
pub struct RemoteFeedLoader<T> {
  transport: T,
}

impl<T: FeedTransport> RemoteFeedLoader<T> {
  pub fn new(transport: T) -> Self {
    Self { transport }
  }
}

#[async_trait]
impl<T: FeedTransport> FeedLoader for RemoteFeedLoader<T> {
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError> {
    let payload = self.transport.fetch_feed().await.map_err(|err| {
      tracing::debug!(error = %err, "feed transport failed");
      FeedError::Connectivity
    })?;

    payload.into_iter().map(feed_item).collect()
  }
}

fn feed_item(remote: RemoteFeedItem) -> Result<FeedItem, FeedError> {
  let image_url = Url::parse(&remote.image).map_err(|_| FeedError::InvalidData)?;
  Ok(FeedItem {
    id: remote.id,
    description: remote.description,
    location: remote.location,
    image_url,
  })
}
