//! Feed loading and saving against the local store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::policy;
use crate::feed::{FeedCache, FeedError, FeedItem, FeedLoader};
use crate::store::{CachedFeed, CachedItem, FeedStore};

type ClockFn = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Feed loader backed by a local [`FeedStore`].
///
/// Serving and cleanup are deliberately split:
/// - [`load`](FeedLoader::load) reads the snapshot and answers with its
///   items when still valid, or with an empty feed otherwise. It never
///   writes.
/// - [`validate_cache`](LocalFeedLoader::validate_cache) deletes snapshots
///   that are expired or unreadable. Run it on startup or in the
///   background, not on the serving path.
///
/// [`save`](FeedCache::save) replaces the snapshot wholesale, stamped with
/// the current time.
pub struct LocalFeedLoader<S> {
  store: Arc<S>,
  now: ClockFn,
}

impl<S: FeedStore> LocalFeedLoader<S> {
  /// Create a loader reading the system clock.
  pub fn new(store: Arc<S>) -> Self {
    Self::with_clock(store, Utc::now)
  }

  /// Create a loader with an injected clock.
  pub fn with_clock<F>(store: Arc<S>, now: F) -> Self
  where
    F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
  {
    Self {
      store,
      now: Box::new(now),
    }
  }

  /// Delete the cached feed when it is expired or unreadable.
  ///
  /// A healthy or empty cache is left alone. When cleanup is needed, the
  /// result reflects the deletion: an expired snapshot that cannot be
  /// deleted is an error, a successfully removed one is not.
  pub async fn validate_cache(&self) -> Result<(), FeedError> {
    match self.store.retrieve().await {
      Ok(Some(feed)) if !policy::is_valid(feed.timestamp, (self.now)()) => {
        tracing::debug!("cached feed expired, deleting");
        self.store.delete_cached_feed().await?;
        Ok(())
      }
      Ok(_) => Ok(()),
      Err(err) => {
        tracing::warn!(error = %err, "cached feed unreadable, deleting");
        self.store.delete_cached_feed().await?;
        Ok(())
      }
    }
  }
}

#[async_trait]
impl<S: FeedStore> FeedLoader for LocalFeedLoader<S> {
  async fn load(&self) -> Result<Vec<FeedItem>, FeedError> {
    let cached = self.store.retrieve().await?;

    match cached {
      Some(feed) if policy::is_valid(feed.timestamp, (self.now)()) => {
        Ok(feed.items.into_iter().map(FeedItem::from).collect())
      }
      // An expired snapshot reads as empty but stays on disk until the
      // next validation pass.
      _ => Ok(Vec::new()),
    }
  }
}

#[async_trait]
impl<S: FeedStore> FeedCache for LocalFeedLoader<S> {
  async fn save(&self, items: &[FeedItem]) -> Result<(), FeedError> {
    self.store.delete_cached_feed().await?;

    let feed = CachedFeed {
      items: items.iter().cloned().map(CachedItem::from).collect(),
      timestamp: (self.now)(),
    };
    self.store.insert(feed).await?;
    Ok(())
  }
}
