//! Storage backends for the cached feed and its images.
//!
//! Two interchangeable backends implement [`FeedStore`]:
//! - [`FileFeedStore`]: one serialized snapshot file plus a directory of
//!   image blobs
//! - [`SqliteFeedStore`]: a structured, position-indexed SQLite database
//!
//! Both funnel every operation through a single worker draining an ordered
//! command queue, which is what makes "operations on one store instance
//! complete in submission order, each fully durable before the next" a
//! one-line guarantee instead of a locking protocol.

mod file;
mod sqlite;

pub use file::FileFeedStore;
pub use sqlite::SqliteFeedStore;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use url::Url;

use crate::feed::FeedItem;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// Persisted data exists but cannot be decoded.
  #[error("corrupt cache data: {0}")]
  Corrupt(String),

  /// Filesystem failure (missing path, permissions, disk trouble).
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  /// SQLite failure.
  #[error("database error: {0}")]
  Database(String),

  /// The store's worker has shut down; no further operations can run.
  #[error("store worker has shut down")]
  WorkerGone,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level record of a feed item. Mirrors [`FeedItem`] field for field
/// and carries the serde derives the flat-file backend encodes with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedItem {
  pub id: String,
  pub description: Option<String>,
  pub location: Option<String>,
  pub image_url: Url,
}

/// The single feed snapshot a store holds: items in display order plus the
/// moment the snapshot was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeed {
  pub items: Vec<CachedItem>,
  pub timestamp: DateTime<Utc>,
}

impl From<FeedItem> for CachedItem {
  fn from(item: FeedItem) -> Self {
    Self {
      id: item.id,
      description: item.description,
      location: item.location,
      image_url: item.image_url,
    }
  }
}

impl From<CachedItem> for FeedItem {
  fn from(record: CachedItem) -> Self {
    Self {
      id: record.id,
      description: record.description,
      location: record.location,
      image_url: record.image_url,
    }
  }
}

/// Persistence capability for one feed snapshot plus any number of image
/// blobs keyed by URL.
///
/// All implementations must satisfy these invariants:
/// - At most one snapshot exists at a time. `insert` replaces it wholesale;
///   readers never observe a torn or partial feed, not even after a failed
///   insert.
/// - Deleting an absent feed is a no-op success.
/// - Operations submitted against one instance take effect in submission
///   order, each fully complete (durability included) before the next
///   begins.
/// - Retrieval never mutates state; expiry is the feed loader's business,
///   never the store's.
/// - Every failure is surfaced to the caller; the store never retries.
#[async_trait]
pub trait FeedStore: Send + Sync {
  /// Remove the current snapshot if present. Succeeds trivially when the
  /// store is empty. Image data is not touched.
  async fn delete_cached_feed(&self) -> StoreResult<()>;

  /// Replace the current snapshot wholesale.
  async fn insert(&self, feed: CachedFeed) -> StoreResult<()>;

  /// The current snapshot, or `None` when the store is empty.
  async fn retrieve(&self) -> StoreResult<Option<CachedFeed>>;

  /// Cached bytes for `url`, or `None` when nothing was cached for it.
  async fn retrieve_image_data(&self, url: &Url) -> StoreResult<Option<Bytes>>;

  /// Store `data` under `url`, replacing any previous bytes for that key.
  async fn insert_image_data(&self, url: &Url, data: Bytes) -> StoreResult<()>;
}

/// One queued store operation with its reply channel. Workers execute these
/// strictly in arrival order.
pub(crate) enum Command {
  DeleteCachedFeed {
    reply: oneshot::Sender<StoreResult<()>>,
  },
  Insert {
    feed: CachedFeed,
    reply: oneshot::Sender<StoreResult<()>>,
  },
  Retrieve {
    reply: oneshot::Sender<StoreResult<Option<CachedFeed>>>,
  },
  RetrieveImageData {
    url: Url,
    reply: oneshot::Sender<StoreResult<Option<Bytes>>>,
  },
  InsertImageData {
    url: Url,
    data: Bytes,
    reply: oneshot::Sender<StoreResult<()>>,
  },
}

/// Enqueue a command and wait for the worker's reply.
///
/// Sending is synchronous, so the position in the worker's queue is fixed
/// the moment the call is first polled; a dead worker surfaces as
/// [`StoreError::WorkerGone`] on either end of the round trip.
pub(crate) async fn roundtrip<T>(
  tx: &mpsc::UnboundedSender<Command>,
  make: impl FnOnce(oneshot::Sender<StoreResult<T>>) -> Command,
) -> StoreResult<T> {
  let (reply, result) = oneshot::channel();
  tx.send(make(reply)).map_err(|_| StoreError::WorkerGone)?;
  result.await.map_err(|_| StoreError::WorkerGone)?
}
