//! Flat-file store backend.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use url::Url;

use super::{roundtrip, CachedFeed, Command, FeedStore, StoreError, StoreResult};

/// Flat-file [`FeedStore`].
///
/// Layout under the root directory:
/// - `feed.json`: the snapshot (items plus timestamp) as one JSON document
/// - `images/<sha256-of-url>`: one file per cached image
///
/// All disk I/O runs on a dedicated worker task that drains commands in
/// arrival order, so callers get the trait's ordering guarantee without any
/// locking. Share a store behind an [`std::sync::Arc`]; the worker stops
/// after the last handle is dropped and the queue has drained.
pub struct FileFeedStore {
  tx: mpsc::UnboundedSender<Command>,
}

impl FileFeedStore {
  /// Open a store rooted at `root`, spawning its worker task.
  ///
  /// Nothing is touched on disk until the first write; a missing root reads
  /// as an empty store. Must be called from within a Tokio runtime.
  pub fn open(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(root, rx));
    Self { tx }
  }

  /// The conventional root, `<data dir>/larder/feed`, or `None` when no
  /// data directory can be determined.
  pub fn default_root() -> Option<PathBuf> {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|dir| dir.join("larder").join("feed"))
  }
}

#[async_trait]
impl FeedStore for FileFeedStore {
  async fn delete_cached_feed(&self) -> StoreResult<()> {
    roundtrip(&self.tx, |reply| Command::DeleteCachedFeed { reply }).await
  }

  async fn insert(&self, feed: CachedFeed) -> StoreResult<()> {
    roundtrip(&self.tx, |reply| Command::Insert { feed, reply }).await
  }

  async fn retrieve(&self) -> StoreResult<Option<CachedFeed>> {
    roundtrip(&self.tx, |reply| Command::Retrieve { reply }).await
  }

  async fn retrieve_image_data(&self, url: &Url) -> StoreResult<Option<Bytes>> {
    let url = url.clone();
    roundtrip(&self.tx, |reply| Command::RetrieveImageData { url, reply }).await
  }

  async fn insert_image_data(&self, url: &Url, data: Bytes) -> StoreResult<()> {
    let url = url.clone();
    roundtrip(&self.tx, |reply| Command::InsertImageData { url, data, reply }).await
  }
}

async fn run_worker(root: PathBuf, mut rx: mpsc::UnboundedReceiver<Command>) {
  while let Some(command) = rx.recv().await {
    // Replies can fail when the caller gave up waiting; the operation has
    // already taken effect either way.
    match command {
      Command::DeleteCachedFeed { reply } => {
        let _ = reply.send(delete_feed(&root).await);
      }
      Command::Insert { feed, reply } => {
        let _ = reply.send(write_feed(&root, &feed).await);
      }
      Command::Retrieve { reply } => {
        let _ = reply.send(read_feed(&root).await);
      }
      Command::RetrieveImageData { url, reply } => {
        let _ = reply.send(read_image(&root, &url).await);
      }
      Command::InsertImageData { url, data, reply } => {
        let _ = reply.send(write_image(&root, &url, &data).await);
      }
    }
  }
  tracing::debug!(root = %root.display(), "file store worker stopped");
}

fn feed_path(root: &Path) -> PathBuf {
  root.join("feed.json")
}

fn images_dir(root: &Path) -> PathBuf {
  root.join("images")
}

/// Image blobs are keyed by the SHA-256 of the URL string, which keeps file
/// names fixed-length and free of path separators.
fn image_path(root: &Path, url: &Url) -> PathBuf {
  let digest = Sha256::digest(url.as_str().as_bytes());
  images_dir(root).join(hex::encode(digest))
}

async fn read_feed(root: &Path) -> StoreResult<Option<CachedFeed>> {
  let bytes = match fs::read(feed_path(root)).await {
    Ok(bytes) => bytes,
    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(err) => return Err(err.into()),
  };

  let feed = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
  Ok(Some(feed))
}

async fn write_feed(root: &Path, feed: &CachedFeed) -> StoreResult<()> {
  let bytes =
    serde_json::to_vec(feed).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

  fs::create_dir_all(root).await?;
  write_atomically(&feed_path(root), &bytes).await
}

async fn delete_feed(root: &Path) -> StoreResult<()> {
  match fs::remove_file(feed_path(root)).await {
    Ok(()) => Ok(()),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(err) => Err(err.into()),
  }
}

async fn read_image(root: &Path, url: &Url) -> StoreResult<Option<Bytes>> {
  match fs::read(image_path(root, url)).await {
    Ok(bytes) => Ok(Some(Bytes::from(bytes))),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(err) => Err(err.into()),
  }
}

async fn write_image(root: &Path, url: &Url, data: &[u8]) -> StoreResult<()> {
  fs::create_dir_all(images_dir(root)).await?;
  write_atomically(&image_path(root, url), data).await
}

/// Write to a sibling temp file, fsync, then rename over the target, so the
/// file on disk is always either the old content or the new one.
async fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
  let tmp = path.with_extension("tmp");

  let mut file = fs::File::create(&tmp).await?;
  file.write_all(bytes).await?;
  file.sync_all().await?;
  drop(file);

  fs::rename(&tmp, path).await?;
  Ok(())
}
