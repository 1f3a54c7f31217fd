//! SQLite store backend.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tokio::sync::mpsc;
use url::Url;

use super::{roundtrip, CachedFeed, CachedItem, Command, FeedStore, StoreError, StoreResult};

/// SQLite-backed [`FeedStore`].
///
/// The snapshot is normalized into two tables, `feed_snapshot` and
/// `feed_item`, so item order survives as an explicit `position` column;
/// image blobs live in `image_data` keyed by URL. A dedicated worker thread
/// owns the connection and drains commands in arrival order, with every
/// feed write wrapped in a transaction.
pub struct SqliteFeedStore {
  tx: mpsc::UnboundedSender<Command>,
}

impl SqliteFeedStore {
  /// Open or create the database at `path` and spawn the worker thread.
  pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
    let path = path.into();

    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&path).map_err(db_err)?;
    conn.execute_batch(SCHEMA).map_err(db_err)?;

    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
      .name("larder-sqlite".into())
      .spawn(move || run_worker(conn, rx))?;

    Ok(Self { tx })
  }

  /// The conventional database path, `<data dir>/larder/feed.db`, or `None`
  /// when no data directory can be determined.
  pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|dir| dir.join("larder").join("feed.db"))
  }
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
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

/// Schema for the cache database.
const SCHEMA: &str = r#"
-- The one feed snapshot; the CHECK pins the table to a single row.
CREATE TABLE IF NOT EXISTS feed_snapshot (
    id INTEGER PRIMARY KEY CHECK (id = 0),
    timestamp TEXT NOT NULL
);

-- Snapshot items in display order.
CREATE TABLE IF NOT EXISTS feed_item (
    position INTEGER PRIMARY KEY,
    item_id TEXT NOT NULL,
    description TEXT,
    location TEXT,
    image_url TEXT NOT NULL
);

-- Image blobs keyed by source URL.
CREATE TABLE IF NOT EXISTS image_data (
    url TEXT PRIMARY KEY,
    data BLOB NOT NULL
);
"#;

fn run_worker(mut conn: Connection, mut rx: mpsc::UnboundedReceiver<Command>) {
  while let Some(command) = rx.blocking_recv() {
    // Replies can fail when the caller gave up waiting; the operation has
    // already taken effect either way.
    match command {
      Command::DeleteCachedFeed { reply } => {
        let _ = reply.send(delete_feed(&mut conn));
      }
      Command::Insert { feed, reply } => {
        let _ = reply.send(write_feed(&mut conn, &feed));
      }
      Command::Retrieve { reply } => {
        let _ = reply.send(read_feed(&conn));
      }
      Command::RetrieveImageData { url, reply } => {
        let _ = reply.send(read_image(&conn, &url));
      }
      Command::InsertImageData { url, data, reply } => {
        let _ = reply.send(write_image(&conn, &url, &data));
      }
    }
  }
  tracing::debug!("sqlite store worker stopped");
}

fn db_err(err: rusqlite::Error) -> StoreError {
  StoreError::Database(err.to_string())
}

fn delete_feed(conn: &mut Connection) -> StoreResult<()> {
  let tx = conn.transaction().map_err(db_err)?;
  tx.execute("DELETE FROM feed_item", []).map_err(db_err)?;
  tx.execute("DELETE FROM feed_snapshot", []).map_err(db_err)?;
  tx.commit().map_err(db_err)?;
  Ok(())
}

fn write_feed(conn: &mut Connection, feed: &CachedFeed) -> StoreResult<()> {
  let tx = conn.transaction().map_err(db_err)?;

  tx.execute("DELETE FROM feed_item", []).map_err(db_err)?;
  tx.execute(
    "INSERT OR REPLACE INTO feed_snapshot (id, timestamp) VALUES (0, ?)",
    params![feed.timestamp.to_rfc3339()],
  )
  .map_err(db_err)?;

  for (position, item) in feed.items.iter().enumerate() {
    tx.execute(
      "INSERT INTO feed_item (position, item_id, description, location, image_url)
       VALUES (?, ?, ?, ?, ?)",
      params![
        position as i64,
        item.id,
        item.description,
        item.location,
        item.image_url.as_str()
      ],
    )
    .map_err(db_err)?;
  }

  tx.commit().map_err(db_err)?;
  Ok(())
}

fn read_feed(conn: &Connection) -> StoreResult<Option<CachedFeed>> {
  let raw_timestamp: String = match conn.query_row(
    "SELECT timestamp FROM feed_snapshot WHERE id = 0",
    [],
    |row| row.get(0),
  ) {
    Ok(value) => value,
    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
    Err(err) => return Err(db_err(err)),
  };
  let timestamp = parse_timestamp(&raw_timestamp)?;

  let mut stmt = conn
    .prepare("SELECT item_id, description, location, image_url FROM feed_item ORDER BY position")
    .map_err(db_err)?;
  let rows = stmt
    .query_map([], |row| {
      Ok((
        row.get::<_, String>(0)?,
        row.get::<_, Option<String>>(1)?,
        row.get::<_, Option<String>>(2)?,
        row.get::<_, String>(3)?,
      ))
    })
    .map_err(db_err)?;

  let mut items = Vec::new();
  for row in rows {
    let (id, description, location, raw_url) = row.map_err(db_err)?;
    let image_url = Url::parse(&raw_url)
      .map_err(|e| StoreError::Corrupt(format!("bad image URL '{raw_url}': {e}")))?;
    items.push(CachedItem {
      id,
      description,
      location,
      image_url,
    });
  }

  Ok(Some(CachedFeed { items, timestamp }))
}

fn read_image(conn: &Connection, url: &Url) -> StoreResult<Option<Bytes>> {
  match conn.query_row(
    "SELECT data FROM image_data WHERE url = ?",
    params![url.as_str()],
    |row| row.get::<_, Vec<u8>>(0),
  ) {
    Ok(data) => Ok(Some(Bytes::from(data))),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(err) => Err(db_err(err)),
  }
}

fn write_image(conn: &Connection, url: &Url, data: &[u8]) -> StoreResult<()> {
  conn
    .execute(
      "INSERT OR REPLACE INTO image_data (url, data) VALUES (?, ?)",
      params![url.as_str(), data],
    )
    .map_err(db_err)?;
  Ok(())
}

/// Parse a timestamp stored in RFC 3339 form.
fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| StoreError::Corrupt(format!("bad snapshot timestamp '{raw}': {e}")))
}
