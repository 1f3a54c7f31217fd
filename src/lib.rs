//! Offline-first caching for remote feeds and their images.
//!
//! `larder` keeps one feed snapshot plus any number of image blobs in a
//! local store, serves them through loaders that enforce a seven-day
//! expiry policy, and composes local and remote loaders into
//! offline-first pipelines:
//!
//! - [`store`]: the [`FeedStore`] trait with flat-file and SQLite backends
//! - [`cache`]: [`LocalFeedLoader`] and [`LocalImageDataLoader`]
//! - [`remote`]: loaders over pluggable transports
//! - [`composite`]: fallback chains and cache-writing decorators
//! - [`task`]: cancellable handles for push-style image loading
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use larder::{
//!   FeedLoader, FeedLoaderCacheDecorator, FeedLoaderWithFallback,
//!   LocalFeedLoader, RemoteFeedLoader, SqliteFeedStore,
//! };
//!
//! let store = Arc::new(SqliteFeedStore::open(db_path)?);
//! let local = Arc::new(LocalFeedLoader::new(Arc::clone(&store)));
//!
//! // Remote first, cached on the way through; the cache answers offline.
//! let feed = FeedLoaderWithFallback::new(
//!   FeedLoaderCacheDecorator::new(RemoteFeedLoader::new(transport), Arc::clone(&local)),
//!   local,
//! );
//! let items = feed.load().await?;
//! ```

pub mod cache;
pub mod composite;
pub mod feed;
pub mod image;
pub mod remote;
pub mod store;
pub mod task;

pub use cache::{LocalFeedLoader, LocalImageDataLoader};
pub use composite::{
  FeedLoaderCacheDecorator, FeedLoaderWithFallback, ImageDataLoaderCacheDecorator,
  ImageDataLoaderWithFallback,
};
pub use feed::{FeedCache, FeedError, FeedItem, FeedLoader};
pub use image::{ImageDataCache, ImageDataError, ImageDataLoader, ImageDataResult};
pub use remote::{
  FeedTransport, ImageTransport, RemoteFeedItem, RemoteFeedLoader, RemoteImageDataLoader,
  TransportError,
};
pub use store::{
  CachedFeed, CachedItem, FeedStore, FileFeedStore, SqliteFeedStore, StoreError, StoreResult,
};
pub use task::ImageLoadTask;
