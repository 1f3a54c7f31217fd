//! The local cache: loaders over a [`FeedStore`] plus the expiry policy.
//!
//! [`LocalFeedLoader`] serves and maintains the feed snapshot;
//! [`LocalImageDataLoader`] serves the image blobs. Both borrow the store
//! behind an `Arc` so one backend can sit under any number of loaders.
//!
//! [`FeedStore`]: crate::store::FeedStore

mod feed_loader;
mod image_loader;
mod policy;

pub use feed_loader::LocalFeedLoader;
pub use image_loader::LocalImageDataLoader;
