//! Compositions over the loader seams.
//!
//! [`FeedLoaderWithFallback`] and [`ImageDataLoaderWithFallback`] chain a
//! primary and a fallback loader; the cache decorators feed successful
//! loads back into a cache on the way through. Wiring a remote loader, a
//! decorator and a local loader together gives offline-first behavior
//! without any loader knowing about the others.

mod cache_decorator;
mod fallback;

pub use cache_decorator::{FeedLoaderCacheDecorator, ImageDataLoaderCacheDecorator};
pub use fallback::{FeedLoaderWithFallback, ImageDataLoaderWithFallback};
