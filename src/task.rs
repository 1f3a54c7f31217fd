//! Cancellable, handle-based image loading.
//!
//! [`ImageLoadTask`] is the push-style counterpart to awaiting
//! [`ImageDataLoader::load_image_data`] directly: callers that cannot sit
//! on a future (UI code, schedulers) get a handle they can keep, cancel,
//! or drop, and the outcome arrives through a completion callback instead.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use url::Url;

use crate::image::{ImageDataLoader, ImageDataResult};

type Completion = Box<dyn FnOnce(ImageDataResult) + Send>;

/// Handle to one in-flight image load.
///
/// The completion runs at most once: with the load's outcome, or never
/// when [`cancel`](ImageLoadTask::cancel) claims it first. Dropping the
/// handle without cancelling detaches the load; it keeps running and
/// still delivers.
pub struct ImageLoadTask {
  completion: Arc<Mutex<Option<Completion>>>,
  handle: JoinHandle<()>,
}

impl ImageLoadTask {
  /// Start loading `url` through `loader`, delivering the outcome to
  /// `completion` when done. Must be called from within a Tokio runtime.
  pub fn spawn<L>(
    loader: Arc<L>,
    url: Url,
    completion: impl FnOnce(ImageDataResult) + Send + 'static,
  ) -> Self
  where
    L: ImageDataLoader + ?Sized + 'static,
  {
    let completion: Arc<Mutex<Option<Completion>>> =
      Arc::new(Mutex::new(Some(Box::new(completion))));
    let gate = Arc::clone(&completion);

    let handle = tokio::spawn(async move {
      let result = loader.load_image_data(&url).await;
      if let Some(deliver) = take(&gate) {
        deliver(result);
      }
    });

    Self { completion, handle }
  }

  /// Cancel the load. Idempotent, and a no-op when the outcome was
  /// already delivered.
  pub fn cancel(&self) {
    // Claim the completion before aborting so a load that finishes during
    // the abort cannot deliver anymore.
    let _ = take(&self.completion);
    self.handle.abort();
  }
}

/// Take the completion out of its gate. A poisoned lock means some earlier
/// completion panicked; the slot itself is still usable.
fn take(gate: &Mutex<Option<Completion>>) -> Option<Completion> {
  gate.lock().unwrap_or_else(|p| p.into_inner()).take()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::image::ImageDataError;
  use async_trait::async_trait;
  use bytes::Bytes;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;
  use tokio::sync::{oneshot, Notify};

  struct StubLoader {
    result: Mutex<Option<ImageDataResult>>,
  }

  impl StubLoader {
    fn new(result: ImageDataResult) -> Arc<Self> {
      Arc::new(Self {
        result: Mutex::new(Some(result)),
      })
    }
  }

  #[async_trait]
  impl ImageDataLoader for StubLoader {
    async fn load_image_data(&self, _url: &Url) -> ImageDataResult {
      self
        .result
        .lock()
        .unwrap()
        .take()
        .unwrap_or_else(|| Ok(Bytes::from_static(b"pixels")))
    }
  }

  /// Loader that blocks until released, so tests control completion time.
  #[derive(Default)]
  struct GatedLoader {
    release: Notify,
  }

  #[async_trait]
  impl ImageDataLoader for GatedLoader {
    async fn load_image_data(&self, _url: &Url) -> ImageDataResult {
      self.release.notified().await;
      Ok(Bytes::from_static(b"pixels"))
    }
  }

  fn url() -> Url {
    Url::parse("https://example.com/image.png").unwrap()
  }

  #[tokio::test]
  async fn test_spawn_delivers_loaded_data() {
    let data = Bytes::from_static(b"pixels");
    let loader = StubLoader::new(Ok(data.clone()));
    let (tx, rx) = oneshot::channel();

    let _task = ImageLoadTask::spawn(loader, url(), move |result| {
      let _ = tx.send(result);
    });

    assert_eq!(rx.await.unwrap().unwrap(), data);
  }

  #[tokio::test]
  async fn test_spawn_delivers_load_failure() {
    let loader = StubLoader::new(Err(ImageDataError::NotFound));
    let (tx, rx) = oneshot::channel();

    let _task = ImageLoadTask::spawn(loader, url(), move |result| {
      let _ = tx.send(result);
    });

    let result = rx.await.unwrap();
    assert!(
      matches!(result, Err(ImageDataError::NotFound)),
      "got {result:?}"
    );
  }

  #[tokio::test]
  async fn test_cancel_before_completion_suppresses_delivery() {
    let deliveries = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&deliveries);
    let loader = Arc::new(GatedLoader::default());

    let task = ImageLoadTask::spawn(Arc::clone(&loader), url(), move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    task.cancel();
    loader.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(deliveries.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_cancel_after_completion_is_a_noop() {
    let deliveries = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&deliveries);
    let (tx, rx) = oneshot::channel();

    let task = ImageLoadTask::spawn(
      StubLoader::new(Ok(Bytes::from_static(b"pixels"))),
      url(),
      move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(());
      },
    );

    rx.await.unwrap();
    task.cancel();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_cancelling_twice_is_idempotent() {
    let deliveries = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&deliveries);
    let loader = Arc::new(GatedLoader::default());

    let task = ImageLoadTask::spawn(Arc::clone(&loader), url(), move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    task.cancel();
    task.cancel();
    loader.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(deliveries.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_cancel_while_fallback_is_in_flight_suppresses_delivery() {
    let deliveries = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&deliveries);
    let fallback = Arc::new(GatedLoader::default());
    let composite = Arc::new(crate::composite::ImageDataLoaderWithFallback::new(
      StubLoader::new(Err(ImageDataError::Connectivity)),
      Arc::clone(&fallback),
    ));

    let task = ImageLoadTask::spawn(composite, url(), move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });
    // Let the primary fail and the fallback start waiting.
    tokio::time::sleep(Duration::from_millis(10)).await;

    task.cancel();
    fallback.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(deliveries.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_cancel_during_primary_never_starts_the_fallback() {
    let primary = Arc::new(GatedLoader::default());
    let fallback_calls = Arc::new(AtomicU32::new(0));

    struct CountingLoader(Arc<AtomicU32>);

    #[async_trait]
    impl ImageDataLoader for CountingLoader {
      async fn load_image_data(&self, _url: &Url) -> ImageDataResult {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from_static(b"pixels"))
      }
    }

    let composite = Arc::new(crate::composite::ImageDataLoaderWithFallback::new(
      Arc::clone(&primary),
      CountingLoader(Arc::clone(&fallback_calls)),
    ));

    let task = ImageLoadTask::spawn(composite, url(), |_| {});
    tokio::time::sleep(Duration::from_millis(10)).await;

    task.cancel();
    primary.release.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_dropping_the_handle_detaches_the_load() {
    let loader = Arc::new(GatedLoader::default());
    let (tx, rx) = oneshot::channel();

    let task = ImageLoadTask::spawn(Arc::clone(&loader), url(), move |result| {
      let _ = tx.send(result);
    });
    drop(task);

    loader.release.notify_one();

    assert!(rx.await.unwrap().is_ok());
  }
}
