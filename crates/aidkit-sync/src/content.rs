//! [`ContentStore`] — guide mutations plus a live, title-ordered view of the
//! catalog for every subscriber.
//!
//! After each successful mutation the full catalog is re-read from the
//! backing store and broadcast. Re-read and broadcast happen under one lock,
//! so every subscriber sees snapshots in the order the mutations landed.

use std::sync::Arc;

use aidkit_core::{
  Error, Result,
  guide::{Guide, GuideDraft},
  store::GuideStore,
};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::config::SyncConfig;

/// One full, ordered snapshot of the catalog.
pub type Catalog = Arc<[Guide]>;

pub struct ContentStore<G> {
  guides:    Arc<G>,
  snapshots: broadcast::Sender<Catalog>,
  /// Last catalog broadcast; its lock serializes publication.
  published: Mutex<Option<Catalog>>,
}

impl<G: GuideStore> ContentStore<G> {
  pub fn new(guides: Arc<G>, config: &SyncConfig) -> Self {
    let (snapshots, _) = broadcast::channel(config.snapshot_buffer.max(1));
    Self {
      guides,
      snapshots,
      published: Mutex::new(None),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Subscribe to the catalog. The subscription yields the current catalog
  /// first, then a fresh snapshot after every mutation.
  ///
  /// If the current catalog differs from the last one published (another
  /// client wrote to the store), existing subscribers receive it too.
  pub async fn subscribe_guides(&self) -> Result<GuideSubscription> {
    let mut published = self.published.lock().await;
    let initial = self.read_catalog().await?;
    if published.as_deref() != Some(&*initial) {
      self.broadcast(&mut published, initial.clone());
    }
    // Registered after the broadcast so the initial catalog arrives once.
    let rx = self.snapshots.subscribe();
    Ok(GuideSubscription {
      initial: Some(initial),
      rx,
    })
  }

  /// One-shot read of the whole catalog in title order.
  pub async fn list_guides(&self) -> Result<Catalog> { self.read_catalog().await }

  pub async fn get_guide(&self, id: Uuid) -> Result<Guide> {
    self
      .guides
      .get_guide(id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Error::NotFound(format!("guide {id}")))
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  pub async fn create_guide(&self, title: &str, content: &str, image_path: &str) -> Result<Guide> {
    let guide = self
      .guides
      .insert_guide(GuideDraft::new(title, content, image_path))
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(id = %guide.id, title = %guide.title, "guide created");
    self.publish().await;
    Ok(guide)
  }

  /// Overwrite title, content and image path of guide `id`.
  pub async fn update_guide(
    &self,
    id: Uuid,
    title: &str,
    content: &str,
    image_path: &str,
  ) -> Result<Guide> {
    let guide = self
      .guides
      .update_guide(id, GuideDraft::new(title, content, image_path))
      .await
      .map_err(Into::<Error>::into)?;

    tracing::info!(%id, title = %guide.title, "guide updated");
    self.publish().await;
    Ok(guide)
  }

  /// Delete guide `id`. There is no undo and no confirmation step here.
  pub async fn delete_guide(&self, id: Uuid) -> Result<()> {
    self.guides.delete_guide(id).await.map_err(Into::<Error>::into)?;

    tracing::info!(%id, "guide deleted");
    self.publish().await;
    Ok(())
  }

  /// Re-read the catalog and broadcast it if it differs from the last
  /// snapshot sent. Picks up writes made by other clients of the same store.
  pub async fn refresh(&self) -> Result<bool> {
    let mut published = self.published.lock().await;
    let catalog = self.read_catalog().await?;
    if published.as_deref() == Some(&*catalog) {
      return Ok(false);
    }
    self.broadcast(&mut published, catalog);
    Ok(true)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn read_catalog(&self) -> Result<Catalog> {
    let guides = self.guides.list_guides().await.map_err(Into::<Error>::into)?;
    Ok(guides.into())
  }

  /// Broadcast the post-mutation catalog. The mutation has already landed,
  /// so a failed re-read is only logged.
  async fn publish(&self) {
    let mut published = self.published.lock().await;
    match self.read_catalog().await {
      Ok(catalog) => self.broadcast(&mut published, catalog),
      Err(e) => tracing::warn!("catalog re-read after mutation failed: {e}"),
    }
  }

  fn broadcast(&self, published: &mut Option<Catalog>, catalog: Catalog) {
    tracing::debug!(guides = catalog.len(), "publishing catalog snapshot");
    *published = Some(catalog.clone());
    if self.snapshots.send(catalog).is_err() {
      tracing::trace!("no catalog subscribers");
    }
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// A live sequence of catalog snapshots. Dropping it unsubscribes; other
/// subscribers are unaffected.
pub struct GuideSubscription {
  initial: Option<Catalog>,
  rx:      broadcast::Receiver<Catalog>,
}

impl GuideSubscription {
  /// The next snapshot. A subscriber that fell too far behind skips to the
  /// oldest snapshot still buffered. Returns `None` once the
  /// [`ContentStore`] is gone.
  pub async fn next(&mut self) -> Option<Catalog> {
    if let Some(initial) = self.initial.take() {
      return Some(initial);
    }
    loop {
      match self.rx.recv().await {
        Ok(catalog) => return Some(catalog),
        Err(broadcast::error::RecvError::Lagged(skipped)) => {
          tracing::debug!(skipped, "catalog subscriber lagged");
        }
        Err(broadcast::error::RecvError::Closed) => return None,
      }
    }
  }

  /// Stop receiving snapshots.
  pub fn unsubscribe(self) {}
}
