//! Tunables for the synchronization services.

use std::time::Duration;

use serde::Deserialize;

/// Runtime configuration for `aidkit-sync`, usually the `[sync]` table of
/// the client's config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Catalog snapshots retained per subscriber before a slow subscriber
  /// skips ahead.
  pub snapshot_buffer:     usize,
  /// Session transitions retained per subscriber before a slow subscriber
  /// skips ahead.
  pub session_buffer:      usize,
  /// How often polling consumers should call `ContentStore::refresh`.
  pub refresh_interval_ms: u64,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      snapshot_buffer:     16,
      session_buffer:      16,
      refresh_interval_ms: 2_000,
    }
  }
}

impl SyncConfig {
  pub fn refresh_interval(&self) -> Duration {
    Duration::from_millis(self.refresh_interval_ms.max(1))
  }
}
