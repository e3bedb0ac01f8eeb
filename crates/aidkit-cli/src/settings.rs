//! Client configuration: an optional TOML file layered under `AIDKIT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use aidkit_sync::SyncConfig;
use anyhow::Context as _;
use serde::Deserialize;

/// Runtime client configuration, deserialised from `aidkit.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
  /// SQLite database shared by every client on this machine.
  pub store_path:    PathBuf,
  /// Run the first-run seed before any command.
  pub seed_on_start: bool,
  pub sync:          SyncConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      store_path:    PathBuf::from("aidkit.db"),
      seed_on_start: true,
      sync:          SyncConfig::default(),
    }
  }
}

impl AppConfig {
  /// Read `path` (if it exists) and the environment. Nested keys use a
  /// double underscore, e.g. `AIDKIT_SYNC__SNAPSHOT_BUFFER=32`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("AIDKIT")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = AppConfig::load(Path::new("/nonexistent/aidkit.toml")).unwrap();
    assert!(cfg.seed_on_start);
    assert_eq!(cfg.sync.snapshot_buffer, 16);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/aidkit.db")),
      PathBuf::from(home).join("aidkit.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/a.db")), PathBuf::from("/tmp/a.db"));
  }
}
