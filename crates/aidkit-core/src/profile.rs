//! Per-identity profile records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One profile per identity; keyed by the session's identity id.
///
/// `privileged` is only ever set by tooling outside this workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub identity_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub phone:       String,
  pub privileged:  bool,
  pub created_at:  DateTime<Utc>,
}

/// Input for [`ProfileStore::create_profile`](crate::store::ProfileStore::create_profile).
/// New profiles are never privileged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
  pub identity_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub phone:       String,
}
