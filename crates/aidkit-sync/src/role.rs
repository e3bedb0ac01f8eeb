//! Role resolution: is the signed-in identity privileged?

use std::sync::Arc;

use aidkit_core::{session::Session, store::ProfileStore};

/// Derives the privileged flag from the identity's profile.
///
/// Fails closed: a missing session, a missing profile, a read error or an
/// unset flag all resolve to `false`.
pub struct RoleResolver<P> {
  profiles: Arc<P>,
}

impl<P: ProfileStore> RoleResolver<P> {
  pub fn new(profiles: Arc<P>) -> Self { Self { profiles } }

  pub async fn is_privileged(&self, session: Option<&Session>) -> bool {
    let Some(session) = session else {
      return false;
    };

    match self.profiles.get_profile(session.identity_id).await {
      Ok(Some(profile)) => profile.privileged,
      Ok(None) => {
        tracing::debug!(identity_id = %session.identity_id, "no profile; not privileged");
        false
      }
      Err(e) => {
        let e: aidkit_core::Error = e.into();
        tracing::warn!(
          identity_id = %session.identity_id,
          "profile lookup failed, treating as not privileged: {e}"
        );
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use aidkit_store_sqlite::SqliteStore;

  use super::*;
  use crate::testing::{FailingProfiles, StaticProfiles, session_for};

  #[tokio::test]
  async fn no_session_is_not_privileged() {
    let roles = RoleResolver::new(Arc::new(StaticProfiles::privileged()));
    assert!(!roles.is_privileged(None).await);
  }

  #[tokio::test]
  async fn missing_profile_is_not_privileged() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let roles = RoleResolver::new(store);
    let session = session_for(uuid::Uuid::new_v4());
    assert!(!roles.is_privileged(Some(&session)).await);
  }

  #[tokio::test]
  async fn lookup_error_is_not_privileged() {
    let roles = RoleResolver::new(Arc::new(FailingProfiles));
    let session = session_for(uuid::Uuid::new_v4());
    assert!(!roles.is_privileged(Some(&session)).await);
  }

  #[tokio::test]
  async fn fresh_profile_is_not_privileged() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let id = uuid::Uuid::new_v4();
    store
      .create_profile(aidkit_core::profile::NewProfile {
        identity_id: id,
        name:        "Ada".into(),
        email:       "ada@example.org".into(),
        phone:       String::new(),
      })
      .await
      .unwrap();

    let roles = RoleResolver::new(store);
    assert!(!roles.is_privileged(Some(&session_for(id))).await);
  }

  #[tokio::test]
  async fn flagged_profile_is_privileged() {
    let profiles = StaticProfiles::privileged();
    let session = session_for(profiles.identity_id());
    let roles = RoleResolver::new(Arc::new(profiles));
    assert!(roles.is_privileged(Some(&session)).await);
  }
}
