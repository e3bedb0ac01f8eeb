//! Identity and content synchronization for the aidkit client.
//!
//! Four services, each generic over the backend traits in
//! `aidkit_core::store`:
//!
//! - [`SessionManager`] signs identities in and out and publishes the
//!   active session;
//! - [`RoleResolver`] derives the privileged flag, failing closed;
//! - [`ContentStore`] mutates guides and streams ordered catalog snapshots;
//! - [`SeedLoader`] fills an empty catalog with the default guides.
//!
//! [`Services`] builds all four once, at process start, from a single
//! backend.

pub mod config;
pub mod content;
pub mod role;
pub mod seed;
pub mod session;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use aidkit_core::{
  federated::FederatedProvider,
  store::{CredentialStore, GuideStore, ProfileStore},
};

pub use config::SyncConfig;
pub use content::{Catalog, ContentStore, GuideSubscription};
pub use role::RoleResolver;
pub use seed::{DEFAULT_GUIDES, SeedGuide, SeedLoader};
pub use session::{SessionChanges, SessionManager};

/// Every service, wired to one backend and one federated provider.
pub struct Services<S, F> {
  pub sessions: Arc<SessionManager<S, S, F>>,
  pub roles:    Arc<RoleResolver<S>>,
  pub content:  Arc<ContentStore<S>>,
  pub seeder:   Arc<SeedLoader<S>>,
}

impl<S, F> Services<S, F>
where
  S: CredentialStore + ProfileStore + GuideStore,
  F: FederatedProvider,
{
  pub fn new(store: Arc<S>, federated: Arc<F>, config: &SyncConfig) -> Self {
    let content = Arc::new(ContentStore::new(store.clone(), config));
    Self {
      sessions: Arc::new(SessionManager::new(
        store.clone(),
        store.clone(),
        federated,
        config,
      )),
      roles: Arc::new(RoleResolver::new(store)),
      seeder: Arc::new(SeedLoader::new(content.clone())),
      content,
    }
  }
}

#[cfg(test)]
mod tests {
  use aidkit_core::federated::NoFederation;
  use aidkit_store_sqlite::SqliteStore;

  use super::*;

  #[tokio::test]
  async fn services_share_one_backend() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let services = Services::new(store, Arc::new(NoFederation), &SyncConfig::default());

    services.seeder.ensure_default_content().await.unwrap();
    let session = services
      .sessions
      .create_account("medic@example.org", "hunter22", "Ada", "")
      .await
      .unwrap();

    assert!(!services.roles.is_privileged(Some(&session)).await);
    assert_eq!(services.content.list_guides().await.unwrap().len(), 9);
  }

  #[tokio::test]
  async fn no_federation_reports_cancel() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let services = Services::new(store, Arc::new(NoFederation), &SyncConfig::default());

    let err = services.sessions.sign_in_with_federated_provider().await.unwrap_err();
    assert!(matches!(err, aidkit_core::Error::UserCancelled));
  }
}
