//! Test doubles shared by the service tests.

use std::{
  collections::VecDeque,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use aidkit_core::{
  Error,
  federated::FederatedProvider,
  guide::{Guide, GuideDraft},
  profile::{NewProfile, Profile},
  session::{Account, FederatedIdentity, OriginProvider, Session, SessionToken},
  store::{CredentialStore, GuideStore, ProfileStore},
};
use aidkit_store_sqlite::SqliteStore;
use uuid::Uuid;

pub fn session_for(identity_id: Uuid) -> Session {
  Session {
    identity_id,
    email: "someone@example.org".into(),
    display_name: None,
    avatar_url: None,
    origin_provider: OriginProvider::Password,
  }
}

pub fn google_identity(subject: &str, email: &str) -> FederatedIdentity {
  FederatedIdentity {
    provider_id:  "google.com".into(),
    subject:      subject.into(),
    email:        email.into(),
    display_name: Some("Grace Hopper".into()),
    avatar_url:   None,
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Holds a single, fixed profile.
pub struct StaticProfiles(Profile);

impl StaticProfiles {
  pub fn privileged() -> Self {
    Self(Profile {
      identity_id: Uuid::new_v4(),
      name:        "Admin".into(),
      email:       "admin@example.org".into(),
      phone:       String::new(),
      privileged:  true,
      created_at:  chrono::Utc::now(),
    })
  }

  pub fn identity_id(&self) -> Uuid { self.0.identity_id }
}

impl ProfileStore for StaticProfiles {
  type Error = Error;

  async fn get_profile(&self, identity_id: Uuid) -> Result<Option<Profile>, Error> {
    Ok((identity_id == self.0.identity_id).then(|| self.0.clone()))
  }

  async fn create_profile(&self, _: NewProfile) -> Result<Profile, Error> {
    Err(Error::AccountExists)
  }
}

/// Every read and write fails as if the backing store were unreachable.
pub struct FailingProfiles;

impl ProfileStore for FailingProfiles {
  type Error = Error;

  async fn get_profile(&self, _: Uuid) -> Result<Option<Profile>, Error> {
    Err(Error::NetworkFailure("profile store offline".into()))
  }

  async fn create_profile(&self, _: NewProfile) -> Result<Profile, Error> {
    Err(Error::NetworkFailure("profile store offline".into()))
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Delegates to SQLite but refuses to remove credentials.
pub struct StickyCredentials(pub Arc<SqliteStore>);

impl CredentialStore for StickyCredentials {
  type Error = Error;

  async fn create_credential(&self, email: &str, password: &str) -> Result<Account, Error> {
    self.0.create_credential(email, password).await.map_err(Into::into)
  }

  async fn verify_password(&self, email: &str, password: &str) -> Result<Account, Error> {
    self.0.verify_password(email, password).await.map_err(Into::into)
  }

  async fn link_federated(&self, identity: &FederatedIdentity) -> Result<Account, Error> {
    self.0.link_federated(identity).await.map_err(Into::into)
  }

  async fn remove_credential(&self, _: Uuid) -> Result<(), Error> {
    Err(Error::NetworkFailure("credential service offline".into()))
  }

  async fn open_session(&self, identity_id: Uuid) -> Result<SessionToken, Error> {
    self.0.open_session(identity_id).await.map_err(Into::into)
  }

  async fn revoke_session(&self, token: SessionToken) -> Result<(), Error> {
    self.0.revoke_session(token).await.map_err(Into::into)
  }
}

// ─── Guides ──────────────────────────────────────────────────────────────────

/// Delegates to SQLite, failing the Nth insert or every catalog read on
/// demand.
pub struct FlakyGuides {
  pub inner:     Arc<SqliteStore>,
  inserts:       AtomicUsize,
  fail_insert:   Option<usize>,
  reads_offline: AtomicBool,
}

impl FlakyGuides {
  pub fn new(inner: Arc<SqliteStore>) -> Self {
    Self {
      inner,
      inserts: AtomicUsize::new(0),
      fail_insert: None,
      reads_offline: AtomicBool::new(false),
    }
  }

  /// Fail the insert with zero-based index `n`, and only that one.
  pub fn failing_insert(mut self, n: usize) -> Self {
    self.fail_insert = Some(n);
    self
  }

  pub fn set_reads_offline(&self, offline: bool) {
    self.reads_offline.store(offline, Ordering::SeqCst);
  }
}

impl GuideStore for FlakyGuides {
  type Error = Error;

  async fn list_guides(&self) -> Result<Vec<Guide>, Error> {
    if self.reads_offline.load(Ordering::SeqCst) {
      return Err(Error::NetworkFailure("guide store offline".into()));
    }
    self.inner.list_guides().await.map_err(Into::into)
  }

  async fn get_guide(&self, id: Uuid) -> Result<Option<Guide>, Error> {
    self.inner.get_guide(id).await.map_err(Into::into)
  }

  async fn insert_guide(&self, draft: GuideDraft) -> Result<Guide, Error> {
    let n = self.inserts.fetch_add(1, Ordering::SeqCst);
    if self.fail_insert == Some(n) {
      return Err(Error::NetworkFailure("guide store offline".into()));
    }
    self.inner.insert_guide(draft).await.map_err(Into::into)
  }

  async fn update_guide(&self, id: Uuid, draft: GuideDraft) -> Result<Guide, Error> {
    self.inner.update_guide(id, draft).await.map_err(Into::into)
  }

  async fn delete_guide(&self, id: Uuid) -> Result<(), Error> {
    self.inner.delete_guide(id).await.map_err(Into::into)
  }
}

// ─── Federated provider ──────────────────────────────────────────────────────

/// Replays scripted sign-in outcomes and counts sign-outs.
#[derive(Default)]
pub struct ScriptedProvider {
  outcomes:  Mutex<VecDeque<Result<FederatedIdentity, Error>>>,
  sign_outs: AtomicUsize,
  fail_sign_out: bool,
}

impl ScriptedProvider {
  pub fn new(outcomes: impl IntoIterator<Item = Result<FederatedIdentity, Error>>) -> Self {
    Self {
      outcomes: Mutex::new(outcomes.into_iter().collect()),
      ..Self::default()
    }
  }

  pub fn failing_sign_out(mut self) -> Self {
    self.fail_sign_out = true;
    self
  }

  pub fn sign_outs(&self) -> usize { self.sign_outs.load(Ordering::SeqCst) }
}

impl FederatedProvider for ScriptedProvider {
  async fn authenticate(&self) -> Result<FederatedIdentity, Error> {
    self
      .outcomes
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Err(Error::UserCancelled))
  }

  async fn sign_out(&self) -> Result<(), Error> {
    self.sign_outs.fetch_add(1, Ordering::SeqCst);
    if self.fail_sign_out {
      return Err(Error::NetworkFailure("provider offline".into()));
    }
    Ok(())
  }
}
