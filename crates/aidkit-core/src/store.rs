//! Backend traits for credentials, profiles and guides.
//!
//! The traits are implemented by storage backends (e.g. `aidkit-store-sqlite`).
//! The services in `aidkit-sync` depend on this abstraction, not on any
//! concrete backend. Backend errors convert into the shared [`Error`]
//! taxonomy so services can report typed failures.
//!
//! [`Error`]: crate::Error

use std::future::Future;

use uuid::Uuid;

use crate::{
  guide::{Guide, GuideDraft},
  profile::{NewProfile, Profile},
  session::{Account, FederatedIdentity, SessionToken},
};

// ─── Credentials ─────────────────────────────────────────────────────────────

/// The primary credential authority.
pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Create a password credential. Fails with `AccountExists` if the email
  /// is taken and `InvalidCredential` if the input is malformed.
  fn create_credential<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + 'a;

  /// Check a password. Unknown emails and wrong passwords both fail with
  /// `InvalidCredential`.
  fn verify_password<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + 'a;

  /// Resolve a provider-asserted identity to an account, creating one on
  /// first use. Fails with `CredentialConflict` if the email already belongs
  /// to an account with a different sign-in method.
  fn link_federated<'a>(
    &'a self,
    identity: &'a FederatedIdentity,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + 'a;

  /// Remove an account and every session it holds.
  fn remove_credential(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Record a new primary session for `identity_id`.
  fn open_session(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<SessionToken, Self::Error>> + Send + '_;

  /// End a primary session. Fails with `NotFound` if it was already ended.
  fn revoke_session(
    &self,
    token: SessionToken,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// Keyed record store holding one [`Profile`] per identity.
pub trait ProfileStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Retrieve the profile for `identity_id`. Returns `None` if absent.
  fn get_profile(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Persist a new, non-privileged profile. `createdAt` is set by the store.
  /// Fails with `AccountExists` if the identity already has one.
  fn create_profile(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;
}

// ─── Guides ──────────────────────────────────────────────────────────────────

/// The guide catalog.
pub trait GuideStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// The full catalog in title order (see [`crate::guide::by_title`]).
  fn list_guides(
    &self,
  ) -> impl Future<Output = Result<Vec<Guide>, Self::Error>> + Send + '_;

  /// Retrieve a guide by id. Returns `None` if not found.
  fn get_guide(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Guide>, Self::Error>> + Send + '_;

  /// Persist a new guide. The id and `created_at` are set by the store.
  fn insert_guide(
    &self,
    draft: GuideDraft,
  ) -> impl Future<Output = Result<Guide, Self::Error>> + Send + '_;

  /// Overwrite all editable fields and stamp `updated_at`.
  /// Fails with `NotFound` if `id` does not exist.
  fn update_guide(
    &self,
    id: Uuid,
    draft: GuideDraft,
  ) -> impl Future<Output = Result<Guide, Self::Error>> + Send + '_;

  /// Delete a guide. Fails with `NotFound` if `id` does not exist.
  fn delete_guide(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
