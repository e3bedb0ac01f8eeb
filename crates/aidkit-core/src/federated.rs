//! The secondary, federated identity provider.

use std::future::Future;

use crate::{Error, session::FederatedIdentity};

/// An external identity provider (e.g. an OAuth consent flow).
///
/// Implementations report user dismissal as [`Error::UserCancelled`] and
/// transport failures as [`Error::NetworkFailure`].
pub trait FederatedProvider: Send + Sync {
  /// Run the provider's sign-in flow and return the asserted identity.
  fn authenticate(
    &self,
  ) -> impl Future<Output = Result<FederatedIdentity, Error>> + Send + '_;

  /// End the provider-side session.
  fn sign_out(&self) -> impl Future<Output = Result<(), Error>> + Send + '_;
}

/// Provider for clients built without federated sign-in. Every attempt is
/// reported as cancelled; signing out is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFederation;

impl FederatedProvider for NoFederation {
  async fn authenticate(&self) -> Result<FederatedIdentity, Error> {
    Err(Error::UserCancelled)
  }

  async fn sign_out(&self) -> Result<(), Error> { Ok(()) }
}
