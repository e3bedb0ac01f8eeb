//! The failure taxonomy shared by every aidkit component.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid credential")]
  InvalidCredential,

  #[error("an account already exists for this identity")]
  AccountExists,

  #[error("sign-in cancelled by the user")]
  UserCancelled,

  #[error("credential is already bound to a different sign-in method")]
  CredentialConflict,

  #[error("backing service unavailable: {0}")]
  NetworkFailure(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// The credential for `identity_id` was created but its profile was not,
  /// and the compensating credential removal failed too.
  #[error("credential {identity_id} exists without a profile")]
  CredentialOnly { identity_id: Uuid },

  #[error("unexpected failure: {0}")]
  Unknown(String),
}

impl Error {
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
