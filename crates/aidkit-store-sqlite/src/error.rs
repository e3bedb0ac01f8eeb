//! Error type for `aidkit-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] aidkit_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("password hashing task failed: {0}")]
  HashTask(#[from] tokio::task::JoinError),

  #[error("invalid email or password")]
  InvalidCredential,

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("email {0} is bound to a different sign-in method")]
  CredentialConflict(String),

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("profile already exists: {0}")]
  ProfileExists(Uuid),

  #[error("guide not found: {0}")]
  GuideNotFound(Uuid),
}

impl From<Error> for aidkit_core::Error {
  fn from(err: Error) -> Self {
    use aidkit_core::Error as Core;
    match err {
      Error::Core(e) => e,
      Error::Database(e) => Core::NetworkFailure(e.to_string()),
      Error::InvalidCredential => Core::InvalidCredential,
      Error::EmailTaken(_) | Error::ProfileExists(_) => Core::AccountExists,
      Error::CredentialConflict(_) => Core::CredentialConflict,
      e @ (Error::AccountNotFound(_)
      | Error::SessionNotFound(_)
      | Error::GuideNotFound(_)) => Core::NotFound(e.to_string()),
      e @ (Error::Uuid(_)
      | Error::DateParse(_)
      | Error::PasswordHash(_)
      | Error::HashTask(_)) => {
        Core::Unknown(e.to_string())
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
