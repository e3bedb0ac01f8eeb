//! Argon2id password hashing for password accounts.
//!
//! Hashing is deliberately slow, so the store calls the async wrappers,
//! which run it on tokio's blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Hash `password` into a PHC string (`$argon2id$v=19$…`).
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed stored hash
/// counts as a mismatch.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// [`hash_password`] off the runtime threads.
pub async fn hash_password_blocking(password: String) -> Result<String> {
  tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] off the runtime threads.
pub async fn verify_password_blocking(password: String, phc: String) -> Result<bool> {
  Ok(tokio::task::spawn_blocking(move || verify_password(&password, &phc)).await?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn correct_password_verifies() {
    let phc = hash_password("tourniquet").unwrap();
    assert!(phc.starts_with("$argon2id$"));
    assert!(verify_password("tourniquet", &phc));
  }

  #[test]
  fn wrong_password_fails() {
    let phc = hash_password("tourniquet").unwrap();
    assert!(!verify_password("bandage", &phc));
  }

  #[test]
  fn malformed_hash_fails() {
    assert!(!verify_password("tourniquet", "not-a-phc-string"));
  }

  #[tokio::test]
  async fn blocking_wrappers_roundtrip() {
    let phc = hash_password_blocking("tourniquet".into()).await.unwrap();
    assert!(verify_password_blocking("tourniquet".into(), phc.clone()).await.unwrap());
    assert!(!verify_password_blocking("bandage".into(), phc).await.unwrap());
  }

  #[tokio::test]
  async fn hashing_leaves_the_runtime_free() {
    // On a single-threaded runtime an inline hash would finish on the first
    // poll, before the timer could ever fire.
    let pending = tokio::time::timeout(
      std::time::Duration::from_millis(1),
      hash_password_blocking("tourniquet".into()),
    )
    .await;
    assert!(pending.is_err());
  }
}
