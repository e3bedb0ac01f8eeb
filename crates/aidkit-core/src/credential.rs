//! Input rules enforced when a new password credential is created.

use crate::{Error, Result};

/// Shortest password a backend accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Reject malformed emails and short passwords with
/// [`Error::InvalidCredential`].
pub fn check_new_credential(email: &str, password: &str) -> Result<()> {
  let (local, domain) = email.split_once('@').ok_or(Error::InvalidCredential)?;
  if local.is_empty()
    || domain.is_empty()
    || domain.contains('@')
    || email.chars().any(char::is_whitespace)
  {
    return Err(Error::InvalidCredential);
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::InvalidCredential);
  }
  Ok(())
}

/// Emails are compared case-insensitively; this is the stored form.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_plain_address() {
    assert!(check_new_credential("medic@example.org", "hunter22").is_ok());
  }

  #[test]
  fn rejects_missing_domain() {
    assert!(matches!(
      check_new_credential("medic@", "hunter22"),
      Err(Error::InvalidCredential)
    ));
    assert!(matches!(
      check_new_credential("medic", "hunter22"),
      Err(Error::InvalidCredential)
    ));
  }

  #[test]
  fn rejects_short_password() {
    assert!(matches!(
      check_new_credential("medic@example.org", "abc"),
      Err(Error::InvalidCredential)
    ));
  }

  #[test]
  fn normalizes_case_and_whitespace() {
    assert_eq!(normalize_email("  Medic@Example.ORG "), "medic@example.org");
  }
}
