//! Authenticated identities and the sessions built from them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an identity proved itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OriginProvider {
  Password,
  /// A secondary identity provider, named by its provider id
  /// (e.g. `"google.com"`).
  Federated { provider_id: String },
}

/// A credential record as held by a [`CredentialStore`](crate::store::CredentialStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  pub identity_id:  Uuid,
  pub email:        String,
  pub display_name: Option<String>,
  pub avatar_url:   Option<String>,
  pub origin:       OriginProvider,
}

/// The identity asserted by a federated provider after the user consented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedIdentity {
  pub provider_id:  String,
  /// Stable subject identifier issued by the provider.
  pub subject:      String,
  pub email:        String,
  pub display_name: Option<String>,
  pub avatar_url:   Option<String>,
}

/// The signed-in identity of the running client. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub identity_id:     Uuid,
  pub email:           String,
  pub display_name:    Option<String>,
  pub avatar_url:      Option<String>,
  pub origin_provider: OriginProvider,
}

impl From<Account> for Session {
  fn from(account: Account) -> Self {
    Self {
      identity_id:     account.identity_id,
      email:           account.email,
      display_name:    account.display_name,
      avatar_url:      account.avatar_url,
      origin_provider: account.origin,
    }
  }
}

/// Opaque handle to a primary-credential session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub Uuid);
