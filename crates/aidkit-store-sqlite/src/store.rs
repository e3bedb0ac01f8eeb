//! [`SqliteStore`] — the SQLite implementation of the aidkit store traits.

use std::path::Path;

use aidkit_core::{
  credential::{check_new_credential, normalize_email},
  guide::{Guide, GuideDraft},
  profile::{NewProfile, Profile},
  session::{Account, FederatedIdentity, OriginProvider, SessionToken},
  store::{CredentialStore, GuideStore, ProfileStore},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result, credentials,
  encode::{
    RawAccount, RawGuide, RawProfile, encode_dt, encode_uuid,
    is_constraint_violation,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An aidkit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Result of resolving a federated identity inside one database call.
enum Linked {
  Account(RawAccount),
  Conflict,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run raw SQL against the connection, standing in for tooling that
  /// writes to the store directly.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Look up an account row by normalised email.
  async fn account_by_email(&self, email: String) -> Result<Option<RawAccount>> {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM accounts WHERE email = ?1",
          RawAccount::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![email], RawAccount::from_row)
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  type Error = Error;

  async fn create_credential(&self, email: &str, password: &str) -> Result<Account> {
    check_new_credential(email, password)?;

    let account = Account {
      identity_id:  Uuid::new_v4(),
      email:        normalize_email(email),
      display_name: None,
      avatar_url:   None,
      origin:       OriginProvider::Password,
    };

    let phc      = credentials::hash_password_blocking(password.to_owned()).await?;
    let id_str   = encode_uuid(account.identity_id);
    let email_db = account.email.clone();
    let at_str   = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO accounts (identity_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_db, phc, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken(account.email));
    }
    Ok(account)
  }

  async fn verify_password(&self, email: &str, password: &str) -> Result<Account> {
    let raw = self
      .account_by_email(normalize_email(email))
      .await?
      .ok_or(Error::InvalidCredential)?;

    let verified = match raw.password_hash.clone() {
      Some(phc) => credentials::verify_password_blocking(password.to_owned(), phc).await?,
      None => false,
    };
    if !verified {
      return Err(Error::InvalidCredential);
    }
    raw.into_account()
  }

  async fn link_federated(&self, identity: &FederatedIdentity) -> Result<Account> {
    let provider_id  = identity.provider_id.clone();
    let subject      = identity.subject.clone();
    let email        = normalize_email(&identity.email);
    let display_name = identity.display_name.clone();
    let avatar_url   = identity.avatar_url.clone();
    let new_id_str   = encode_uuid(Uuid::new_v4());
    let at_str       = encode_dt(Utc::now());
    let conflict_email = email.clone();

    let linked = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let by_subject = format!(
          "SELECT {} FROM accounts WHERE provider_id = ?1 AND provider_subject = ?2",
          RawAccount::COLUMNS
        );

        let existing = tx
          .query_row(
            &by_subject,
            rusqlite::params![provider_id, subject],
            RawAccount::from_row,
          )
          .optional()?;

        if let Some(mut raw) = existing {
          // The provider owns the profile picture and display name.
          tx.execute(
            "UPDATE accounts SET display_name = ?1, avatar_url = ?2
             WHERE identity_id = ?3",
            rusqlite::params![display_name, avatar_url, raw.identity_id],
          )?;
          tx.commit()?;
          raw.display_name = display_name;
          raw.avatar_url = avatar_url;
          return Ok(Linked::Account(raw));
        }

        let email_taken = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if email_taken {
          return Ok(Linked::Conflict);
        }

        tx.execute(
          "INSERT INTO accounts
             (identity_id, email, provider_id, provider_subject,
              display_name, avatar_url, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            new_id_str,
            email,
            provider_id,
            subject,
            display_name,
            avatar_url,
            at_str,
          ],
        )?;
        tx.commit()?;

        Ok(Linked::Account(RawAccount {
          identity_id:   new_id_str,
          email,
          password_hash: None,
          provider_id:   Some(provider_id),
          display_name,
          avatar_url,
        }))
      })
      .await?;

    match linked {
      Linked::Account(raw) => raw.into_account(),
      Linked::Conflict => Err(Error::CredentialConflict(conflict_email)),
    }
  }

  async fn remove_credential(&self, identity_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(identity_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM accounts WHERE identity_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::AccountNotFound(identity_id));
    }
    Ok(())
  }

  async fn open_session(&self, identity_id: Uuid) -> Result<SessionToken> {
    let token    = SessionToken(Uuid::new_v4());
    let tok_str  = encode_uuid(token.0);
    let id_str   = encode_uuid(identity_id);
    let at_str   = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO auth_sessions (token, identity_id, opened_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![tok_str, id_str, at_str],
        ) {
          Ok(_) => Ok(true),
          // Foreign key: the account does not exist.
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::AccountNotFound(identity_id));
    }
    Ok(token)
  }

  async fn revoke_session(&self, token: SessionToken) -> Result<()> {
    let tok_str = encode_uuid(token.0);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM auth_sessions WHERE token = ?1",
          rusqlite::params![tok_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::SessionNotFound(token.0));
    }
    Ok(())
  }
}

// ─── ProfileStore impl ───────────────────────────────────────────────────────

impl ProfileStore for SqliteStore {
  type Error = Error;

  async fn get_profile(&self, identity_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(identity_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM profiles WHERE identity_id = ?1",
          RawProfile::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn create_profile(&self, input: NewProfile) -> Result<Profile> {
    let profile = Profile {
      identity_id: input.identity_id,
      name:        input.name,
      email:       input.email,
      phone:       input.phone,
      privileged:  false,
      created_at:  Utc::now(),
    };

    let id_str = encode_uuid(profile.identity_id);
    let name   = profile.name.clone();
    let email  = profile.email.clone();
    let phone  = profile.phone.clone();
    let at_str = encode_dt(profile.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO profiles (identity_id, name, email, phone, privileged, createdAt)
           VALUES (?1, ?2, ?3, ?4, 0, ?5)",
          rusqlite::params![id_str, name, email, phone, at_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_constraint_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::ProfileExists(profile.identity_id));
    }
    Ok(profile)
  }
}

// ─── GuideStore impl ─────────────────────────────────────────────────────────

impl GuideStore for SqliteStore {
  type Error = Error;

  async fn list_guides(&self) -> Result<Vec<Guide>> {
    let raws: Vec<RawGuide> = self
      .conn
      .call(|conn| {
        // BINARY collation compares bytes, which is the catalog order.
        let sql = format!(
          "SELECT {} FROM guides ORDER BY title COLLATE BINARY",
          RawGuide::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawGuide::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGuide::into_guide).collect()
  }

  async fn get_guide(&self, id: Uuid) -> Result<Option<Guide>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawGuide> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM guides WHERE id = ?1", RawGuide::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawGuide::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGuide::into_guide).transpose()
  }

  async fn insert_guide(&self, draft: GuideDraft) -> Result<Guide> {
    let guide = Guide {
      id:         Uuid::new_v4(),
      title:      draft.title,
      content:    draft.content,
      image_path: draft.image_path,
      created_at: Utc::now(),
      updated_at: None,
    };

    let id_str  = encode_uuid(guide.id);
    let title   = guide.title.clone();
    let content = guide.content.clone();
    let image   = guide.image_path.clone();
    let at_str  = encode_dt(guide.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO guides (id, title, content, imagePath, createdAt)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, title, content, image, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(guide)
  }

  async fn update_guide(&self, id: Uuid, draft: GuideDraft) -> Result<Guide> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawGuide> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE guides SET title = ?1, content = ?2, imagePath = ?3, updatedAt = ?4
           WHERE id = ?5",
          rusqlite::params![draft.title, draft.content, draft.image_path, at_str, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let sql = format!("SELECT {} FROM guides WHERE id = ?1", RawGuide::COLUMNS);
        Ok(Some(conn.query_row(
          &sql,
          rusqlite::params![id_str],
          RawGuide::from_row,
        )?))
      })
      .await?;

    raw
      .ok_or(Error::GuideNotFound(id))
      .and_then(RawGuide::into_guide)
  }

  async fn delete_guide(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM guides WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::GuideNotFound(id));
    }
    Ok(())
  }
}
