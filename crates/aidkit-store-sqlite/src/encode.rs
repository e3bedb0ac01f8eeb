//! Encoding and decoding helpers between aidkit domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Record rows are read into `Raw*` structs holding the
//! column values as-is; the `into_*` conversions are the one place where
//! missing fields receive their defaults:
//!
//! - text fields (`title`, `content`, `imagePath`, `name`, `email`, `phone`)
//!   default to the empty string;
//! - `privileged` is true only when stored as `1`;
//! - a missing `createdAt` decodes as the Unix epoch, a missing `updatedAt`
//!   as absent.

use aidkit_core::{
  guide::Guide,
  profile::Profile,
  session::{Account, OriginProvider},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_dt_or_epoch(s: Option<&str>) -> Result<DateTime<Utc>> {
  s.map(decode_dt)
    .transpose()
    .map(|dt| dt.unwrap_or(DateTime::UNIX_EPOCH))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw column values read from a `guides` row.
pub struct RawGuide {
  pub id:         String,
  pub title:      Option<String>,
  pub content:    Option<String>,
  pub image_path: Option<String>,
  pub created_at: Option<String>,
  pub updated_at: Option<String>,
}

impl RawGuide {
  pub const COLUMNS: &'static str =
    "id, title, content, imagePath, createdAt, updatedAt";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      content:    row.get(2)?,
      image_path: row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_guide(self) -> Result<Guide> {
    Ok(Guide {
      id:         decode_uuid(&self.id)?,
      title:      self.title.unwrap_or_default(),
      content:    self.content.unwrap_or_default(),
      image_path: self.image_path.unwrap_or_default(),
      created_at: decode_dt_or_epoch(self.created_at.as_deref())?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw column values read from a `profiles` row.
pub struct RawProfile {
  pub identity_id: String,
  pub name:        Option<String>,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub privileged:  Option<i64>,
  pub created_at:  Option<String>,
}

impl RawProfile {
  pub const COLUMNS: &'static str =
    "identity_id, name, email, phone, privileged, createdAt";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity_id: row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      phone:       row.get(3)?,
      // Anything but an integer counts as unset.
      privileged:  row.get_ref(4)?.as_i64_or_null().ok().flatten(),
      created_at:  row.get(5)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      identity_id: decode_uuid(&self.identity_id)?,
      name:        self.name.unwrap_or_default(),
      email:       self.email.unwrap_or_default(),
      phone:       self.phone.unwrap_or_default(),
      privileged:  self.privileged == Some(1),
      created_at:  decode_dt_or_epoch(self.created_at.as_deref())?,
    })
  }
}

/// Raw column values read from an `accounts` row.
pub struct RawAccount {
  pub identity_id:   String,
  pub email:         String,
  pub password_hash: Option<String>,
  pub provider_id:   Option<String>,
  pub display_name:  Option<String>,
  pub avatar_url:    Option<String>,
}

impl RawAccount {
  pub const COLUMNS: &'static str =
    "identity_id, email, password_hash, provider_id, display_name, avatar_url";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity_id:   row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      provider_id:   row.get(3)?,
      display_name:  row.get(4)?,
      avatar_url:    row.get(5)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    let origin = match self.provider_id {
      Some(provider_id) => OriginProvider::Federated { provider_id },
      None => OriginProvider::Password,
    };
    Ok(Account {
      identity_id: decode_uuid(&self.identity_id)?,
      email: self.email,
      display_name: self.display_name,
      avatar_url: self.avatar_url,
      origin,
    })
  }
}

// ─── Constraint detection ────────────────────────────────────────────────────

/// True if `err` is a UNIQUE / PRIMARY KEY / FOREIGN KEY violation.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
