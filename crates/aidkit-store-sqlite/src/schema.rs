//! SQL schema for the aidkit SQLite store.
//!
//! Executed once at connection startup. Record columns in `profiles` and
//! `guides` keep the field names of the shared record contract and are
//! nullable; defaults are applied when rows are decoded.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Primary credentials. Password accounts carry a hash; federated accounts
-- carry the provider id and subject instead.
CREATE TABLE IF NOT EXISTS accounts (
    identity_id      TEXT PRIMARY KEY,
    email            TEXT NOT NULL UNIQUE,
    password_hash    TEXT,
    provider_id      TEXT,
    provider_subject TEXT,
    display_name     TEXT,
    avatar_url       TEXT,
    created_at       TEXT NOT NULL,
    UNIQUE (provider_id, provider_subject)
);

CREATE TABLE IF NOT EXISTS auth_sessions (
    token       TEXT PRIMARY KEY,
    identity_id TEXT NOT NULL REFERENCES accounts(identity_id) ON DELETE CASCADE,
    opened_at   TEXT NOT NULL
);

-- profiles/{identityId}. Not tied to accounts: administrative tooling may
-- write here directly.
CREATE TABLE IF NOT EXISTS profiles (
    identity_id TEXT PRIMARY KEY,
    name        TEXT,
    email       TEXT,
    phone       TEXT,
    privileged  INTEGER,
    createdAt   TEXT
);

-- guides/{id}
CREATE TABLE IF NOT EXISTS guides (
    id        TEXT PRIMARY KEY,
    title     TEXT,
    content   TEXT,
    imagePath TEXT,
    createdAt TEXT,
    updatedAt TEXT
);

CREATE INDEX IF NOT EXISTS guides_title_idx    ON guides(title);
CREATE INDEX IF NOT EXISTS sessions_identity_idx ON auth_sessions(identity_id);

PRAGMA user_version = 1;
";
