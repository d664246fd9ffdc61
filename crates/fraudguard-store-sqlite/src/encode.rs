//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use fraudguard_core::user::User;
use uuid::Uuid;

use crate::{Error, Result};

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A `users` row exactly as read from SQLite.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "user_id, username, password_hash, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
