//! User: one registered principal.
//!
//! A user is created once by registration and never mutated or deleted by
//! the broker. Only the argon2 PHC string of the password is ever held.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted user record.
#[derive(Clone, Serialize)]
pub struct User {
  pub user_id:       Uuid,
  /// Unique across all users; immutable after creation.
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

impl fmt::Debug for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("User")
      .field("user_id", &self.user_id)
      .field("username", &self.username)
      .field("password_hash", &"<redacted>")
      .field("created_at", &self.created_at)
      .finish()
  }
}

/// Input for [`CredentialStore::create_user`](crate::store::CredentialStore::create_user).
///
/// The id and creation timestamp are assigned by the store.
#[derive(Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}

impl NewUser {
  pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
    Self {
      username:      username.into(),
      password_hash: password_hash.into(),
    }
  }
}
