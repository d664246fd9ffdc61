//! [`SqliteStore`]: the SQLite implementation of [`CredentialStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use fraudguard_core::{
  store::CredentialStore,
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{RawUser, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A FraudGuard credential store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
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
}

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  type Error = Error;

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = user.username.clone();
    let hash     = user.password_hash.clone();
    let at_str   = encode_dt(user.created_at);

    // The UNIQUE constraint plus DO NOTHING makes check-and-insert a single
    // atomic statement; zero affected rows means the name was taken.
    let inserted = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "INSERT INTO users (user_id, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(username) DO NOTHING",
          rusqlite::params![id_str, name, hash, at_str],
        )?;
        Ok(rows == 1)
      })
      .await?;

    if !inserted {
      tracing::debug!(username = %user.username, "username already registered");
      return Err(fraudguard_core::Error::DuplicateUsername(user.username).into());
    }

    Ok(user)
  }

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM users WHERE username = ?1", RawUser::COLUMNS),
              rusqlite::params![name],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn count_users(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
      .await?;
    Ok(count.max(0) as u64)
  }
}
