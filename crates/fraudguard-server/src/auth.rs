//! Password hashing, registration, and credential verification.
//!
//! Argon2 work runs on the blocking pool so a login never stalls the async
//! runtime. Plaintext passwords never leave this module: they are not
//! logged, stored, or echoed back.

use std::sync::OnceLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use fraudguard_core::{
  Error as CoreError,
  store::CredentialStore,
  user::{NewUser, User},
};
use rand_core::OsRng;

use crate::error::Error;

/// Produce the argon2 PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Constant-work check of `password` against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Hash verified against when the username is unknown, so a miss costs the
/// same as a wrong password.
fn dummy_hash() -> Option<&'static str> {
  static DUMMY: OnceLock<Option<String>> = OnceLock::new();
  DUMMY
    .get_or_init(|| hash_password("fraudguard-timing-equaliser").ok())
    .as_deref()
}

async fn blocking<T, F>(f: F) -> Result<T, Error>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| Error::Internal(format!("blocking task failed: {e}")))
}

/// Create a user from a plaintext password.
///
/// The username is trimmed; empty usernames or passwords are rejected with
/// [`Error::BadRequest`] before anything is hashed.
pub async fn register<S: CredentialStore>(
  store:    &S,
  username: &str,
  password: &str,
) -> Result<User, Error> {
  let username = username.trim();
  if username.is_empty() {
    return Err(Error::BadRequest("Username is required".to_string()));
  }
  if password.is_empty() {
    return Err(Error::BadRequest("Password is required".to_string()));
  }

  let password = password.to_owned();
  let hash = blocking(move || hash_password(&password)).await??;

  store
    .create_user(NewUser::new(username, hash))
    .await
    .map_err(Error::from_store)
}

/// Resolve `username` and verify `password` against its stored hash.
///
/// Any mismatch, including an unknown username, yields
/// [`AuthenticationFailed`](CoreError::AuthenticationFailed) without saying
/// which credential was wrong.
pub async fn authenticate<S: CredentialStore>(
  store:    &S,
  username: &str,
  password: &str,
) -> Result<User, Error> {
  let user = store
    .find_user(username.trim())
    .await
    .map_err(Error::from_store)?;

  let password = password.to_owned();
  match user {
    Some(user) => {
      let phc = user.password_hash.clone();
      if blocking(move || verify_password(&password, &phc)).await? {
        Ok(user)
      } else {
        Err(CoreError::AuthenticationFailed.into())
      }
    }
    None => {
      blocking(move || {
        if let Some(phc) = dummy_hash() {
          verify_password(&password, phc);
        }
      })
      .await?;
      Err(CoreError::AuthenticationFailed.into())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fraudguard_store_sqlite::SqliteStore;

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  #[test]
  fn hash_is_salted_phc_and_verifies() {
    let a = hash_password("hunter2").unwrap();
    let b = hash_password("hunter2").unwrap();
    assert!(a.starts_with("$argon2id$"), "{a}");
    assert_ne!(a, b, "salts must differ");
    assert!(verify_password("hunter2", &a));
    assert!(!verify_password("hunter3", &a));
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
    assert!(!verify_password("", ""));
  }

  #[tokio::test]
  async fn register_then_authenticate() {
    let s    = store().await;
    let user = register(&s, "alice", "password123").await.unwrap();
    assert_ne!(user.password_hash, "password123");

    let found = authenticate(&s, "alice", "password123").await.unwrap();
    assert_eq!(found.user_id, user.user_id);
  }

  #[tokio::test]
  async fn wrong_password_and_unknown_user_fail_identically() {
    let s = store().await;
    register(&s, "alice", "password123").await.unwrap();

    let wrong   = authenticate(&s, "alice", "nope").await.unwrap_err();
    let unknown = authenticate(&s, "mallory", "password123").await.unwrap_err();
    assert!(matches!(wrong, Error::Core(CoreError::AuthenticationFailed)));
    assert!(matches!(unknown, Error::Core(CoreError::AuthenticationFailed)));
    assert_eq!(wrong.to_string(), unknown.to_string());
  }

  #[tokio::test]
  async fn duplicate_registration_is_reported() {
    let s = store().await;
    register(&s, "alice", "first").await.unwrap();
    let err = register(&s, "alice", "second").await.unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::DuplicateUsername(ref n)) if n == "alice"));

    // The original password still works; nothing was overwritten.
    assert!(authenticate(&s, "alice", "first").await.is_ok());
    assert!(authenticate(&s, "alice", "second").await.is_err());
  }

  #[tokio::test]
  async fn username_is_trimmed() {
    let s = store().await;
    let user = register(&s, "  bob ", "pw").await.unwrap();
    assert_eq!(user.username, "bob");
    assert!(authenticate(&s, "bob", "pw").await.is_ok());
  }

  #[tokio::test]
  async fn empty_fields_are_rejected() {
    let s = store().await;
    assert!(matches!(register(&s, "   ", "pw").await, Err(Error::BadRequest(_))));
    assert!(matches!(register(&s, "carol", "").await, Err(Error::BadRequest(_))));
  }
}
