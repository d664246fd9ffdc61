//! The `CredentialStore` trait.
//!
//! Implemented by storage backends (e.g. `fraudguard-store-sqlite`). The
//! server depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::user::{NewUser, User};

/// Errors produced by a [`CredentialStore`].
///
/// Backends wrap domain-level conditions (such as a duplicate username) in a
/// core [`Error`](crate::Error) so callers can react to them without
/// knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn core_error(&self) -> Option<&crate::Error>;

  fn is_duplicate_username(&self) -> bool {
    matches!(self.core_error(), Some(crate::Error::DuplicateUsername(_)))
  }
}

/// Username → password-hash records.
///
/// Usernames are unique. The check-and-insert in
/// [`create_user`](CredentialStore::create_user) must be atomic so two
/// concurrent registrations of one name cannot both succeed.
pub trait CredentialStore: Send + Sync {
  type Error: StoreError;

  /// Persist a new user. Fails with
  /// [`Error::DuplicateUsername`](crate::Error::DuplicateUsername) if the
  /// name is taken, in which case nothing is written.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look a user up by exact username. Returns `None` if not found.
  fn find_user(
    &self,
    username: &str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

  /// Number of registered users.
  fn count_users(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
