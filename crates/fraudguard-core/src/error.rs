//! Error types for `fraudguard-core`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A guarded operation was attempted without a valid session.
  #[error("unauthorized")]
  Unauthorized,

  /// Login failed. Deliberately does not say which credential was wrong.
  #[error("invalid username or password")]
  AuthenticationFailed,

  #[error("username already taken: {0:?}")]
  DuplicateUsername(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
