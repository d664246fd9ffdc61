//! Sessions and the explicit per-request session context.
//!
//! Every guarded operation receives a [`SessionContext`] as an argument
//! rather than looking one up from ambient state, which keeps the broker
//! testable without a running web framework.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, user::User};

/// A server-side record binding one client context to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
  pub session_id: Uuid,
  /// Back-reference to the authenticated [`User`].
  pub user_id:    Uuid,
  pub username:   String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  /// Start a session for `user` that stays valid for `ttl`.
  ///
  /// A `ttl` reaching past the representable range saturates at
  /// `DateTime::<Utc>::MAX_UTC`.
  pub fn start(user: &User, ttl: Duration) -> Self {
    let now = Utc::now();
    Self {
      session_id: Uuid::new_v4(),
      user_id:    user.user_id,
      username:   user.username.clone(),
      created_at: now,
      expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}

/// The authentication state of the client context behind one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionContext {
  /// No session, or the presented one was unknown or expired.
  #[default]
  Anonymous,
  Authenticated(Session),
}

impl SessionContext {
  /// Guard for protected operations.
  ///
  /// Returns [`Error::Unauthorized`] when anonymous so the guarded operation
  /// never runs.
  pub fn require_authenticated(&self) -> Result<&Session> {
    match self {
      SessionContext::Authenticated(session) => Ok(session),
      SessionContext::Anonymous => Err(Error::Unauthorized),
    }
  }
}
