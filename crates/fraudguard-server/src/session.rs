//! Cookie-backed server-side sessions.
//!
//! The client holds an opaque random token; the server keeps the
//! [`Session`] record keyed by the token's SHA-256 digest, so the map never
//! holds a usable credential. Reads take a shared lock, and issuing or
//! invalidating takes the write lock.

use std::{collections::HashMap, convert::Infallible};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use fraudguard_core::{
  session::{Session, SessionContext},
  store::CredentialStore,
  user::User,
};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "fraudguard_session";

const TOKEN_BYTES: usize = 32;

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Issues, validates, and invalidates sessions.
pub struct SessionManager {
  ttl:     Duration,
  records: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, records: RwLock::new(HashMap::new()) }
  }

  /// Start a session for a verified `user`. Returns the bearer token for the
  /// client and the stored record.
  pub async fn issue(&self, user: &User) -> (String, Session) {
    let token   = generate_token();
    let session = Session::start(user, self.ttl);
    self
      .records
      .write()
      .await
      .insert(token_key(&token), session.clone());
    (token, session)
  }

  /// Map a presented token to the caller's [`SessionContext`].
  ///
  /// Unknown tokens are anonymous. Expired records are anonymous too, and
  /// are dropped on the spot.
  pub async fn resolve(&self, token: &str) -> SessionContext {
    let key = token_key(token);
    let now = Utc::now();

    {
      let records = self.records.read().await;
      match records.get(&key) {
        None => return SessionContext::Anonymous,
        Some(session) if !session.is_expired_at(now) => {
          return SessionContext::Authenticated(session.clone());
        }
        Some(_) => {}
      }
    }

    self.records.write().await.remove(&key);
    SessionContext::Anonymous
  }

  /// Discard the session behind `token`. Returns whether one existed.
  pub async fn invalidate(&self, token: &str) -> bool {
    self.records.write().await.remove(&token_key(token)).is_some()
  }

  /// Drop every expired record. Returns how many were removed.
  pub async fn purge_expired(&self) -> usize {
    let now = Utc::now();
    let mut records = self.records.write().await;
    let before = records.len();
    records.retain(|_, s| !s.is_expired_at(now));
    before - records.len()
  }

  /// Number of live (possibly expired, not yet purged) records.
  pub async fn len(&self) -> usize { self.records.read().await.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

fn token_key(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// The cookie that hands `token` to the client.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
  Cookie::build((SESSION_COOKIE, token))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(secure)
    .build()
}

/// A cookie that, added to a jar via `remove`, clears the session cookie.
pub fn removal_cookie() -> Cookie<'static> { Cookie::build(SESSION_COOKIE).path("/").build() }

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The explicit session context of the current request.
///
/// Never rejects: a request without a valid session simply carries
/// [`SessionContext::Anonymous`]. Handlers decide what anonymity means.
pub struct CurrentSession {
  pub context: SessionContext,
  /// The raw token the client presented, valid or not.
  pub token:   Option<String>,
}

impl<S> FromRequestParts<AppState<S>> for CurrentSession
where
  S: CredentialStore + Clone + 'static,
{
  type Rejection = Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar   = CookieJar::from_headers(&parts.headers);
    let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());

    let context = match &token {
      Some(t) => state.sessions.resolve(t).await,
      None => SessionContext::Anonymous,
    };

    Ok(CurrentSession { context, token })
  }
}
