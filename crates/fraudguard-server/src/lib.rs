//! HTTP layer for FraudGuard.
//!
//! Exposes an axum [`Router`] that puts the scoring engine behind a
//! username/password login, backed by any [`CredentialStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod session;
pub mod views;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use fraudguard_core::store::CredentialStore;
use fraudguard_worker::ProcessScorer;
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use handlers::{analyze, health, login, logout, pages, register};
use session::SessionManager;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FRAUDGUARD_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "defaults::host")]
  pub host:                String,
  #[serde(default = "defaults::port")]
  pub port:                u16,
  #[serde(default = "defaults::store_path")]
  pub store_path:          PathBuf,
  /// The scoring executable. Spawned once per `/analyze` call.
  #[serde(default = "defaults::engine_path")]
  pub engine_path:         PathBuf,
  /// Extra arguments for the engine; empty unless a wrapper needs them.
  #[serde(default)]
  pub engine_args:         Vec<String>,
  #[serde(default = "defaults::engine_timeout_secs")]
  pub engine_timeout_secs: u64,
  #[serde(default = "defaults::session_ttl_secs")]
  pub session_ttl_secs:    i64,
  /// Mark the session cookie `Secure`. Enable behind TLS.
  #[serde(default)]
  pub cookie_secure:       bool,
  #[serde(default = "defaults::max_payload_bytes")]
  pub max_payload_bytes:   usize,
}

/// Longest accepted `session_ttl_secs`: one leap year.
pub const MAX_SESSION_TTL_SECS: i64 = 366 * 24 * 60 * 60;

/// A configuration value the server refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("session_ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {0}")]
  SessionTtl(i64),
}

mod defaults {
  use std::path::PathBuf;

  pub fn host() -> String { "127.0.0.1".to_string() }
  pub fn port() -> u16 { 5000 }
  pub fn store_path() -> PathBuf { PathBuf::from("fraudguard.db") }
  pub fn engine_path() -> PathBuf { PathBuf::from("./fraud_engine") }
  pub fn engine_timeout_secs() -> u64 { 30 }
  pub fn session_ttl_secs() -> i64 { 8 * 60 * 60 }
  pub fn max_payload_bytes() -> usize { 1024 * 1024 }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                defaults::host(),
      port:                defaults::port(),
      store_path:          defaults::store_path(),
      engine_path:         defaults::engine_path(),
      engine_args:         Vec::new(),
      engine_timeout_secs: defaults::engine_timeout_secs(),
      session_ttl_secs:    defaults::session_ttl_secs(),
      cookie_secure:       false,
      max_payload_bytes:   defaults::max_payload_bytes(),
    }
  }
}

impl ServerConfig {
  /// The scoring worker this configuration describes.
  pub fn scorer(&self) -> ProcessScorer {
    ProcessScorer::new(&self.engine_path)
      .with_args(self.engine_args.iter().cloned())
      .with_timeout(Duration::from_secs(self.engine_timeout_secs))
  }

  /// Reject values that would make the server misbehave at runtime.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let secs = self.session_ttl_secs;
    match chrono::TimeDelta::try_seconds(secs) {
      Some(_) if (1..=MAX_SESSION_TTL_SECS).contains(&secs) => Ok(()),
      _ => Err(ConfigError::SessionTtl(secs)),
    }
  }

  /// Session lifetime, clamped into `1..=MAX_SESSION_TTL_SECS`.
  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::seconds(self.session_ttl_secs.clamp(1, MAX_SESSION_TTL_SECS))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CredentialStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionManager>,
  pub scorer:   Arc<ProcessScorer>,
}

impl<S: CredentialStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Arc::new(SessionManager::new(config.session_ttl())),
      scorer:   Arc::new(config.scorer()),
      config:   Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the broker.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CredentialStore + Clone + 'static,
{
  let body_limit = state.config.max_payload_bytes;

  Router::new()
    .route("/",         get(pages::index))
    .route("/login",    get(pages::login).post(login::submit::<S>))
    .route("/register", get(pages::register).post(register::submit::<S>))
    .route("/logout",   get(logout::handler::<S>))
    .route("/analyze",  post(analyze::handler::<S>))
    .route("/health",   get(health::handler))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
