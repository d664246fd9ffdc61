//! Error type for the FraudGuard HTTP layer.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fraudguard_core::{broker::AnalysisError, store::StoreError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Unauthorized, AuthenticationFailed, DuplicateUsername.
  #[error(transparent)]
  Core(#[from] fraudguard_core::Error),

  #[error(transparent)]
  Analysis(#[from] AnalysisError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("password hashing error: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  /// Lift a backend error, surfacing domain conditions as [`Error::Core`].
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.core_error() {
      Some(core) => Error::Core(core.clone()),
      None => Error::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    use fraudguard_core::Error as Core;

    let (status, body) = match &self {
      Error::Core(Core::Unauthorized) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
      }
      Error::Core(Core::AuthenticationFailed) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() }))
      }
      Error::Core(Core::DuplicateUsername(_)) => {
        (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
      }
      Error::Analysis(e) => (
        StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        e.body(),
      ),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      Error::Hash(_) | Error::Store(_) | Error::Internal(_) => {
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": self.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
