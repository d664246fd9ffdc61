//! The request broker: the orchestration point for `analyze`.
//!
//! Order of operations is fixed: session guard, payload validation, one
//! scoring call, response shaping. Rejected requests never reach the
//! [`Scorer`].

use serde_json::{Value, json, value::RawValue};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{outcome::ScoreOutcome, scorer::Scorer, session::SessionContext};

/// Message returned when the payload is missing or empty.
pub const NO_DATA_MESSAGE: &str = "No data provided";

/// Why an `analyze` call did not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  BadRequest(String),

  /// The worker exited non-zero; carries its diagnostic text.
  #[error("Engine Error: {0}")]
  Engine(String),

  /// The worker exited zero without emitting JSON; carries its raw output.
  #[error("Invalid output from engine")]
  MalformedOutput(String),

  #[error("{0}")]
  Transport(String),
}

impl AnalysisError {
  /// HTTP status code for this failure.
  pub fn status(&self) -> u16 {
    match self {
      AnalysisError::Unauthorized => 401,
      AnalysisError::BadRequest(_) => 400,
      AnalysisError::Engine(_)
      | AnalysisError::MalformedOutput(_)
      | AnalysisError::Transport(_) => 500,
    }
  }

  /// JSON response body for this failure.
  pub fn body(&self) -> Value {
    match self {
      AnalysisError::MalformedOutput(raw) => json!({
        "error":      self.to_string(),
        "raw_output": raw,
      }),
      _ => json!({ "error": self.to_string() }),
    }
  }
}

fn into_verdict(outcome: ScoreOutcome) -> Result<Box<RawValue>, AnalysisError> {
  match outcome {
    ScoreOutcome::Success(value) => Ok(value),
    ScoreOutcome::EngineFailure { diagnostic } => Err(AnalysisError::Engine(diagnostic)),
    ScoreOutcome::MalformedOutput { raw_output } => {
      Err(AnalysisError::MalformedOutput(raw_output))
    }
    ScoreOutcome::TransportError { message } => Err(AnalysisError::Transport(message)),
  }
}

/// Score `payload` on behalf of the caller identified by `session`.
///
/// On success returns the worker's JSON verbatim; the broker does not
/// interpret the scoring schema.
pub async fn analyze<W: Scorer>(
  session: &SessionContext,
  payload: Option<&str>,
  scorer:  &W,
) -> Result<Box<RawValue>, AnalysisError> {
  let principal = session
    .require_authenticated()
    .map_err(|_| AnalysisError::Unauthorized)?;

  let payload = match payload {
    Some(p) if !p.is_empty() => p,
    _ => return Err(AnalysisError::BadRequest(NO_DATA_MESSAGE.to_string())),
  };

  debug!(user = %principal.username, bytes = payload.len(), "scoring payload");
  let result = into_verdict(scorer.score(payload).await);
  if let Err(e) = &result {
    warn!(user = %principal.username, error = %e, "scoring failed");
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use chrono::{Duration, Utc};
  use uuid::Uuid;

  use crate::{session::Session, user::User};

  /// Records every payload it is asked to score and replies with a fixed
  /// outcome template.
  struct FakeScorer {
    calls:    AtomicUsize,
    payloads: Mutex<Vec<String>>,
    reply:    fn(&str) -> ScoreOutcome,
  }

  impl FakeScorer {
    fn new(reply: fn(&str) -> ScoreOutcome) -> Self {
      Self { calls: AtomicUsize::new(0), payloads: Mutex::new(Vec::new()), reply }
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
  }

  impl Scorer for FakeScorer {
    async fn score(&self, payload: &str) -> ScoreOutcome {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.payloads.lock().unwrap().push(payload.to_string());
      (self.reply)(payload)
    }
  }

  fn echo_json(payload: &str) -> ScoreOutcome {
    ScoreOutcome::from_exit(true, payload.to_string(), String::new())
  }

  fn authenticated() -> SessionContext {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      "analyst".to_string(),
      password_hash: "hash".to_string(),
      created_at:    Utc::now(),
    };
    SessionContext::Authenticated(Session::start(&user, Duration::hours(1)))
  }

  #[tokio::test]
  async fn anonymous_never_reaches_scorer() {
    let scorer = FakeScorer::new(echo_json);
    for payload in [None, Some(""), Some("{}"), Some("tx,100.0,coffee")] {
      let err = analyze(&SessionContext::Anonymous, payload, &scorer)
        .await
        .unwrap_err();
      assert_eq!(err, AnalysisError::Unauthorized);
      assert_eq!(err.status(), 401);
    }
    assert_eq!(scorer.calls(), 0);
  }

  #[tokio::test]
  async fn empty_or_missing_payload_is_bad_request() {
    let scorer = FakeScorer::new(echo_json);
    let ctx    = authenticated();
    for payload in [None, Some("")] {
      let err = analyze(&ctx, payload, &scorer).await.unwrap_err();
      assert_eq!(err.status(), 400);
      assert_eq!(err.body(), json!({ "error": "No data provided" }));
    }
    assert_eq!(scorer.calls(), 0);
  }

  #[tokio::test]
  async fn success_passes_payload_and_output_verbatim() {
    let scorer  = FakeScorer::new(echo_json);
    let payload = r#"{"b": 2, "a": 1}"#;
    let value   = analyze(&authenticated(), Some(payload), &scorer).await.unwrap();
    assert_eq!(value.get(), payload);
    assert_eq!(scorer.calls(), 1);
    assert_eq!(scorer.payloads.lock().unwrap().as_slice(), [payload.to_string()]);
  }

  #[tokio::test]
  async fn engine_failure_shape() {
    let scorer = FakeScorer::new(|_| ScoreOutcome::EngineFailure {
      diagnostic: "bad input".to_string(),
    });
    let err = analyze(&authenticated(), Some("x"), &scorer).await.unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.body(), json!({ "error": "Engine Error: bad input" }));
  }

  #[tokio::test]
  async fn malformed_output_shape() {
    let scorer = FakeScorer::new(|_| ScoreOutcome::MalformedOutput {
      raw_output: "not json".to_string(),
    });
    let err = analyze(&authenticated(), Some("x"), &scorer).await.unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(
      err.body(),
      json!({ "error": "Invalid output from engine", "raw_output": "not json" })
    );
  }

  #[tokio::test]
  async fn transport_error_shape() {
    let scorer = FakeScorer::new(|_| ScoreOutcome::transport("No such file or directory"));
    let err = analyze(&authenticated(), Some("x"), &scorer).await.unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.body(), json!({ "error": "No such file or directory" }));
  }
}
