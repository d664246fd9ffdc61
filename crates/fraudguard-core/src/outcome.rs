//! The tagged result of one scoring worker invocation.

use serde_json::value::RawValue;

/// Outcome of running the scoring worker once.
///
/// Exactly one variant is produced per call; there is no partial success.
#[derive(Debug)]
pub enum ScoreOutcome {
  /// Exit 0 and stdout held a single JSON value, kept as its original text.
  Success(Box<RawValue>),
  /// Non-zero exit. Carries the worker's diagnostic stream.
  EngineFailure { diagnostic: String },
  /// Exit 0 but stdout was not JSON. Carries stdout verbatim.
  MalformedOutput { raw_output: String },
  /// The worker could not be spawned, fed, read, or finished in time.
  TransportError { message: String },
}

impl ScoreOutcome {
  /// Classify a worker run that terminated on its own.
  pub fn from_exit(success: bool, stdout: String, stderr: String) -> Self {
    if !success {
      return ScoreOutcome::EngineFailure { diagnostic: stderr };
    }
    match serde_json::from_str::<Box<RawValue>>(&stdout) {
      Ok(value) => ScoreOutcome::Success(value),
      Err(_)    => ScoreOutcome::MalformedOutput { raw_output: stdout },
    }
  }

  pub fn transport(message: impl Into<String>) -> Self {
    ScoreOutcome::TransportError { message: message.into() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_exit_with_json_is_success_and_verbatim() {
    let out = r#"{"z": 1, "a": [true, null], "score": 0.75}"#;
    match ScoreOutcome::from_exit(true, format!("{out}\n"), String::new()) {
      ScoreOutcome::Success(raw) => assert_eq!(raw.get(), out),
      other => panic!("expected success, got {other:?}"),
    }
  }

  #[test]
  fn zero_exit_with_text_is_malformed() {
    match ScoreOutcome::from_exit(true, "not json".to_string(), String::new()) {
      ScoreOutcome::MalformedOutput { raw_output } => assert_eq!(raw_output, "not json"),
      other => panic!("expected malformed output, got {other:?}"),
    }
  }

  #[test]
  fn two_json_documents_are_malformed() {
    let outcome = ScoreOutcome::from_exit(true, "{} {}".to_string(), String::new());
    assert!(matches!(outcome, ScoreOutcome::MalformedOutput { .. }));
  }

  #[test]
  fn empty_stdout_is_malformed() {
    let outcome = ScoreOutcome::from_exit(true, String::new(), String::new());
    assert!(matches!(outcome, ScoreOutcome::MalformedOutput { .. }));
  }

  #[test]
  fn nonzero_exit_wins_over_valid_json() {
    let outcome =
      ScoreOutcome::from_exit(false, "{}".to_string(), "bad input\n".to_string());
    match outcome {
      ScoreOutcome::EngineFailure { diagnostic } => assert_eq!(diagnostic, "bad input\n"),
      other => panic!("expected engine failure, got {other:?}"),
    }
  }

  #[test]
  fn diagnostic_whitespace_is_kept() {
    let outcome =
      ScoreOutcome::from_exit(false, String::new(), "  bad input\n\n".to_string());
    match outcome {
      ScoreOutcome::EngineFailure { diagnostic } => assert_eq!(diagnostic, "  bad input\n\n"),
      other => panic!("expected engine failure, got {other:?}"),
    }
  }
}
