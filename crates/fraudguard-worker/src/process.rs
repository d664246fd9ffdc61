//! [`ProcessScorer`]: the process-per-call implementation of [`Scorer`].

use std::{
  io,
  path::PathBuf,
  process::{ExitStatus, Stdio},
  time::Duration,
};

use fraudguard_core::{outcome::ScoreOutcome, scorer::Scorer};
use tokio::{
  io::{AsyncReadExt as _, AsyncWriteExt as _},
  process::{Child, Command},
};
use tracing::{debug, warn};

/// How long a worker may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a fresh instance of the scoring executable for every payload.
#[derive(Debug, Clone)]
pub struct ProcessScorer {
  program: PathBuf,
  args:    Vec<String>,
  timeout: Duration,
}

/// Everything a worker produced before it exited.
struct Finished {
  status: ExitStatus,
  stdout: Vec<u8>,
  stderr: Vec<u8>,
}

impl ProcessScorer {
  /// A scorer that invokes `program` with no arguments.
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args:    Vec::new(),
      timeout: DEFAULT_TIMEOUT,
    }
  }

  pub fn with_args<I, A>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = A>,
    A: Into<String>,
  {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  async fn run(&self, payload: &str) -> ScoreOutcome {
    debug!(
      program = %self.program.display(),
      bytes = payload.len(),
      "spawning scoring worker"
    );

    // kill_on_drop covers the case where the request future itself is
    // dropped mid-call; the explicit paths below reap on their own.
    let spawned = Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn();

    let mut child = match spawned {
      Ok(child) => child,
      Err(e) => {
        warn!(program = %self.program.display(), error = %e, "failed to spawn scoring worker");
        return ScoreOutcome::transport(format!("failed to start scoring engine: {e}"));
      }
    };

    let result =
      tokio::time::timeout(self.timeout, communicate(&mut child, payload.as_bytes())).await;

    match result {
      Ok(Ok(finished)) => {
        debug!(status = %finished.status, "scoring worker exited");
        ScoreOutcome::from_exit(
          finished.status.success(),
          String::from_utf8_lossy(&finished.stdout).into_owned(),
          String::from_utf8_lossy(&finished.stderr).into_owned(),
        )
      }
      Ok(Err(e)) => {
        warn!(error = %e, "I/O error while talking to scoring worker");
        reap(&mut child).await;
        ScoreOutcome::transport(format!("scoring engine I/O error: {e}"))
      }
      Err(_) => {
        warn!(timeout = ?self.timeout, "scoring worker timed out; killing it");
        reap(&mut child).await;
        ScoreOutcome::transport(format!(
          "scoring engine timed out after {}s",
          self.timeout.as_secs_f64()
        ))
      }
    }
  }
}

impl Scorer for ProcessScorer {
  async fn score(&self, payload: &str) -> ScoreOutcome { self.run(payload).await }
}

/// Feed `input` to the child's stdin and drain both output streams
/// concurrently, then wait for exit.
///
/// Draining while writing keeps a worker that fills its stdout pipe before
/// reading all input from deadlocking against us.
async fn communicate(child: &mut Child, input: &[u8]) -> io::Result<Finished> {
  let mut stdin  = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
  let mut stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
  let mut stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

  let feed = async move {
    // A worker may legitimately exit before consuming its input; its exit
    // status decides the outcome, not our write.
    if let Err(e) = stdin.write_all(input).await
      && e.kind() != io::ErrorKind::BrokenPipe
    {
      return Err(e);
    }
    // Dropping the handle closes the pipe: end-of-input for the worker.
    drop(stdin);
    Ok::<(), io::Error>(())
  };

  let drain_stdout = async {
    let mut buf = Vec::new();
    stdout.read_to_end(&mut buf).await.map(|_| buf)
  };

  let drain_stderr = async {
    let mut buf = Vec::new();
    stderr.read_to_end(&mut buf).await.map(|_| buf)
  };

  let (fed, stdout, stderr) = tokio::join!(feed, drain_stdout, drain_stderr);
  fed?;
  let stdout = stdout?;
  let stderr = stderr?;

  let status = child.wait().await?;
  Ok(Finished { status, stdout, stderr })
}

/// Kill the child if it is still running and wait for it, so no zombie or
/// open descriptor outlives the call.
async fn reap(child: &mut Child) {
  if let Err(e) = child.kill().await {
    debug!(error = %e, "scoring worker already exited");
  }
}

fn missing_pipe(name: &str) -> io::Error {
  io::Error::other(format!("scoring worker {name} was not captured"))
}

#[cfg(all(test, unix))]
mod tests {
  use std::{path::Path, time::Instant};

  use super::*;

  fn sh(script: &str) -> ProcessScorer {
    ProcessScorer::new("/bin/sh").with_args(["-c", script])
  }

  #[tokio::test]
  async fn valid_json_is_returned_verbatim() {
    let out     = r#"{"transactions": [{"id": "T1", "is_suspicious": false}], "score": 0.1}"#;
    let scorer  = sh(&format!("cat >/dev/null; printf '%s\\n' '{out}'"));
    match scorer.score("T1,10.00,coffee").await {
      ScoreOutcome::Success(raw) => assert_eq!(raw.get(), out),
      other => panic!("expected success, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn payload_reaches_worker_unchanged() {
    let payload = "id,amount,description\nT1,9999.99,\"wire transfer\"\n";
    match sh("cat").score(payload).await {
      ScoreOutcome::MalformedOutput { raw_output } => assert_eq!(raw_output, payload),
      other => panic!("expected echoed text, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn nonzero_exit_reports_stderr() {
    let scorer = sh("cat >/dev/null; printf 'bad input' >&2; exit 1");
    match scorer.score("anything").await {
      ScoreOutcome::EngineFailure { diagnostic } => assert_eq!(diagnostic, "bad input"),
      other => panic!("expected engine failure, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn stderr_is_relayed_untrimmed() {
    let scorer = sh("cat >/dev/null; printf '  bad input\\n\\n' >&2; exit 1");
    match scorer.score("anything").await {
      ScoreOutcome::EngineFailure { diagnostic } => assert_eq!(diagnostic, "  bad input\n\n"),
      other => panic!("expected engine failure, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn non_json_output_is_malformed() {
    let scorer = sh("cat >/dev/null; printf 'not json'");
    match scorer.score("anything").await {
      ScoreOutcome::MalformedOutput { raw_output } => assert_eq!(raw_output, "not json"),
      other => panic!("expected malformed output, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn missing_executable_is_transport_error() {
    let scorer = ProcessScorer::new("/nonexistent/fraud_engine");
    match scorer.score("anything").await {
      ScoreOutcome::TransportError { message } => {
        assert!(message.starts_with("failed to start scoring engine"), "{message}")
      }
      other => panic!("expected transport error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn hung_worker_is_killed_on_timeout() {
    let scorer  = sh("sleep 30").with_timeout(Duration::from_millis(200));
    let started = Instant::now();
    match scorer.score("anything").await {
      ScoreOutcome::TransportError { message } => assert!(message.contains("timed out"), "{message}"),
      other => panic!("expected timeout, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
  }

  #[tokio::test]
  async fn large_payload_round_trips_without_deadlock() {
    let payload = format!("\"{}\"", "a".repeat(1 << 20));
    match sh("cat").score(&payload).await {
      ScoreOutcome::Success(raw) => assert_eq!(raw.get().len(), payload.len()),
      other => panic!("expected success, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn worker_ignoring_input_still_succeeds() {
    let payload = "x".repeat(1 << 20);
    match sh("printf '{}'").score(&payload).await {
      ScoreOutcome::Success(raw) => assert_eq!(raw.get(), "{}"),
      other => panic!("expected success, got {other:?}"),
    }
  }

  #[test]
  fn builder_defaults_to_no_arguments() {
    let scorer = ProcessScorer::new("./fraud_engine");
    assert!(scorer.args.is_empty());
    assert_eq!(scorer.timeout, DEFAULT_TIMEOUT);
    assert_eq!(scorer.program, Path::new("./fraud_engine"));
  }
}
