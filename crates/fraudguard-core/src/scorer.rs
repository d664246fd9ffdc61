//! The `Scorer` trait: the seam between the broker and the scoring engine.
//!
//! The production implementation lives in `fraudguard-worker` and spawns the
//! external executable. Tests substitute in-process fakes.

use std::future::Future;

use crate::outcome::ScoreOutcome;

/// Something that can score one payload.
///
/// Implementations must translate every failure into a [`ScoreOutcome`]
/// variant; scoring never panics or returns a bare error.
pub trait Scorer: Send + Sync {
  fn score(&self, payload: &str) -> impl Future<Output = ScoreOutcome> + Send;
}

