//! Scoring worker adapter for FraudGuard.
//!
//! [`ProcessScorer`] runs the external scoring executable once per call:
//! spawn, write the payload and close stdin, drain stdout and stderr, wait
//! for exit. Every path (success, bad output, I/O error, timeout) reaps the
//! child before returning.

mod process;

pub use process::{DEFAULT_TIMEOUT, ProcessScorer};
