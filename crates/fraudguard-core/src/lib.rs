//! Core types and trait definitions for the FraudGuard request broker.
//!
//! This crate is deliberately free of HTTP, database, and process
//! dependencies. The storage backend, the scoring worker, and the web server
//! all depend on it; it depends on nothing of theirs.

pub mod broker;
pub mod error;
pub mod outcome;
pub mod scorer;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
