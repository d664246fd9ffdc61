//! SQL schema for the FraudGuard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per registered user. Rows are never updated or deleted.
CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    created_at    TEXT NOT NULL      -- ISO 8601 UTC; server-assigned
);

PRAGMA user_version = 1;
";
