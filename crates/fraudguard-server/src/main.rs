//! fraudguard-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `FRAUDGUARD_*` environment variables, opens the SQLite credential store,
//! and serves the broker over HTTP.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use fraudguard_core::store::CredentialStore as _;
use fraudguard_server::{AppState, ServerConfig};
use fraudguard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How often expired sessions are swept from memory.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(author, version, about = "FraudGuard scoring broker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FRAUDGUARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.validate().context("invalid configuration")?;

  // Expand `~` in configured paths.
  let store_path = expand_tilde(&server_cfg.store_path);
  let server_cfg = ServerConfig {
    engine_path: expand_tilde(&server_cfg.engine_path),
    ..server_cfg
  };

  if !server_cfg.engine_path.exists() {
    tracing::warn!(
      engine = %server_cfg.engine_path.display(),
      "scoring engine not found; /analyze will fail until it is installed"
    );
  }

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let users = store.count_users().await.context("failed to count users")?;
  tracing::info!(users, store = %store_path.display(), "credential store ready");

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state   = AppState::new(store, server_cfg);

  let sessions = state.sessions.clone();
  tokio::spawn(async move {
    let mut tick = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
      tick.tick().await;
      let purged = sessions.purge_expired().await;
      if purged > 0 {
        tracing::debug!(purged, "expired sessions removed");
      }
    }
  });

  let app = fraudguard_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
