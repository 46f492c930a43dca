//! portal-server binary.
//!
//! Reads `portal.toml` (or the path given with `--config`) plus `PORTAL_*`
//! environment variables, opens the SQLite store, seeds the configured
//! platform admins, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use portal_api::{AppState, ServerConfig};
use portal_core::clock::SystemClock;
use portal_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Membership portal event calendar server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "portal.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
    .add_source(
      config::Environment::with_prefix("PORTAL")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("admins"),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let portal_settings = server_cfg
    .portal_settings()
    .context("invalid portal settings")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  for admin in &server_cfg.admins {
    store
      .grant_admin(admin)
      .await
      .with_context(|| format!("failed to grant admin rights to {admin}"))?;
  }
  tracing::info!(
    admins = server_cfg.admins.len(),
    timezone = %portal_settings.timezone,
    grace_minutes = server_cfg.grace_window_minutes,
    "store ready"
  );

  let state = AppState {
    store:    Arc::new(store),
    clock:    Arc::new(SystemClock),
    settings: Arc::new(portal_settings),
  };

  let app = portal_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
