//! dedupe-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! review store, and serves the review pages plus the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash` in config.toml:
//!
//! ```text
//! dedupe-server --hash-password
//! ```
//!
//! # Loading data
//!
//! Customers and candidates come from an upstream matching process. For a
//! local store they can be loaded from a JSON file shaped like
//! `{"customers": [...], "candidates": [...]}`:
//!
//! ```text
//! dedupe-server --load demos/fixture.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, bail};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use dedupe_core::{candidate::DuplicateCandidate, customer::Customer};
use dedupe_store_sqlite::SqliteStore;
use dedupe_web::{AppState, ServerConfig};
use rand_core::OsRng;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Customer duplicate review server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Load customers and candidates from a JSON file before serving.
  #[arg(long, value_name = "FILE")]
  load: Option<PathBuf>,
}

/// Upstream rows loaded with `--load`.
#[derive(Deserialize)]
struct Fixture {
  #[serde(default)]
  customers:  Vec<Customer>,
  #[serde(default)]
  candidates: Vec<DuplicateCandidate>,
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

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DEDUPE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.auth_username.is_some() != server_cfg.auth_password_hash.is_some() {
    bail!("auth_username and auth_password_hash must be set together");
  }
  if server_cfg.auth_username.is_none() {
    tracing::warn!("no credentials configured; serving without authentication");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = match SqliteStore::open(&store_path).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(
        path = %store_path.display(),
        error = %e,
        "could not open the review store; check store_path in config.toml \
         (or DEDUPE_STORE_PATH) and that the directory is writable"
      );
      return Err(e).with_context(|| format!("failed to open store at {store_path:?}"));
    }
  };

  if let Some(path) = &cli.load {
    let raw = tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("failed to read {path:?}"))?;
    let fixture: Fixture =
      serde_json::from_str(&raw).with_context(|| format!("failed to parse {path:?}"))?;
    let customers = store.load_customers(fixture.customers).await?;
    let candidates = store.load_candidates(fixture.candidates).await?;
    tracing::info!(customers, candidates, "loaded upstream rows");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = dedupe_web::router(AppState::new(Arc::new(store), server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password line from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
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
