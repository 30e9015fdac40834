//! Server entry point for the Reverie mind simulation.
//!
//! Loads configuration, connects to `PostgreSQL`, runs migrations, seeds
//! the first world on a fresh database, and serves the control-surface
//! API until terminated.

use std::path::Path;
use std::sync::Arc;

use reverie_engine::config::ReverieConfig;
use reverie_engine::SilentOracle;
use reverie_oracle::LiveOracle;
use reverie_server::{ensure_world, start_server, AppState, OracleHandle};
use reverie_store::{PgStore, Store};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default configuration path, overridable via `REVERIE_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "reverie-config.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("reverie-server starting");

    let config_path =
        std::env::var("REVERIE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let config = ReverieConfig::from_file(Path::new(&config_path))?;
    info!(
        config = config_path,
        backend = config.oracle.backend,
        model = config.oracle.model,
        "configuration loaded"
    );

    let pg = PgStore::connect(&config.infrastructure.database_url).await?;
    pg.run_migrations().await?;
    let store = Store::Postgres(pg);
    info!("database connected, migrations applied");

    let world_id = ensure_world(&store, &config.seed).await?;

    let oracle = if config.oracle.api_key.is_empty() {
        warn!("No oracle API key configured, every mind will be silent");
        OracleHandle::Silent(SilentOracle)
    } else {
        OracleHandle::Live(LiveOracle::new(&config.oracle)?)
    };

    let state = Arc::new(AppState::new(
        store,
        oracle,
        config.mechanics.clone(),
        config.server.shared_secret.clone(),
    ));

    info!(world = %world_id, "serving");
    start_server(&config.server.host, config.server.port, state).await?;

    Ok(())
}
