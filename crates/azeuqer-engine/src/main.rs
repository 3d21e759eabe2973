//! Bootstrap binary for AZEUQER.
//!
//! Brings the progression engine up against its production backends and
//! reports its state. Request transport lives outside this workspace; this
//! binary is what deploys run to prove the stores are reachable and the
//! schema is current.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `azeuqer-config.yaml`
//! 3. Connect to `PostgreSQL` and apply migrations
//! 4. Connect to `Dragonfly`
//! 5. Build the engine over both stores and the system clock
//! 6. Log the cohort count and hall of fame size
//! 7. Close the pool

mod error;

use std::path::Path;

use azeuqer_core::{EngineConfig, ProgressionEngine, SystemClock};
use azeuqer_db::{DragonflyCohortGate, DragonflyPool, PgPlayerStore, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::BootstrapError;

/// Configuration file read from the working directory.
const CONFIG_PATH: &str = "azeuqer-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, either store, or the first engine
/// query fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("azeuqer-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        cohort_limit = config.cohort.limit,
        free_scans_per_day = config.daily.free_scans_per_day,
        cycle_length = config.encounter.cycle_length,
        utc_offset_minutes = config.daily.utc_offset_minutes,
        "Configuration loaded"
    );

    // 3. PostgreSQL.
    let postgres = PostgresPool::connect(&config.infrastructure)
        .await
        .map_err(BootstrapError::from)?;
    postgres.run_migrations().await.map_err(BootstrapError::from)?;

    // 4. Dragonfly.
    let dragonfly = DragonflyPool::connect(&config.infrastructure.dragonfly_url)
        .await
        .map_err(BootstrapError::from)?;

    // 5. Engine.
    let engine = ProgressionEngine::new(
        config,
        PgPlayerStore::new(postgres.pool().clone()),
        DragonflyCohortGate::new(dragonfly),
        SystemClock,
    )
    .map_err(BootstrapError::from)?;

    // 6. Report.
    report(&engine).await?;

    // 7. Shut down.
    postgres.close().await;
    info!("azeuqer-engine finished");
    Ok(())
}

/// Load configuration from `azeuqer-config.yaml`, falling back to defaults.
///
/// Environment overrides apply either way.
fn load_config() -> Result<EngineConfig, BootstrapError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(EngineConfig::from_file(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        let mut config = EngineConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

/// Log the founder cohort fill and the current hall of fame leader.
async fn report(
    engine: &ProgressionEngine<PgPlayerStore, DragonflyCohortGate, SystemClock>,
) -> Result<(), BootstrapError> {
    let admitted = engine.cohort_admitted().await?;
    let limit = engine.config().cohort.limit;
    info!(
        admitted,
        limit,
        full = admitted >= u64::from(limit),
        "Founder cohort status"
    );

    let hall = engine.hall_of_fame(azeuqer_core::engine::HALL_OF_FAME_MAX).await?;
    if let Some(leader) = hall.first() {
        info!(
            players = hall.len(),
            leader = %leader.player_id,
            kills_lifetime = leader.kills_lifetime,
            "Hall of fame loaded"
        );
    } else {
        info!("Hall of fame is empty");
    }
    Ok(())
}
