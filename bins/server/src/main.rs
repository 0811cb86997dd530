//! HomeAccount API Server
//!
//! Main entry point for the HomeAccount backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homeaccount_api::{AppState, create_router};
use homeaccount_core::data::{DataService, FixtureDataService};
use homeaccount_core::health::HealthService;
use homeaccount_core::maintenance::{LedgerBackend, MemoryLedger, UnitEngine, UnitKind};
use homeaccount_db::{PgDataService, PgLedger, connect};
use homeaccount_shared::AppConfig;

/// Storage picked from configuration.
struct Backends {
    data: Arc<dyn DataService>,
    migration_ledger: Arc<dyn LedgerBackend>,
    seed_ledger: Arc<dyn LedgerBackend>,
}

async fn backends(config: &AppConfig) -> anyhow::Result<Backends> {
    if config.mock_database {
        warn!("USE_MOCK_DATABASE is set; serving fixture data with in-memory ledgers");
        return Ok(Backends {
            data: Arc::new(FixtureDataService::new()),
            migration_ledger: Arc::new(MemoryLedger::new()),
            seed_ledger: Arc::new(MemoryLedger::new()),
        });
    }

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Ok(Backends {
        data: Arc::new(PgDataService::new(db.clone())),
        migration_ledger: Arc::new(PgLedger::new(db.clone(), UnitKind::Migration)),
        seed_ledger: Arc::new(PgLedger::new(db, UnitKind::Seed)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homeaccount=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    let maintenance = &config.maintenance;

    let Backends {
        data,
        migration_ledger,
        seed_ledger,
    } = backends(&config).await?;

    // Engines
    let seeds = Arc::new(UnitEngine::seeds(&maintenance.seeds_dir, seed_ledger));
    let mut migrations = UnitEngine::migrations(&maintenance.migrations_dir, migration_ledger)
        .with_sidecar_seeds(maintenance.apply_seeds);

    if maintenance.auto_seed {
        let hook_seeds = seeds.clone();
        migrations.register_hook("seeds", move || {
            let seeds = hook_seeds.clone();
            async move { seeds.apply().await.map(|_| ()) }
        });
    }
    let migrations = Arc::new(migrations);

    if maintenance.auto_migrate {
        let report = migrations
            .apply()
            .await
            .context("Startup migrations failed")?;
        info!(applied = report.applied.len(), "Startup migrations complete");
    } else {
        info!("AUTO_MIGRATE is disabled; skipping startup migrations");
    }

    // Create application state
    let state = AppState {
        health: Arc::new(HealthService::new(data.clone())),
        data,
        migrations,
        seeds,
        version: config.version().to_string(),
        admin_token: maintenance.admin_token.as_deref().map(Arc::<str>::from),
    };
    if state.admin_token.is_none() {
        warn!("ADMIN_TOKEN is not set; maintenance routes are unprotected");
    }

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
