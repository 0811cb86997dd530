//! Database migration runner for HomeAccount.
//!
//! Usage:
//!   migrator run      - Run all pending migrations
//!   migrator migrate  - Same as `run`
//!   migrator status   - Show migration status

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homeaccount_core::maintenance::{SyncState, UnitEngine, UnitKind};
use homeaccount_db::{PgLedger, connect};
use homeaccount_shared::AppConfig;

const USAGE: &str = "Usage:
  migrator run     - Run pending migrations
  migrator status  - Show migration status";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homeaccount=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1);
    if !matches!(command.as_deref(), Some("run" | "migrate" | "status")) {
        eprintln!("{USAGE}");
        bail!("unknown command: {}", command.unwrap_or_default());
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let engine = UnitEngine::migrations(
        &config.maintenance.migrations_dir,
        Arc::new(PgLedger::new(db, UnitKind::Migration)),
    )
    .with_sidecar_seeds(config.maintenance.apply_seeds);

    if command.as_deref() == Some("status") {
        show_status(&engine).await
    } else {
        let report = engine.apply().await.context("Migration failed")?;
        if report.is_noop() {
            println!("No pending migrations found");
        } else {
            for name in &report.applied {
                println!("Completed: {name}");
            }
            println!("All migrations completed successfully!");
        }
        Ok(())
    }
}

async fn show_status(engine: &UnitEngine) -> anyhow::Result<()> {
    let status = engine.status().await;
    if status.state == SyncState::Unknown {
        bail!("Status check failed; see log for details");
    }

    println!("Migration Status:");
    println!("================");
    for unit in &status.applied {
        println!("Applied  {}", unit.name);
    }
    for name in &status.pending {
        println!("Pending  {name}");
    }
    println!(
        "\nTotal: {} migrations, {} pending",
        status.total_available,
        status.pending.len()
    );
    Ok(())
}
