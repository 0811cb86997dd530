//! Seed runner for HomeAccount development data.
//!
//! Usage:
//!   seeder run     - Apply pending seed files
//!   seeder status  - Show seed status
//!   seeder reset   - Forget applied seeds so the next run re-applies them

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homeaccount_core::maintenance::{SyncState, UnitEngine, UnitKind};
use homeaccount_db::{PgLedger, connect};
use homeaccount_shared::AppConfig;

const USAGE: &str = "Usage:
  seeder run     - Apply pending seeds
  seeder status  - Show seed status
  seeder reset   - Clear the seed ledger";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homeaccount=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_default();
    if !matches!(command.as_str(), "run" | "status" | "reset") {
        eprintln!("{USAGE}");
        bail!("unknown command: {command}");
    }

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let engine = UnitEngine::seeds(
        &config.maintenance.seeds_dir,
        Arc::new(PgLedger::new(db, UnitKind::Seed)),
    );

    match command.as_str() {
        "run" => {
            let report = engine.apply().await.context("Seeding failed")?;
            println!("Seeding complete! {} seed(s) applied", report.applied.len());
        }
        "reset" => {
            let removed = engine.reset().await.context("Seed reset failed")?;
            println!("Seed ledger cleared ({removed} entries removed)");
        }
        _ => {
            let status = engine.status().await;
            if status.state == SyncState::Unknown {
                bail!("Status check failed; see log for details");
            }
            println!("Seed Status:");
            println!("============");
            for unit in &status.applied {
                println!("Applied  {}", unit.name);
            }
            for name in &status.pending {
                println!("Pending  {name}");
            }
            println!(
                "\nTotal: {} seeds, {} pending",
                status.total_available,
                status.pending.len()
            );
        }
    }

    Ok(())
}
