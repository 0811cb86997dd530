//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - The PostgreSQL-backed migration/seed ledger
//! - The PostgreSQL-backed `DataService`

pub mod entities;
pub mod ledger;
pub mod repositories;
pub mod service;

pub use ledger::PgLedger;
pub use repositories::{ExpenseRepository, TestDataRepository};
pub use service::PgDataService;

use std::time::Duration;

use homeaccount_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Opens the connection pool.
///
/// The caller owns the returned pool; engines and repositories only borrow
/// connections from it.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs));

    Database::connect(options).await
}
