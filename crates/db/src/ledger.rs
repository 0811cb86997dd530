//! PostgreSQL ledger for the migration and seed engines.
//!
//! The ledger tables keep the layout the application has always used:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS migrations (
//!     id SERIAL PRIMARY KEY,
//!     migration_name VARCHAR(255) NOT NULL UNIQUE,
//!     applied_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
//!     checksum VARCHAR(64)
//! );
//! ```
//!
//! `seeds` is identical with `seed_name`. `checksum` is reserved and never
//! written.

use async_trait::async_trait;
use chrono::Utc;
use homeaccount_core::maintenance::{AppliedUnit, BackendError, LedgerBackend, UnitKind};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};
use tracing::error;

/// Ledger stored in PostgreSQL.
///
/// Every call borrows one pooled connection for a single statement.
#[derive(Debug, Clone)]
pub struct PgLedger {
    db: DatabaseConnection,
    kind: UnitKind,
}

impl PgLedger {
    /// Creates a ledger for `kind` over an existing pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection, kind: UnitKind) -> Self {
        Self { db, kind }
    }
}

fn create_table_sql(kind: UnitKind) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id SERIAL PRIMARY KEY,
            {column} VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
            checksum VARCHAR(64)
        )",
        table = kind.ledger_table(),
        column = kind.name_column(),
    )
}

fn select_applied_sql(kind: UnitKind) -> String {
    format!(
        "SELECT {column} AS name, applied_at FROM {table} ORDER BY applied_at ASC, id ASC",
        table = kind.ledger_table(),
        column = kind.name_column(),
    )
}

fn insert_sql(kind: UnitKind) -> String {
    format!(
        "INSERT INTO {table} ({column}) VALUES ($1) ON CONFLICT ({column}) DO NOTHING",
        table = kind.ledger_table(),
        column = kind.name_column(),
    )
}

fn clear_sql(kind: UnitKind) -> String {
    format!("DELETE FROM {}", kind.ledger_table())
}

fn backend_err(err: DbErr) -> BackendError {
    error!(error = %err, "Database query error");
    BackendError::new(err.to_string())
}

#[async_trait]
impl LedgerBackend for PgLedger {
    async fn ensure_table(&self) -> Result<(), BackendError> {
        self.db
            .execute_unprepared(&create_table_sql(self.kind))
            .await
            .map_err(backend_err)?;
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<AppliedUnit>, BackendError> {
        let rows = self
            .db
            .query_all(Statement::from_string(
                DbBackend::Postgres,
                select_applied_sql(self.kind),
            ))
            .await
            .map_err(backend_err)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("", "name")?;
                let applied_at: Option<DateTimeWithTimeZone> = row.try_get("", "applied_at")?;
                Ok(AppliedUnit {
                    name,
                    applied_at: applied_at.map(|at| at.with_timezone(&Utc)),
                })
            })
            .collect::<Result<Vec<_>, DbErr>>()
            .map_err(backend_err)
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        self.db.execute_unprepared(sql).await.map_err(backend_err)?;
        Ok(())
    }

    async fn record(&self, name: &str) -> Result<(), BackendError> {
        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                insert_sql(self.kind),
                [name.into()],
            ))
            .await
            .map_err(backend_err)?;
        Ok(())
    }

    async fn clear(&self) -> Result<u64, BackendError> {
        let result = self
            .db
            .execute_unprepared(&clear_sql(self.kind))
            .await
            .map_err(backend_err)?;
        Ok(result.rows_affected())
    }
}
