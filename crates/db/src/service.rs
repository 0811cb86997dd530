//! PostgreSQL-backed [`DataService`].

use async_trait::async_trait;
use homeaccount_core::data::{DataService, Expense, TestDataRecord};
use homeaccount_shared::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};
use tracing::error;

use crate::repositories::{ExpenseRepository, TestDataRepository};

/// Reads application data through the repositories.
#[derive(Debug, Clone)]
pub struct PgDataService {
    db: DatabaseConnection,
    test_data: TestDataRepository,
    expenses: ExpenseRepository,
}

impl PgDataService {
    /// Creates the service over an existing pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            test_data: TestDataRepository::new(db.clone()),
            expenses: ExpenseRepository::new(db.clone()),
            db,
        }
    }
}

fn db_error(err: DbErr) -> AppError {
    error!(error = %err, "Database query error");
    AppError::Database(err.to_string())
}

#[async_trait]
impl DataService for PgDataService {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn ping(&self) -> AppResult<()> {
        self.db
            .query_one(Statement::from_string(
                DbBackend::Postgres,
                "SELECT 1 AS health_check",
            ))
            .await
            .map_err(db_error)?
            .ok_or_else(|| AppError::Database("health check returned no rows".into()))?;
        Ok(())
    }

    async fn test_data(&self) -> AppResult<Vec<TestDataRecord>> {
        self.test_data.list_all().await.map_err(db_error)
    }

    async fn active_test_data(&self) -> AppResult<Vec<TestDataRecord>> {
        self.test_data.list_active().await.map_err(db_error)
    }

    async fn expenses(&self) -> AppResult<Vec<Expense>> {
        self.expenses.list().await.map_err(db_error)
    }
}
