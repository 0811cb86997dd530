//! Test data repository.

use chrono::Utc;
use homeaccount_core::data::TestDataRecord;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::test_data;

/// Read access to the `test_data` table.
#[derive(Debug, Clone)]
pub struct TestDataRepository {
    db: DatabaseConnection,
}

impl TestDataRepository {
    /// Creates a new test data repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every row ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<TestDataRecord>, DbErr> {
        let rows = test_data::Entity::find()
            .order_by_asc(test_data::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(TestDataRecord::from).collect())
    }

    /// Lists active rows ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<TestDataRecord>, DbErr> {
        let rows = test_data::Entity::find()
            .filter(test_data::Column::IsActive.eq(true))
            .order_by_asc(test_data::Column::Name)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(TestDataRecord::from).collect())
    }
}

impl From<test_data::Model> for TestDataRecord {
    fn from(model: test_data::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            message: model.message,
            value: model.value,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
