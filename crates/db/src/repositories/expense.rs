//! Expense repository.

use homeaccount_core::data::Expense;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder};

use crate::entities::expenses;

/// Read access to the `expenses` table.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists every expense, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Expense>, DbErr> {
        let rows = expenses::Entity::find()
            .order_by_desc(expenses::Column::Date)
            .order_by_asc(expenses::Column::Description)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Expense::from).collect())
    }
}

impl From<expenses::Model> for Expense {
    fn from(model: expenses::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            amount: model.amount,
            date: model.date,
        }
    }
}
