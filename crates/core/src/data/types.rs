//! Data records served by the API.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A row of the `test_data` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestDataRecord {
    /// Row identifier.
    pub id: i32,
    /// Display name; listings are ordered by it.
    pub name: String,
    /// Free-form message.
    pub message: Option<String>,
    /// Arbitrary integer payload.
    pub value: Option<i32>,
    /// Whether the row shows up in the active listing.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    /// Expense identifier.
    pub id: Uuid,
    /// What the money was spent on.
    pub description: String,
    /// Amount; exact in storage, a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Day of the expense, `YYYY-MM-DD` on the wire.
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_expense_wire_format() {
        let expense = Expense {
            id: Uuid::nil(),
            description: "Office Supplies".into(),
            amount: dec!(125.50),
            date: NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
        };

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["amount"], serde_json::json!(125.5));
        assert_eq!(json["date"], "2025-01-23");
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
    }
}
