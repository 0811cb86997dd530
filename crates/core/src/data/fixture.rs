//! In-memory data used when the server runs without PostgreSQL.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use homeaccount_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use super::service::DataService;
use super::types::{Expense, TestDataRecord};

/// Fixture-backed [`DataService`].
#[derive(Debug)]
pub struct FixtureDataService {
    records: Vec<TestDataRecord>,
    expenses: Vec<Expense>,
    healthy: AtomicBool,
}

impl Default for FixtureDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDataService {
    /// Creates the service with the bundled fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(default_records(), default_expenses())
    }

    /// Creates the service with caller-provided rows.
    #[must_use]
    pub fn with_data(mut records: Vec<TestDataRecord>, mut expenses: Vec<Expense>) -> Self {
        records.sort_by(|a, b| a.name.cmp(&b.name));
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            records,
            expenses,
            healthy: AtomicBool::new(true),
        }
    }

    /// Makes `ping` succeed or fail.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

#[async_trait]
impl DataService for FixtureDataService {
    fn backend_name(&self) -> &'static str {
        "fixture"
    }

    async fn ping(&self) -> AppResult<()> {
        if self.healthy.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(AppError::Database("fixture marked unhealthy".into()))
        }
    }

    async fn test_data(&self) -> AppResult<Vec<TestDataRecord>> {
        debug!(count = self.records.len(), "Serving fixture test data");
        Ok(self.records.clone())
    }

    async fn active_test_data(&self) -> AppResult<Vec<TestDataRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.is_active)
            .cloned()
            .collect())
    }

    async fn expenses(&self) -> AppResult<Vec<Expense>> {
        debug!(count = self.expenses.len(), "Serving fixture expenses");
        Ok(self.expenses.clone())
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

fn default_records() -> Vec<TestDataRecord> {
    vec![
        TestDataRecord {
            id: 1,
            name: "Mock Test Item 1".into(),
            message: Some("This is mock test data 1".into()),
            value: Some(100),
            is_active: true,
            created_at: at(10),
        },
        TestDataRecord {
            id: 2,
            name: "Mock Test Item 2".into(),
            message: Some("This is mock test data 2".into()),
            value: Some(200),
            is_active: false,
            created_at: at(11),
        },
        TestDataRecord {
            id: 3,
            name: "Mock Active Item".into(),
            message: Some("This is an active mock item".into()),
            value: Some(300),
            is_active: true,
            created_at: at(12),
        },
    ]
}

fn expense(id: &str, description: &str, cents: i64, day: u32) -> Expense {
    Expense {
        id: Uuid::parse_str(id).unwrap_or_default(),
        description: description.into(),
        amount: Decimal::new(cents, 2),
        date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap_or_default(),
    }
}

fn default_expenses() -> Vec<Expense> {
    vec![
        expense(
            "e1a2b3c4-d5e6-4f7a-8a9b-c0d1e2f3a4b5",
            "Office Supplies",
            12550,
            23,
        ),
        expense(
            "f2b3c4d5-e6f7-4a8b-9c0d-e1f2a3b4c5d6",
            "Business Lunch",
            6730,
            22,
        ),
        expense(
            "a3c4d5e6-f7a8-4b9c-8d1e-f2a3b4c5d6e7",
            "Software License",
            29999,
            21,
        ),
        expense(
            "b4d5e6f7-a8b9-4c0d-9e2f-a3b4c5d6e7f8",
            "Travel Expenses",
            45075,
            20,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_test_data_ordered_by_name() {
        let service = FixtureDataService::new();
        let records = service.test_data().await.unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Mock Active Item", "Mock Test Item 1", "Mock Test Item 2"]
        );
    }

    #[tokio::test]
    async fn test_active_test_data_only_active() {
        let service = FixtureDataService::new();
        let records = service.active_test_data().await.unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.is_active));
    }

    #[tokio::test]
    async fn test_expenses_newest_first() {
        let service = FixtureDataService::new();
        let expenses = service.expenses().await.unwrap();

        assert_eq!(expenses.len(), 4);
        assert_eq!(expenses[0].description, "Office Supplies");
        assert_eq!(expenses[0].amount, dec!(125.50));
        assert!(expenses.windows(2).all(|w| w[0].date >= w[1].date));
        assert!(expenses.iter().all(|e| !e.id.is_nil()));
    }

    #[tokio::test]
    async fn test_ping_follows_health_flag() {
        let service = FixtureDataService::new();
        assert!(service.ping().await.is_ok());

        service.set_healthy(false);
        assert!(service.ping().await.is_err());
    }
}
