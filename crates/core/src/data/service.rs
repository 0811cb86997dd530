//! Data access seam.

use async_trait::async_trait;
use homeaccount_shared::AppResult;

use super::types::{Expense, TestDataRecord};

/// Read access to application data.
///
/// Two implementations exist: the PostgreSQL-backed one in `homeaccount-db`
/// and [`FixtureDataService`](super::FixtureDataService). The server picks one
/// at startup from configuration.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Short name of the backing store, reported by health checks.
    fn backend_name(&self) -> &'static str;

    /// Round-trips a trivial query.
    async fn ping(&self) -> AppResult<()>;

    /// Every test data row, ordered by name.
    async fn test_data(&self) -> AppResult<Vec<TestDataRecord>>;

    /// Active test data rows, ordered by name.
    async fn active_test_data(&self) -> AppResult<Vec<TestDataRecord>>;

    /// Every expense, most recent date first.
    async fn expenses(&self) -> AppResult<Vec<Expense>>;
}
