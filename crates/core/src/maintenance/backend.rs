//! Storage seam for the ledger and for executing unit SQL.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::error::BackendError;
use super::types::AppliedUnit;

/// Ledger storage and SQL execution for one engine.
///
/// Implementations are bound to a single [`UnitKind`](super::UnitKind) ledger
/// table. Each call is an independent statement; nothing spans a transaction.
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Creates the ledger table if it does not exist.
    async fn ensure_table(&self) -> Result<(), BackendError>;

    /// Ledger rows ordered by `applied_at`, oldest first.
    async fn applied(&self) -> Result<Vec<AppliedUnit>, BackendError>;

    /// Executes a unit's full text as one statement batch.
    async fn execute_batch(&self, sql: &str) -> Result<(), BackendError>;

    /// Records a unit as applied. Recording an existing name is a no-op.
    async fn record(&self, name: &str) -> Result<(), BackendError>;

    /// Deletes every ledger row, returning how many were removed.
    async fn clear(&self) -> Result<u64, BackendError>;
}

/// In-process ledger.
///
/// Backs the fixture mode of the server and the engine tests. Executed
/// batches are kept in order; [`fail_when`](Self::fail_when) and
/// [`set_offline`](Self::set_offline) inject failures.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    table_ready: bool,
    applied: Vec<AppliedUnit>,
    executed: Vec<String>,
    failing: Vec<String>,
    offline: bool,
    last_stamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::new("connection refused"));
        }
        Ok(())
    }

    fn check_table(&self) -> Result<(), BackendError> {
        self.check_online()?;
        if !self.table_ready {
            return Err(BackendError::new("relation does not exist"));
        }
        Ok(())
    }

    /// Strictly increasing clock, so rows never share a timestamp.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger that already records `names` as applied, in order.
    #[must_use]
    pub fn with_applied<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ledger = Self::new();
        {
            let mut state = ledger.lock();
            state.table_ready = true;
            for name in names {
                let applied_at = Some(state.next_stamp());
                state.applied.push(AppliedUnit {
                    name: name.into(),
                    applied_at,
                });
            }
        }
        ledger
    }

    /// Makes every batch containing `needle` fail.
    pub fn fail_when(&self, needle: impl Into<String>) {
        self.lock().failing.push(needle.into());
    }

    /// Simulates losing (or regaining) the database.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Batches executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    /// Current ledger rows, oldest first.
    #[must_use]
    pub fn rows(&self) -> Vec<AppliedUnit> {
        self.lock().applied.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LedgerBackend for MemoryLedger {
    async fn ensure_table(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_online()?;
        state.table_ready = true;
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<AppliedUnit>, BackendError> {
        let state = self.lock();
        state.check_table()?;
        Ok(state.applied.clone())
    }

    async fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_online()?;
        if let Some(needle) = state.failing.iter().find(|n| sql.contains(n.as_str())) {
            return Err(BackendError::new(format!("injected failure on {needle:?}")));
        }
        state.executed.push(sql.to_string());
        Ok(())
    }

    async fn record(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.check_table()?;
        if state.applied.iter().any(|unit| unit.name == name) {
            return Ok(());
        }
        let applied_at = Some(state.next_stamp());
        state.applied.push(AppliedUnit {
            name: name.to_string(),
            applied_at,
        });
        Ok(())
    }

    async fn clear(&self) -> Result<u64, BackendError> {
        let mut state = self.lock();
        state.check_table()?;
        let removed = state.applied.len() as u64;
        state.applied.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_ignores_duplicates() {
        let ledger = MemoryLedger::new();
        ledger.ensure_table().await.unwrap();
        ledger.record("001_a.sql").await.unwrap();
        ledger.record("001_a.sql").await.unwrap();

        assert_eq!(ledger.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_reads_require_table() {
        let ledger = MemoryLedger::new();
        assert!(ledger.applied().await.is_err());

        ledger.ensure_table().await.unwrap();
        assert!(ledger.applied().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let ledger = MemoryLedger::with_applied(["001_a.sql"]);
        ledger.set_offline(true);

        assert!(ledger.ensure_table().await.is_err());
        assert!(ledger.applied().await.is_err());
        assert!(ledger.execute_batch("SELECT 1").await.is_err());

        ledger.set_offline(false);
        assert_eq!(ledger.applied().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let ledger = MemoryLedger::new();
        ledger.fail_when("BROKEN");

        assert!(ledger.execute_batch("SELECT 1").await.is_ok());
        let err = ledger.execute_batch("BROKEN SQL").await.unwrap_err();
        assert!(err.message().contains("BROKEN"));
        assert_eq!(ledger.executed(), vec!["SELECT 1"]);
    }

    #[test]
    fn test_stamps_strictly_increase() {
        let ledger = MemoryLedger::with_applied(["a", "b", "c", "d"]);
        let rows = ledger.rows();
        for pair in rows.windows(2) {
            assert!(pair[0].applied_at < pair[1].applied_at);
        }
    }
}
