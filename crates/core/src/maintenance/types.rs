//! Unit kinds, ledger rows, and status snapshots.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Suffix every unit file carries.
pub const SQL_SUFFIX: &str = ".sql";

/// Suffix of per-migration seed sidecars (`001_x.seeds.sql`).
pub const SIDECAR_SUFFIX: &str = ".seeds.sql";

/// Which family of units an engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Schema migrations.
    Migration,
    /// Data seeds.
    Seed,
}

impl UnitKind {
    /// Ledger table recording applied units of this kind.
    #[must_use]
    pub const fn ledger_table(self) -> &'static str {
        match self {
            Self::Migration => "migrations",
            Self::Seed => "seeds",
        }
    }

    /// Column holding the unit filename in the ledger table.
    #[must_use]
    pub const fn name_column(self) -> &'static str {
        match self {
            Self::Migration => "migration_name",
            Self::Seed => "seed_name",
        }
    }

    /// Lowercase singular label used in logs and messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Migration => "migration",
            Self::Seed => "seed",
        }
    }

    /// Whether a directory entry with this filename is a unit of this kind.
    ///
    /// Migrations skip `.seeds.sql` sidecars; the seed directory holds only
    /// seeds, so every `.sql` file there counts.
    #[must_use]
    pub fn matches(self, file_name: &str) -> bool {
        if !file_name.ends_with(SQL_SUFFIX) {
            return false;
        }
        match self {
            Self::Migration => !file_name.ends_with(SIDECAR_SUFFIX),
            Self::Seed => true,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedUnit {
    /// Unit filename.
    pub name: String,
    /// When the unit was recorded.
    pub applied_at: Option<DateTime<Utc>>,
}

/// Overall state of a ledger relative to the files on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    /// Every unit on disk has been applied.
    #[serde(rename = "up-to-date")]
    UpToDate,
    /// At least one unit on disk has not been applied.
    #[serde(rename = "pending")]
    Pending,
    /// The snapshot could not be computed.
    #[serde(rename = "unknown")]
    Unknown,
}

impl SyncState {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpToDate => "up-to-date",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

/// Derived snapshot of applied and pending units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatus {
    /// Number of applied units still present on disk.
    pub total_applied: usize,
    /// Number of unit files on disk.
    pub total_available: usize,
    /// Most recently applied unit.
    pub latest: Option<String>,
    /// When `latest` was applied.
    pub latest_applied_at: Option<DateTime<Utc>>,
    /// Units on disk not yet applied, in application order.
    pub pending: Vec<String>,
    /// Applied units, oldest first.
    pub applied: Vec<AppliedUnit>,
    /// Overall state.
    pub state: SyncState,
}

impl LedgerStatus {
    /// Builds a snapshot from the sorted files on disk and the ledger rows
    /// ordered by `applied_at`.
    ///
    /// Ledger rows whose file is gone are left out, so `applied` is always a
    /// subset of `available`.
    #[must_use]
    pub fn compute(available: &[String], ledger: Vec<AppliedUnit>) -> Self {
        let on_disk: HashSet<&str> = available.iter().map(String::as_str).collect();
        let applied: Vec<AppliedUnit> = ledger
            .into_iter()
            .filter(|unit| on_disk.contains(unit.name.as_str()))
            .collect();

        let applied_names: HashSet<&str> = applied.iter().map(|u| u.name.as_str()).collect();
        let pending: Vec<String> = available
            .iter()
            .filter(|name| !applied_names.contains(name.as_str()))
            .cloned()
            .collect();

        let (latest, latest_applied_at) = applied
            .last()
            .map_or((None, None), |unit| (Some(unit.name.clone()), unit.applied_at));

        let state = if pending.is_empty() {
            SyncState::UpToDate
        } else {
            SyncState::Pending
        };

        Self {
            total_applied: applied.len(),
            total_available: available.len(),
            latest,
            latest_applied_at,
            pending,
            applied,
            state,
        }
    }

    /// Snapshot reported when the ledger or directory could not be read.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            total_applied: 0,
            total_available: 0,
            latest: None,
            latest_applied_at: None,
            pending: Vec::new(),
            applied: Vec::new(),
            state: SyncState::Unknown,
        }
    }

    /// True when everything on disk is applied and there was something to apply.
    #[must_use]
    pub fn is_fully_applied(&self) -> bool {
        self.state == SyncState::UpToDate && self.total_applied > 0
    }
}

/// Outcome of one successful `apply` pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Engine kind.
    pub kind: UnitKind,
    /// Units applied during this pass, in order.
    pub applied: Vec<String>,
}

impl ApplyReport {
    /// A pass that found nothing to do.
    #[must_use]
    pub const fn empty(kind: UnitKind) -> Self {
        Self {
            kind,
            applied: Vec::new(),
        }
    }

    /// Whether the pass applied nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn unit(name: &str) -> AppliedUnit {
        AppliedUnit {
            name: name.to_string(),
            applied_at: Some(Utc::now()),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case(UnitKind::Migration, "001_init.sql", true)]
    #[case(UnitKind::Migration, "001_init.seeds.sql", false)]
    #[case(UnitKind::Migration, "README.md", false)]
    #[case(UnitKind::Migration, "001_init.sql.bak", false)]
    #[case(UnitKind::Seed, "001_users.sql", true)]
    #[case(UnitKind::Seed, "001_init.seeds.sql", true)]
    #[case(UnitKind::Seed, "notes.txt", false)]
    fn test_kind_matches(#[case] kind: UnitKind, #[case] file: &str, #[case] expected: bool) {
        assert_eq!(kind.matches(file), expected);
    }

    #[test]
    fn test_kind_ledger_names() {
        assert_eq!(UnitKind::Migration.ledger_table(), "migrations");
        assert_eq!(UnitKind::Migration.name_column(), "migration_name");
        assert_eq!(UnitKind::Seed.ledger_table(), "seeds");
        assert_eq!(UnitKind::Seed.name_column(), "seed_name");
        assert_eq!(UnitKind::Seed.to_string(), "seed");
    }

    #[test]
    fn test_compute_empty_is_up_to_date() {
        let status = LedgerStatus::compute(&[], Vec::new());
        assert_eq!(status.total_applied, 0);
        assert_eq!(status.total_available, 0);
        assert_eq!(status.state, SyncState::UpToDate);
        assert!(status.latest.is_none());
        assert!(!status.is_fully_applied());
    }

    #[test]
    fn test_compute_pending_preserves_file_order() {
        let available = names(&["001_a.sql", "002_b.sql", "003_c.sql"]);
        let status = LedgerStatus::compute(&available, vec![unit("002_b.sql")]);

        assert_eq!(status.pending, names(&["001_a.sql", "003_c.sql"]));
        assert_eq!(status.total_applied, 1);
        assert_eq!(status.total_available, 3);
        assert_eq!(status.latest.as_deref(), Some("002_b.sql"));
        assert_eq!(status.state, SyncState::Pending);
    }

    #[test]
    fn test_compute_drops_rows_without_file() {
        let available = names(&["001_a.sql"]);
        let status =
            LedgerStatus::compute(&available, vec![unit("001_a.sql"), unit("000_removed.sql")]);

        assert_eq!(status.total_applied, 1);
        assert_eq!(status.applied[0].name, "001_a.sql");
        assert_eq!(status.latest.as_deref(), Some("001_a.sql"));
        assert!(status.is_fully_applied());
    }

    #[test]
    fn test_unknown_snapshot_is_zeroed() {
        let status = LedgerStatus::unknown();
        assert_eq!(status.state, SyncState::Unknown);
        assert_eq!(status.total_applied, 0);
        assert!(status.pending.is_empty());
        assert!(status.applied.is_empty());
    }

    #[test]
    fn test_sync_state_serializes_as_wire_string() {
        assert_eq!(
            serde_json::to_string(&SyncState::UpToDate).unwrap(),
            "\"up-to-date\""
        );
        assert_eq!(SyncState::Pending.as_str(), "pending");
    }
}
