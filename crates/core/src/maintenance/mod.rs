//! Ordered application of SQL units (migrations and seeds).
//!
//! A unit is one `.sql` file identified by its filename. Units are applied in
//! ascending filename order, at most once each, and every success is recorded
//! in a ledger table through a [`LedgerBackend`].

pub mod backend;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod types;


pub use backend::{LedgerBackend, MemoryLedger};
pub use engine::{HookFuture, UnitEngine};
pub use error::{BackendError, EngineError};
pub use types::{AppliedUnit, ApplyReport, LedgerStatus, SyncState, UnitKind};
