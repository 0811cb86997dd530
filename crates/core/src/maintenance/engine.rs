//! The unit engine: diff the directory against the ledger, apply what is pending.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::backend::LedgerBackend;
use super::discovery;
use super::error::EngineError;
use super::types::{AppliedUnit, ApplyReport, LedgerStatus, UnitKind};

/// Future returned by a post-apply hook.
pub type HookFuture = BoxFuture<'static, Result<(), EngineError>>;

type PostApplyHook = Box<dyn Fn() -> HookFuture + Send + Sync>;

/// Applies the units of one directory at most once each, in filename order.
///
/// The engine borrows storage through its [`LedgerBackend`]; it never owns
/// the connection pool. `apply` and `reset` are serialized per instance.
/// Separate processes sharing one ledger are only protected by the unique
/// name constraint.
pub struct UnitEngine {
    kind: UnitKind,
    dir: PathBuf,
    backend: Arc<dyn LedgerBackend>,
    sidecar_seeds: bool,
    hooks: Vec<(String, PostApplyHook)>,
    pass_lock: Mutex<()>,
}

impl UnitEngine {
    /// Creates an engine for `kind` units found in `dir`.
    pub fn new(kind: UnitKind, dir: impl Into<PathBuf>, backend: Arc<dyn LedgerBackend>) -> Self {
        Self {
            kind,
            dir: dir.into(),
            backend,
            sidecar_seeds: false,
            hooks: Vec::new(),
            pass_lock: Mutex::new(()),
        }
    }

    /// Creates a migration engine.
    pub fn migrations(dir: impl Into<PathBuf>, backend: Arc<dyn LedgerBackend>) -> Self {
        Self::new(UnitKind::Migration, dir, backend)
    }

    /// Creates a seed engine.
    pub fn seeds(dir: impl Into<PathBuf>, backend: Arc<dyn LedgerBackend>) -> Self {
        Self::new(UnitKind::Seed, dir, backend)
    }

    /// Also execute `NNN_x.seeds.sql` after each applied migration `NNN_x.sql`.
    ///
    /// Sidecar failures are logged and do not stop the pass. Only meaningful
    /// for migration engines.
    #[must_use]
    pub fn with_sidecar_seeds(mut self, enabled: bool) -> Self {
        self.sidecar_seeds = enabled && self.kind == UnitKind::Migration;
        self
    }

    /// Registers an action to run after every successful `apply`.
    ///
    /// Hooks run in registration order. Registering an existing name replaces
    /// that hook in place.
    pub fn register_hook<F, Fut>(&mut self, name: impl Into<String>, action: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), EngineError>> + Send + 'static,
    {
        let name = name.into();
        let hook: PostApplyHook = Box::new(move || action().boxed());
        match self.hooks.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = hook,
            None => self.hooks.push((name, hook)),
        }
    }

    /// Names of the registered hooks, in run order.
    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|(name, _)| name.as_str())
    }

    /// Kind of units this engine applies.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Directory scanned for units.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Applies every pending unit, then runs the post-apply hooks.
    ///
    /// Stops at the first unit whose SQL fails; that unit and everything after
    /// it stay pending and hooks are skipped.
    pub async fn apply(&self) -> Result<ApplyReport, EngineError> {
        let _pass = self.pass_lock.lock().await;

        let report = self.apply_pending().await.inspect_err(|e| {
            error!(kind = %self.kind, error = %e, "{} pass failed", self.kind);
        })?;

        self.run_hooks().await;
        Ok(report)
    }

    /// Snapshot of applied and pending units.
    ///
    /// Never fails: if the ledger or directory cannot be read the snapshot
    /// comes back with [`SyncState::Unknown`](super::SyncState::Unknown).
    pub async fn status(&self) -> LedgerStatus {
        match self.compute_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Failed to get {} status", self.kind);
                LedgerStatus::unknown()
            }
        }
    }

    /// Forgets every applied unit. Data written by those units is untouched,
    /// so the next `apply` re-runs all of them.
    pub async fn reset(&self) -> Result<u64, EngineError> {
        let _pass = self.pass_lock.lock().await;

        self.ensure_table().await?;
        let removed = self.backend.clear().await.map_err(|source| EngineError::Ledger {
            kind: self.kind,
            source,
        })?;
        info!(kind = %self.kind, removed, "{} ledger reset", self.kind);
        Ok(removed)
    }

    async fn apply_pending(&self) -> Result<ApplyReport, EngineError> {
        info!(kind = %self.kind, dir = %self.dir.display(), "Running pending {}s", self.kind);

        self.ensure_table().await?;
        let applied: HashSet<String> = self
            .applied()
            .await?
            .into_iter()
            .map(|unit| unit.name)
            .collect();
        let available = discovery::list_units(&self.dir, self.kind).await?;

        let pending: Vec<String> = available
            .into_iter()
            .filter(|name| !applied.contains(name))
            .collect();

        if pending.is_empty() {
            info!(kind = %self.kind, "No pending {}s found", self.kind);
            return Ok(ApplyReport::empty(self.kind));
        }

        info!(kind = %self.kind, count = pending.len(), "Found pending {}s", self.kind);

        let mut report = ApplyReport::empty(self.kind);
        for name in pending {
            self.apply_unit(&name).await?;
            report.applied.push(name);
        }

        info!(
            kind = %self.kind,
            count = report.applied.len(),
            "All {}s completed successfully",
            self.kind
        );
        Ok(report)
    }

    async fn apply_unit(&self, name: &str) -> Result<(), EngineError> {
        let sql = discovery::read_unit(&self.dir, name).await?;

        info!(kind = %self.kind, name, "Applying {}", self.kind);
        self.backend
            .execute_batch(&sql)
            .await
            .map_err(|source| EngineError::Execution {
                kind: self.kind,
                name: name.to_string(),
                source,
            })?;

        self.backend
            .record(name)
            .await
            .map_err(|source| EngineError::Ledger {
                kind: self.kind,
                source,
            })?;
        info!(kind = %self.kind, name, "Completed {}", self.kind);

        if self.sidecar_seeds {
            self.apply_sidecar(name).await;
        }
        Ok(())
    }

    async fn apply_sidecar(&self, migration: &str) {
        let Some(sidecar) = discovery::sidecar_name(migration) else {
            return;
        };

        let sql = match discovery::read_unit(&self.dir, &sidecar).await {
            Ok(sql) => sql,
            Err(EngineError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(migration, sidecar, "No sidecar seed file");
                return;
            }
            Err(e) => {
                warn!(migration, sidecar, error = %e, "Continuing without sidecar seeds");
                return;
            }
        };

        info!(migration, sidecar, "Running sidecar seeds");
        match self.backend.execute_batch(&sql).await {
            Ok(()) => info!(sidecar, "Sidecar seeds completed"),
            Err(e) => warn!(
                migration,
                sidecar,
                error = %e,
                "Sidecar seeds failed, continuing without them"
            ),
        }
    }

    async fn run_hooks(&self) {
        for (name, hook) in &self.hooks {
            debug!(kind = %self.kind, hook = %name, "Running post-apply hook");
            if let Err(e) = hook().await {
                warn!(kind = %self.kind, hook = %name, error = %e, "Post-apply hook failed");
            }
        }
    }

    async fn compute_status(&self) -> Result<LedgerStatus, EngineError> {
        self.ensure_table().await?;
        let ledger = self.applied().await?;
        let available = discovery::list_units(&self.dir, self.kind).await?;

        let status = LedgerStatus::compute(&available, ledger.clone());
        let orphaned = ledger.len() - status.total_applied;
        if orphaned > 0 {
            warn!(kind = %self.kind, orphaned, "Ledger rows without a matching file");
        }
        Ok(status)
    }

    async fn ensure_table(&self) -> Result<(), EngineError> {
        self.backend
            .ensure_table()
            .await
            .map_err(|source| EngineError::Ledger {
                kind: self.kind,
                source,
            })?;
        debug!(table = self.kind.ledger_table(), "Ledger table ready");
        Ok(())
    }

    async fn applied(&self) -> Result<Vec<AppliedUnit>, EngineError> {
        self.backend
            .applied()
            .await
            .map_err(|source| EngineError::Ledger {
                kind: self.kind,
                source,
            })
    }
}

impl std::fmt::Debug for UnitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitEngine")
            .field("kind", &self.kind)
            .field("dir", &self.dir)
            .field("sidecar_seeds", &self.sidecar_seeds)
            .field("hooks", &self.hook_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::MemoryLedger;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn engine(dir: &TempDir, ledger: &Arc<MemoryLedger>) -> UnitEngine {
        UnitEngine::migrations(dir.path(), ledger.clone())
    }

    #[tokio::test]
    async fn test_hooks_run_in_order_after_success() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("001_a.sql"), "SELECT 1;").unwrap();
        let ledger = Arc::new(MemoryLedger::new());
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut engine = engine(&dir, &ledger);
        for name in ["first", "second"] {
            let calls = calls.clone();
            engine.register_hook(name, move || {
                let calls = calls.clone();
                async move {
                    calls.lock().unwrap().push(name);
                    Ok(())
                }
            });
        }

        engine.apply().await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_block_siblings() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(MemoryLedger::new());
        let ran = Arc::new(AtomicUsize::new(0));

        let mut engine = engine(&dir, &ledger);
        engine.register_hook("broken", || async {
            Err(EngineError::Io {
                path: PathBuf::from("/seeds"),
                source: std::io::Error::other("boom"),
            })
        });
        let counter = ran.clone();
        engine.register_hook("counter", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let report = engine.apply().await.unwrap();
        assert!(report.is_noop());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hooks_skipped_when_pass_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("001_a.sql"), "BROKEN").unwrap();
        let ledger = Arc::new(MemoryLedger::new());
        ledger.fail_when("BROKEN");
        let ran = Arc::new(AtomicUsize::new(0));

        let mut engine = engine(&dir, &ledger);
        let counter = ran.clone();
        engine.register_hook("seed", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        assert!(engine.apply().await.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let dir = TempDir::new().unwrap();
        let ledger = Arc::new(MemoryLedger::new());
        let mut engine = engine(&dir, &ledger);

        engine.register_hook("seed", || async { Ok(()) });
        engine.register_hook("audit", || async { Ok(()) });
        engine.register_hook("seed", || async { Ok(()) });

        assert_eq!(engine.hook_names().collect::<Vec<_>>(), vec!["seed", "audit"]);
    }

    #[test]
    fn test_sidecar_seeds_only_for_migrations() {
        let dir = TempDir::new().unwrap();
        let ledger: Arc<dyn LedgerBackend> = Arc::new(MemoryLedger::new());

        let seeds = UnitEngine::seeds(dir.path(), ledger.clone()).with_sidecar_seeds(true);
        assert!(!seeds.sidecar_seeds);

        let migrations = UnitEngine::migrations(dir.path(), ledger).with_sidecar_seeds(true);
        assert!(migrations.sidecar_seeds);
    }
}
