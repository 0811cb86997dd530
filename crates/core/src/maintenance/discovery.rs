//! Unit file discovery.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::error::EngineError;
use super::types::{SIDECAR_SUFFIX, SQL_SUFFIX, UnitKind};

/// Lists the unit files of `kind` in `dir`, sorted by filename.
///
/// A missing directory yields no units.
pub async fn list_units(dir: &Path, kind: UnitKind) -> Result<Vec<String>, EngineError> {
    let io_err = |source: std::io::Error| EngineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(kind = %kind, dir = %dir.display(), "No {kind} directory found");
            return Ok(Vec::new());
        }
        Err(e) => return Err(io_err(e)),
    };

    let mut units = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if entry.file_type().await.map_err(io_err)?.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            debug!(kind = %kind, "Skipping non UTF-8 filename");
            continue;
        };
        if kind.matches(&name) {
            units.push(name);
        }
    }

    units.sort();
    debug!(kind = %kind, dir = %dir.display(), count = units.len(), "Found {kind} files");
    Ok(units)
}

/// Reads the full text of one unit.
pub async fn read_unit(dir: &Path, name: &str) -> Result<String, EngineError> {
    let path = dir.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| EngineError::Io { path, source })
}

/// Sidecar seed filename for a migration: `001_x.sql` becomes `001_x.seeds.sql`.
#[must_use]
pub fn sidecar_name(migration: &str) -> Option<String> {
    migration
        .strip_suffix(SQL_SUFFIX)
        .map(|base| format!("{base}{SIDECAR_SUFFIX}"))
}
