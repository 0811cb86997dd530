//! Migration and seed endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use homeaccount_core::maintenance::{AppliedUnit, LedgerStatus, SyncState};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiResult};

/// Read-only status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/migrations", get(migration_info))
        .route("/seeds", get(seed_status))
}

/// Routes that change the database; the caller applies the admin layer.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/migrations/run", post(run_migrations))
        .route("/seeds/run", post(run_seeds))
        .route("/seeds/reset", post(reset_seeds))
}

/// Migration ledger snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatusResponse {
    /// Applied migrations still on disk.
    pub total_applied: usize,
    /// Migration files on disk.
    pub total_available: usize,
    /// Most recently applied migration.
    pub latest_migration: Option<String>,
    /// When `latest_migration` was applied.
    pub applied_at: Option<DateTime<Utc>>,
    /// Migrations not yet applied.
    pub pending_migrations: Vec<String>,
    /// Applied migrations, oldest first.
    pub applied_migrations: Vec<AppliedUnit>,
    /// Ledger state.
    pub status: SyncState,
}

impl From<LedgerStatus> for MigrationStatusResponse {
    fn from(status: LedgerStatus) -> Self {
        Self {
            total_applied: status.total_applied,
            total_available: status.total_available,
            latest_migration: status.latest,
            applied_at: status.latest_applied_at,
            pending_migrations: status.pending,
            applied_migrations: status.applied,
            status: status.state,
        }
    }
}

/// Seed ledger snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedStatusResponse {
    /// Applied seeds still on disk.
    pub total_applied: usize,
    /// Seed files on disk.
    pub total_available: usize,
    /// Most recently applied seed.
    pub latest_seed: Option<String>,
    /// When `latest_seed` was applied.
    pub applied_at: Option<DateTime<Utc>>,
    /// Seeds not yet applied.
    pub pending_seeds: Vec<String>,
    /// Applied seeds, oldest first.
    pub applied_seeds: Vec<AppliedUnit>,
    /// Ledger state.
    pub status: SyncState,
}

impl From<LedgerStatus> for SeedStatusResponse {
    fn from(status: LedgerStatus) -> Self {
        Self {
            total_applied: status.total_applied,
            total_available: status.total_available,
            latest_seed: status.latest,
            applied_at: status.latest_applied_at,
            pending_seeds: status.pending,
            applied_seeds: status.applied,
            status: status.state,
        }
    }
}

/// Response for `/migrations`.
#[derive(Debug, Serialize)]
pub struct MigrationInfoResponse {
    /// Latest applied migration, or `none`.
    pub version: String,
    /// Ledger snapshot.
    pub database: MigrationStatusResponse,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

/// Response for a run request.
#[derive(Debug, Serialize)]
pub struct RunResponse<S> {
    /// Units applied by this pass.
    pub applied: Vec<String>,
    /// Snapshot after the pass.
    pub status: S,
}

/// Response for `/seeds/reset`.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Ledger rows removed.
    pub removed: u64,
    /// Snapshot after the reset.
    pub status: SeedStatusResponse,
}

/// GET `/migrations`
async fn migration_info(State(state): State<AppState>) -> Json<MigrationInfoResponse> {
    let status = state.migrations.status().await;

    Json(MigrationInfoResponse {
        version: status.latest.clone().unwrap_or_else(|| "none".to_string()),
        database: status.into(),
        timestamp: Utc::now(),
    })
}

/// POST `/migrations/run`
async fn run_migrations(
    State(state): State<AppState>,
) -> ApiResult<Json<RunResponse<MigrationStatusResponse>>> {
    let report = state.migrations.apply().await?;
    info!(applied = report.applied.len(), "Migrations run via API");

    Ok(Json(RunResponse {
        applied: report.applied,
        status: state.migrations.status().await.into(),
    }))
}

/// GET `/seeds`
async fn seed_status(State(state): State<AppState>) -> Json<SeedStatusResponse> {
    Json(state.seeds.status().await.into())
}

/// POST `/seeds/run`
async fn run_seeds(
    State(state): State<AppState>,
) -> ApiResult<Json<RunResponse<SeedStatusResponse>>> {
    let report = state.seeds.apply().await?;
    info!(applied = report.applied.len(), "Seeds run via API");

    Ok(Json(RunResponse {
        applied: report.applied,
        status: state.seeds.status().await.into(),
    }))
}

/// POST `/seeds/reset`
async fn reset_seeds(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    let removed = state.seeds.reset().await?;

    Ok(Json(ResetResponse {
        removed,
        status: state.seeds.status().await.into(),
    }))
}
