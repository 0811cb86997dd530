//! Health, version, and liveness endpoints.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use homeaccount_core::health::{HealthReport, HealthStatus};
use homeaccount_core::maintenance::SyncState;
use serde::Serialize;

use crate::AppState;

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/current-data", get(current_data))
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health))
        .route("/version", get(version))
}

/// Response for `/current-data`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDataResponse {
    /// Server time.
    pub current_time: DateTime<Utc>,
    /// Greeting.
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Whether the database check passed.
    pub database: bool,
    /// When the checks ran.
    pub timestamp: DateTime<Utc>,
}

/// Migration summary inside [`VersionResponse`].
#[derive(Debug, Serialize)]
pub struct MigrationSummary {
    /// Applied migrations.
    pub applied: usize,
    /// Migration files on disk.
    pub total: usize,
    /// Ledger state.
    pub status: SyncState,
}

/// Response for `/version`.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Application version.
    pub application: String,
    /// Latest applied migration, or `none`.
    pub database: String,
    /// Migration counts.
    pub migrations: MigrationSummary,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

/// GET `/current-data`
async fn current_data() -> Json<CurrentDataResponse> {
    Json(CurrentDataResponse {
        current_time: Utc::now(),
        message: "Hello from the HomeAccount backend!",
    })
}

/// GET `/health`
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = state.health.check_application().await;
    let database = report
        .check("database")
        .is_some_and(|check| check.status == HealthStatus::Healthy);

    Json(HealthResponse {
        status: report.status,
        database,
        timestamp: report.timestamp,
    })
}

/// GET `/health/detailed`
async fn detailed_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.check_application().await)
}

/// GET `/version`
async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    let status = state.migrations.status().await;

    Json(VersionResponse {
        application: state.version.clone(),
        database: status.latest.unwrap_or_else(|| "none".to_string()),
        migrations: MigrationSummary {
            applied: status.total_applied,
            total: status.total_available,
            status: status.state,
        },
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::TestApp;

    #[tokio::test]
    async fn test_current_data() {
        let app = TestApp::new();
        let (status, json) = app.get("/current-data").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["currentTime"].as_str().is_some());
        assert!(json["message"].as_str().unwrap().contains("HomeAccount"));
    }

    #[tokio::test]
    async fn test_health_healthy() {
        let app = TestApp::new();
        let (status, json) = app.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], true);
    }

    #[tokio::test]
    async fn test_health_reports_database_down() {
        let app = TestApp::new();
        app.fixture.set_healthy(false);

        let (status, json) = app.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["database"], false);
    }

    #[tokio::test]
    async fn test_detailed_health_lists_checks() {
        let app = TestApp::new();
        let (_, json) = app.get("/health/detailed").await;

        let names: Vec<&str> = json["checks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|check| check["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["database", "uptime"]);
        assert_eq!(json["checks"][0]["details"]["backend"], "fixture");
    }

    #[tokio::test]
    async fn test_version_before_and_after_migrating() {
        let app = TestApp::new();

        let (_, before) = app.get("/version").await;
        assert_eq!(before["application"], "9.9.9-test");
        assert_eq!(before["database"], "none");
        assert_eq!(before["migrations"]["status"], "pending");
        assert_eq!(before["migrations"]["total"], 2);

        app.state.migrations.apply().await.unwrap();

        let (_, after) = app.get("/version").await;
        assert_eq!(after["database"], "002_expenses.sql");
        assert_eq!(after["migrations"]["applied"], 2);
        assert_eq!(after["migrations"]["status"], "up-to-date");
    }
}
