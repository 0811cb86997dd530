//! Router harness over fixture data and in-memory ledgers.

use std::fs;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION},
};
use homeaccount_core::data::FixtureDataService;
use homeaccount_core::health::HealthService;
use homeaccount_core::maintenance::{MemoryLedger, UnitEngine};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{AppState, create_router};

pub(crate) struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub fixture: Arc<FixtureDataService>,
    pub migration_ledger: Arc<MemoryLedger>,
    _migrations_dir: TempDir,
    _seeds_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_admin_token(token: &str) -> Self {
        Self::build(Some(token))
    }

    fn build(admin_token: Option<&str>) -> Self {
        let migrations_dir = TempDir::new().unwrap();
        fs::write(
            migrations_dir.path().join("001_test_data.sql"),
            "CREATE TABLE test_data ();",
        )
        .unwrap();
        fs::write(
            migrations_dir.path().join("002_expenses.sql"),
            "CREATE TABLE expenses ();",
        )
        .unwrap();

        let seeds_dir = TempDir::new().unwrap();
        fs::write(
            seeds_dir.path().join("001_rows.sql"),
            "INSERT INTO test_data DEFAULT VALUES;",
        )
        .unwrap();

        let fixture = Arc::new(FixtureDataService::new());
        let migration_ledger = Arc::new(MemoryLedger::new());
        let state = AppState {
            data: fixture.clone(),
            health: Arc::new(HealthService::new(fixture.clone())),
            migrations: Arc::new(UnitEngine::migrations(
                migrations_dir.path(),
                migration_ledger.clone(),
            )),
            seeds: Arc::new(UnitEngine::seeds(
                seeds_dir.path(),
                Arc::new(MemoryLedger::new()),
            )),
            version: "9.9.9-test".to_string(),
            admin_token: admin_token.map(Arc::<str>::from),
        };

        Self {
            router: create_router(state.clone()),
            state,
            fixture,
            migration_ledger,
            _migrations_dir: migrations_dir,
            _seeds_dir: seeds_dir,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri))
            .await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder).await
    }

    async fn send(&self, builder: axum::http::request::Builder) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }
}
