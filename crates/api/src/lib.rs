//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for data, health, and schema maintenance
//! - Admin token middleware for the maintenance POST routes
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use homeaccount_core::data::DataService;
use homeaccount_core::health::HealthService;
use homeaccount_core::maintenance::UnitEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of test data and expenses.
    pub data: Arc<dyn DataService>,
    /// Health checks.
    pub health: Arc<HealthService>,
    /// Migration engine.
    pub migrations: Arc<UnitEngine>,
    /// Seed engine.
    pub seeds: Arc<UnitEngine>,
    /// Application version reported by `/version`.
    pub version: String,
    /// Bearer token required by maintenance POST routes, when set.
    pub admin_token: Option<Arc<str>>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support;
