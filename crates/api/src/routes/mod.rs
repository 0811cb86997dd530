//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::admin_middleware};

pub mod data;
pub mod health;
pub mod maintenance;

/// Creates the API router with all routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Maintenance actions that need the admin token
    let admin_routes = maintenance::admin_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        admin_middleware,
    ));

    Router::new()
        .merge(health::routes())
        .merge(data::routes())
        .merge(maintenance::routes())
        .merge(admin_routes)
}
