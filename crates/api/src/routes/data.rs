//! Test data and expense listing routes.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use homeaccount_core::data::{Expense, TestDataRecord};
use serde::Serialize;

use crate::{AppState, error::ApiResult};

/// Creates the data routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/test-data", get(list_test_data))
        .route("/test-data/active", get(list_active_test_data))
        .route("/expenses", get(list_expenses))
}

/// Response for `/expenses`.
#[derive(Debug, Serialize)]
pub struct ExpensesResponse {
    /// Expenses, newest first.
    pub expenses: Vec<Expense>,
    /// Number of expenses.
    pub total: usize,
    /// Response time.
    pub timestamp: DateTime<Utc>,
}

/// GET `/test-data`
async fn list_test_data(State(state): State<AppState>) -> ApiResult<Json<Vec<TestDataRecord>>> {
    Ok(Json(state.data.test_data().await?))
}

/// GET `/test-data/active`
async fn list_active_test_data(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TestDataRecord>>> {
    Ok(Json(state.data.active_test_data().await?))
}

/// GET `/expenses`
async fn list_expenses(State(state): State<AppState>) -> ApiResult<Json<ExpensesResponse>> {
    let expenses = state.data.expenses().await?;

    Ok(Json(ExpensesResponse {
        total: expenses.len(),
        expenses,
        timestamp: Utc::now(),
    }))
}
