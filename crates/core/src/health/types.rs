//! Health check types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Status of one check or of the whole application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Working normally.
    Healthy,
    /// Working with reduced quality.
    Degraded,
    /// Not working.
    Unhealthy,
}

impl HealthStatus {
    /// Worst status of a set of checks; healthy when there are none.
    pub fn aggregate<'a>(checks: impl IntoIterator<Item = &'a HealthCheck>) -> Self {
        checks
            .into_iter()
            .map(|check| check.status)
            .max()
            .unwrap_or(Self::Healthy)
    }
}

/// Result of a single named check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    /// Check name, e.g. `database`.
    pub name: &'static str,
    /// Outcome.
    pub status: HealthStatus,
    /// Milliseconds the check took, when timed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    /// Human readable summary.
    pub message: String,
    /// Check-specific details.
    pub details: Value,
}

/// Aggregated application health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Worst status across `checks`.
    pub status: HealthStatus,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// Individual checks.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Finds a check by name.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|check| check.name == name)
    }
}
