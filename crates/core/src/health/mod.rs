//! Health check aggregation.

pub mod service;
pub mod types;

pub use service::HealthService;
pub use types::{HealthCheck, HealthReport, HealthStatus};
