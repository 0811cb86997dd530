//! Shared errors and configuration for HomeAccount.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Layered configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, DatabaseConfig, MaintenanceConfig, ServerConfig};
pub use error::{AppError, AppResult};
