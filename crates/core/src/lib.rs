//! Core logic for HomeAccount.
//!
//! This crate contains the migration/seed engine and the service layer with
//! ZERO web or database dependencies. Storage is reached through the
//! [`maintenance::LedgerBackend`] and [`data::DataService`] traits.
//!
//! # Modules
//!
//! - `maintenance` - Ordered SQL file application with an applied ledger
//! - `data` - Test data and expense listing
//! - `health` - Health check aggregation

pub mod data;
pub mod health;
pub mod maintenance;
