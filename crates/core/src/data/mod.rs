//! Test data and expense listing.

pub mod fixture;
pub mod service;
pub mod types;

pub use fixture::FixtureDataService;
pub use service::DataService;
pub use types::{Expense, TestDataRecord};
