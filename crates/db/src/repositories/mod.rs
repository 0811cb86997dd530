//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod expense;
pub mod test_data;

pub use expense::ExpenseRepository;
pub use test_data::TestDataRepository;
