//! `SeaORM` entities.

pub mod expenses;
pub mod test_data;
