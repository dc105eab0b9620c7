//! Device-local expense persistence.

mod model;
mod repository;
pub mod seed;

pub use model::ExpenseDB;
pub use repository::{LocalExpenseRepository, EXPENSES_KEY};
