//! Core expense tracking domain for spendwise.
//!
//! Storage backends live in their own crates and plug in through
//! [`expenses::ExpenseRepositoryTrait`].

pub mod errors;
pub mod expenses;
pub mod sync;
pub mod utils;

pub use errors::{Error, Result, ValidationError};
