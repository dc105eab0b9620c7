//! Remote document store backend for expenses.
//!
//! [`DocumentStoreClient`] speaks the store's REST API; [`RemoteExpenseRepository`]
//! maps expense records onto it and doubles as the availability probe.

pub mod client;
pub mod error;
pub mod repository;
pub mod types;

#[cfg(test)]
mod test_server;

pub use client::DocumentStoreClient;
pub use error::{RemoteStoreError, Result};
pub use repository::{RemoteExpenseRepository, DEFAULT_COLLECTION};
