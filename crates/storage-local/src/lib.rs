//! On-device storage for spendwise expenses.

pub mod errors;
pub mod expenses;
pub mod kv;

pub use errors::{StorageError, StorageResult};
pub use expenses::{LocalExpenseRepository, EXPENSES_KEY};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
