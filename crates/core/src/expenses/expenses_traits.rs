use async_trait::async_trait;
use chrono::NaiveDate;

use super::expenses_model::{ExpenseRecord, ExpenseUpdate, NewExpense};
use super::expenses_summary::{ExpenseFilter, SpendingSummary};
use crate::errors::Result;

/// One place expense records can live. Implemented by the local and remote
/// adapters; the service picks between them.
#[async_trait]
pub trait ExpenseRepositoryTrait: Send + Sync {
    /// Records owned by `owner_id`. Never returns another owner's record.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>>;

    async fn add(&self, new_expense: NewExpense) -> Result<ExpenseRecord>;

    /// Fails with `NotFound` when `id` does not exist.
    async fn update(&self, id: &str, update: ExpenseUpdate) -> Result<ExpenseRecord>;

    /// Idempotent: deleting a missing id succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Lightweight reachability read against a remote store.
#[async_trait]
pub trait RemoteProbeTrait: Send + Sync {
    async fn probe(&self) -> Result<()>;
}

/// Which backend the service is routing to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Remote,
    Local,
}

/// Entry point used by presentation code.
#[async_trait]
pub trait ExpenseServiceTrait: Send + Sync {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>>;

    async fn list_filtered(
        &self,
        owner_id: &str,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseRecord>>;

    async fn add(&self, new_expense: NewExpense) -> Result<ExpenseRecord>;

    /// `NotFound` unless `id` belongs to `owner_id`.
    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: ExpenseUpdate,
    ) -> Result<ExpenseRecord>;

    /// No-op when `id` is missing or held by another owner.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<()>;

    async fn summarize(&self, owner_id: &str, today: NaiveDate) -> Result<SpendingSummary>;

    async fn active_backend(&self) -> StorageBackend;
}
