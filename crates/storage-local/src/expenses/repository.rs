//! Local expense repository.
//!
//! The whole collection for the device is kept as one JSON array under
//! [`EXPENSES_KEY`]. Every mutation reads the array, changes it, and writes the
//! full array back, so cost grows with the total number of stored records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;

use spendwise_core::expenses::{
    sort_recent_first, ExpenseRecord, ExpenseRepositoryTrait, ExpenseUpdate, NewExpense,
};
use spendwise_core::utils::{generate_id, next_created_at};
use spendwise_core::{Error, Result};

use super::model::ExpenseDB;
use super::seed::sample_expenses;
use crate::kv::KeyValueStore;

/// Storage key holding the serialized collection.
pub const EXPENSES_KEY: &str = "kec_expenses";

pub struct LocalExpenseRepository {
    store: Arc<dyn KeyValueStore>,
    seed_sample_data: bool,
    // Serializes read-modify-write cycles on the blob.
    write_lock: Mutex<()>,
}

impl LocalExpenseRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        LocalExpenseRepository {
            store,
            seed_sample_data: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Enable or disable first-visit sample records.
    pub fn with_sample_data(mut self, enabled: bool) -> Self {
        self.seed_sample_data = enabled;
        self
    }

    /// Every stored record for the device. Absent or corrupt data reads as empty.
    pub async fn load_all(&self) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .map(ExpenseRecord::from)
            .collect())
    }

    /// Persist sample records for `owner_id` when the owner has none.
    pub async fn seed_if_empty(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        let _guard = self.write_lock.lock().await;
        let mut existing = self.owner_records(owner_id).await?;
        if existing.is_empty() {
            existing = self.seed_locked(owner_id).await?;
        }
        Ok(existing)
    }

    async fn read_all(&self) -> Result<Vec<ExpenseDB>> {
        let Some(blob) = self.store.get(EXPENSES_KEY).await? else {
            return Ok(Vec::new());
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "Local expense data under '{}' is corrupt, treating as empty: {}",
                    EXPENSES_KEY, err
                );
                return Ok(Vec::new());
            }
        };

        let total = entries.len();
        let records: Vec<ExpenseDB> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<ExpenseDB>(entry) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping unreadable local expense entry: {}", err);
                    None
                }
            })
            .collect();
        if records.len() < total {
            warn!(
                "Dropped {} of {} local expense entries",
                total - records.len(),
                total
            );
        }
        Ok(records)
    }

    async fn write_all(&self, records: &[ExpenseDB]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        self.store.set(EXPENSES_KEY, &blob).await?;
        debug!("Persisted {} local expenses", records.len());
        Ok(())
    }

    async fn owner_records(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        let mut records: Vec<ExpenseRecord> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .map(ExpenseRecord::from)
            .collect();
        sort_recent_first(&mut records);
        Ok(records)
    }

    /// Caller must hold `write_lock`.
    async fn add_locked(&self, new_expense: NewExpense) -> Result<ExpenseRecord> {
        new_expense.validate()?;
        let mut all = self.read_all().await?;
        let record = new_expense.into_record(generate_id(), next_created_at());
        all.push(ExpenseDB::from(record.clone()));
        self.write_all(&all).await?;
        Ok(record)
    }

    /// Caller must hold `write_lock`.
    async fn seed_locked(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        let today = Utc::now().date_naive();
        let mut seeded = Vec::new();
        for sample in sample_expenses(owner_id, today) {
            seeded.push(self.add_locked(sample).await?);
        }
        info!(
            "Seeded {} sample expenses for new owner {}",
            seeded.len(),
            owner_id
        );
        sort_recent_first(&mut seeded);
        Ok(seeded)
    }
}

#[async_trait]
impl ExpenseRepositoryTrait for LocalExpenseRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        if !self.seed_sample_data {
            return self.owner_records(owner_id).await;
        }
        self.seed_if_empty(owner_id).await
    }

    async fn add(&self, new_expense: NewExpense) -> Result<ExpenseRecord> {
        let _guard = self.write_lock.lock().await;
        self.add_locked(new_expense).await
    }

    async fn update(&self, id: &str, update: ExpenseUpdate) -> Result<ExpenseRecord> {
        update.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;

        let entry = all
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        let mut record = ExpenseRecord::from(entry.clone());
        record.apply_update(update);
        *entry = ExpenseDB::from(record.clone());

        self.write_all(&all).await?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut all = self.read_all().await?;
        let before = all.len();
        all.retain(|r| r.id != id);
        if all.len() == before {
            debug!("Local expense {} already absent", id);
            return Ok(());
        }
        self.write_all(&all).await
    }
}
