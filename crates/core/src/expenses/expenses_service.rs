//! Routes expense operations to the remote store when it is reachable and to
//! local storage otherwise.
//!
//! A remote failure during any operation trips the availability prober and the
//! same operation is retried locally. From then on every call goes to local
//! storage. Records written to one backend are never copied to the other, so a
//! session that fails over will see the local record set only.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};

use super::expenses_model::{sort_recent_first, ExpenseRecord, ExpenseUpdate, NewExpense};
use super::expenses_summary::{ExpenseFilter, SpendingSummary};
use super::expenses_traits::{
    ExpenseRepositoryTrait, ExpenseServiceTrait, RemoteProbeTrait, StorageBackend,
};
use crate::errors::{Error, Result};
use crate::sync::AvailabilityProber;

pub struct ExpenseService {
    local: Arc<dyn ExpenseRepositoryTrait>,
    remote: Option<Arc<dyn ExpenseRepositoryTrait>>,
    prober: AvailabilityProber,
}

impl ExpenseService {
    /// Service backed by local storage only.
    pub fn new(local: Arc<dyn ExpenseRepositoryTrait>) -> Self {
        Self {
            local,
            remote: None,
            prober: AvailabilityProber::disabled(),
        }
    }

    /// Adds a remote store, probed once with `probe_timeout` on first use.
    pub fn with_remote(
        mut self,
        remote: Arc<dyn ExpenseRepositoryTrait>,
        probe: Arc<dyn RemoteProbeTrait>,
        probe_timeout: Duration,
    ) -> Self {
        self.remote = Some(remote);
        self.prober = AvailabilityProber::new(probe, probe_timeout);
        self
    }

    async fn remote_if_available(&self) -> Option<&Arc<dyn ExpenseRepositoryTrait>> {
        let remote = self.remote.as_ref()?;
        if self.prober.is_remote_available().await {
            Some(remote)
        } else {
            None
        }
    }

    /// True when `id` is among the records visible to `owner_id`.
    async fn owns(&self, owner_id: &str, id: &str) -> Result<bool> {
        let records = self.list_for_owner(owner_id).await?;
        Ok(records.iter().any(|r| r.id == id))
    }

    /// Swallow a remote failure (tripping the prober) or hand back any other error.
    fn absorb_remote_failure(&self, operation: &str, err: Error) -> Result<()> {
        if !err.is_remote_failure() {
            return Err(err);
        }
        warn!(
            "Remote {} failed, falling back to local storage: {}",
            operation, err
        );
        self.prober.mark_unavailable();
        Ok(())
    }
}

#[async_trait]
impl ExpenseServiceTrait for ExpenseService {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<ExpenseRecord>> {
        let mut records = match self.remote_if_available().await {
            Some(remote) => match remote.list_for_owner(owner_id).await {
                Ok(records) => records,
                Err(err) => {
                    self.absorb_remote_failure("list", err)?;
                    self.local.list_for_owner(owner_id).await?
                }
            },
            None => self.local.list_for_owner(owner_id).await?,
        };

        records.retain(|r| r.owner_id == owner_id);
        sort_recent_first(&mut records);
        debug!("Listed {} expenses for owner {}", records.len(), owner_id);
        Ok(records)
    }

    async fn list_filtered(
        &self,
        owner_id: &str,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseRecord>> {
        let records = self.list_for_owner(owner_id).await?;
        Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
    }

    async fn add(&self, new_expense: NewExpense) -> Result<ExpenseRecord> {
        new_expense.validate()?;

        if let Some(remote) = self.remote_if_available().await {
            match remote.add(new_expense.clone()).await {
                Ok(record) => return Ok(record),
                Err(err) => self.absorb_remote_failure("add", err)?,
            }
        }
        self.local.add(new_expense).await
    }

    async fn update(
        &self,
        owner_id: &str,
        id: &str,
        update: ExpenseUpdate,
    ) -> Result<ExpenseRecord> {
        update.validate()?;
        if !self.owns(owner_id, id).await? {
            return Err(Error::not_found(id));
        }

        if let Some(remote) = self.remote_if_available().await {
            match remote.update(id, update.clone()).await {
                Ok(record) => return Ok(record),
                Err(err) => self.absorb_remote_failure("update", err)?,
            }
        }
        self.local.update(id, update).await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        // Another owner's record is treated like a missing one.
        if !self.owns(owner_id, id).await? {
            debug!("Expense {} not held by owner {}, nothing to delete", id, owner_id);
            return Ok(());
        }

        if let Some(remote) = self.remote_if_available().await {
            match remote.delete(id).await {
                Ok(()) => return Ok(()),
                Err(err) => self.absorb_remote_failure("delete", err)?,
            }
        }
        self.local.delete(id).await
    }

    async fn summarize(&self, owner_id: &str, today: NaiveDate) -> Result<SpendingSummary> {
        let records = self.list_for_owner(owner_id).await?;
        Ok(SpendingSummary::from_records(&records, today))
    }

    async fn active_backend(&self) -> StorageBackend {
        match self.remote_if_available().await {
            Some(_) => StorageBackend::Remote,
            None => StorageBackend::Local,
        }
    }
}
