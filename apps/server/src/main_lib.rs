//! Builds the shared application state from configuration.

use std::sync::Arc;

use anyhow::Context;
use spendwise_core::expenses::{ExpenseService, ExpenseServiceTrait};
use spendwise_remote_store::{DocumentStoreClient, RemoteExpenseRepository};
use spendwise_storage_local::{FileKeyValueStore, LocalExpenseRepository};
use tracing::info;

use crate::config::ServerConfig;

pub struct AppState {
    pub expense_service: Arc<dyn ExpenseServiceTrait>,
}

pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let mut store = FileKeyValueStore::new(&config.data_dir);
    if let Some(quota) = config.storage_quota_bytes {
        store = store.with_quota(quota);
    }
    let local = Arc::new(
        LocalExpenseRepository::new(Arc::new(store)).with_sample_data(config.seed_sample_data),
    );
    info!("Local expense storage at {}", config.data_dir.display());

    let mut service = ExpenseService::new(local);
    if let Some(remote_config) = &config.remote {
        let mut client = DocumentStoreClient::new(&remote_config.base_url)
            .context("Failed to create document store client")?;
        if let Some(token) = &remote_config.token {
            client = client.with_token(token);
        }
        let remote = Arc::new(
            RemoteExpenseRepository::new(client).with_collection(&remote_config.collection),
        );
        service = service.with_remote(remote.clone(), remote, remote_config.probe_timeout);
        info!(
            "Remote expense store at {} (collection '{}')",
            remote_config.base_url, remote_config.collection
        );
    } else {
        info!("No remote store configured; using local storage only");
    }

    Ok(Arc::new(AppState {
        expense_service: Arc::new(service),
    }))
}
