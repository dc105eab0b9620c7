//! One-shot remote availability check.
//!
//! The first caller issues a probe read and races it against a timeout. The
//! verdict is kept for the lifetime of the prober. A later remote failure can
//! trip the prober to unavailable, but nothing ever flips it back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::OnceCell;

use crate::expenses::RemoteProbeTrait;

/// Default time allowed for the probe read.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

pub struct AvailabilityProber {
    probe: Option<Arc<dyn RemoteProbeTrait>>,
    timeout: Duration,
    verdict: OnceCell<bool>,
    tripped: AtomicBool,
}

impl AvailabilityProber {
    pub fn new(probe: Arc<dyn RemoteProbeTrait>, timeout: Duration) -> Self {
        Self {
            probe: Some(probe),
            timeout,
            verdict: OnceCell::new(),
            tripped: AtomicBool::new(false),
        }
    }

    /// Prober for a service with no remote store configured.
    pub fn disabled() -> Self {
        Self {
            probe: None,
            timeout: DEFAULT_PROBE_TIMEOUT,
            verdict: OnceCell::new_with(Some(false)),
            tripped: AtomicBool::new(true),
        }
    }

    pub async fn is_remote_available(&self) -> bool {
        if self.tripped.load(Ordering::SeqCst) {
            return false;
        }
        let available = *self.verdict.get_or_init(|| self.run_probe()).await;
        available && !self.tripped.load(Ordering::SeqCst)
    }

    /// Permanently route away from the remote store.
    pub fn mark_unavailable(&self) {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            info!("Remote store marked unavailable for the rest of this session");
        }
    }

    async fn run_probe(&self) -> bool {
        let Some(probe) = self.probe.clone() else {
            return false;
        };

        debug!("Probing remote store (timeout {:?})", self.timeout);
        // Spawned so a timed-out probe keeps running instead of being dropped.
        let task = tokio::spawn(async move { probe.probe().await });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(()))) => {
                info!("Remote store is available");
                true
            }
            Ok(Ok(Err(err))) => {
                warn!("Remote store probe failed, using local storage: {}", err);
                false
            }
            Ok(Err(join_err)) => {
                warn!("Remote store probe task failed: {}", join_err);
                false
            }
            Err(_) => {
                warn!(
                    "Remote store probe timed out after {:?}, using local storage",
                    self.timeout
                );
                false
            }
        }
    }
}
