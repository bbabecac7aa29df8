use super::{SchedulerClient, SchedulerError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Accepts every descriptor with a made-up sequential id
///
/// Used by `submit --dry-run` to inspect generated descriptors without a
/// cluster. Ids start at `first_id`.
#[derive(Debug)]
pub struct DryRunScheduler {
    next_id: AtomicU64,
}

impl DryRunScheduler {
    pub fn new(first_id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(first_id),
        }
    }
}

impl Default for DryRunScheduler {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl SchedulerClient for DryRunScheduler {
    async fn submit(&self, descriptor_path: &Path) -> Result<String, SchedulerError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        info!(descriptor = %descriptor_path.display(), job_id = id, "Dry run: not submitting");
        Ok(format!("submission accepted, id={id}\n"))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
