//! Per-application serialization of writes within one process

use platform_config_models::AppRef;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

// Idle lanes are pruned once the map grows past this many entries
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Default)]
pub(crate) struct AppLanes {
    lanes: Mutex<HashMap<AppRef, Arc<Mutex<()>>>>,
}

impl AppLanes {
    /// Wait for exclusive access to `app`'s lane
    pub(crate) async fn acquire(&self, app: &AppRef) -> OwnedMutexGuard<()> {
        let lane = {
            let mut lanes = self.lanes.lock().await;
            if lanes.len() > PRUNE_THRESHOLD {
                lanes.retain(|_, lane| Arc::strong_count(lane) > 1);
            }
            lanes.entry(app.clone()).or_default().clone()
        };
        lane.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.lanes.lock().await.len()
    }
}
