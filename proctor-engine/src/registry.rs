//! In-memory registry of load tasks

use proctor_core::LiveSimulationState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Control handle for one running load task
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub cancel: CancellationToken,
    pub live: Arc<Mutex<LiveSimulationState>>,
}

impl RunHandle {
    pub fn new(live: LiveSimulationState) -> Self {
        Self {
            cancel: CancellationToken::new(),
            live: Arc::new(Mutex::new(live)),
        }
    }

    pub fn live(&self) -> MutexGuard<'_, LiveSimulationState> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> LiveSimulationState {
        self.live().clone()
    }

    /// Ask the task to stop at its next check
    pub fn request_stop(&self) {
        self.live().stop_requested = true;
        self.cancel.cancel();
    }
}

/// Load tasks keyed by run id. An entry exists from run start until finalization.
#[derive(Debug, Default)]
pub struct RunRegistry {
    handles: Mutex<HashMap<String, RunHandle>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<String, RunHandle>> {
        self.handles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, run_id: &str, handle: RunHandle) {
        self.handles().insert(run_id.to_string(), handle);
    }

    pub fn get(&self, run_id: &str) -> Option<RunHandle> {
        self.handles().get(run_id).cloned()
    }

    pub fn remove(&self, run_id: &str) -> Option<RunHandle> {
        self.handles().remove(run_id)
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }

    /// Cancel every registered task, used on shutdown
    pub fn cancel_all(&self) {
        for handle in self.handles().values() {
            handle.request_stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    #[test]
    fn test_request_stop_cancels_and_flags() {
        let registry = RunRegistry::new();
        let handle = RunHandle::new(LiveSimulationState::new("r1", Utc::now(), Duration::from_secs(5)));
        registry.insert("r1", handle.clone());

        registry.get("r1").unwrap().request_stop();
        assert!(handle.cancel.is_cancelled());
        assert!(handle.snapshot().stop_requested);

        assert!(registry.remove("r1").is_some());
        assert!(registry.get("r1").is_none());
        assert!(registry.is_empty());
    }
}
