use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::revision::RevisionId;
use crate::store::{MemoryVersionStore, PageCursor, StoreError, VersionPage, VersionStore};

/// A [`MemoryVersionStore`] whose fetches can be held open per revision.
#[derive(Debug, Clone, Default)]
pub struct GatedVersionStore {
    memory: MemoryVersionStore,
    gates: Arc<Mutex<HashMap<RevisionId, Arc<Semaphore>>>>,
    failures: Arc<Mutex<HashMap<RevisionId, String>>>,
}

impl GatedVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &MemoryVersionStore {
        &self.memory
    }

    /// Park fetches of `id` until [`release`](Self::release) is called.
    pub fn hold(&self, id: &RevisionId) {
        self.gates
            .lock()
            .insert(id.clone(), Arc::new(Semaphore::new(0)));
    }

    /// Let one parked (or future) fetch of `id` through.
    pub fn release(&self, id: &RevisionId) {
        if let Some(gate) = self.gates.lock().get(id) {
            gate.add_permits(1);
        }
    }

    /// Fetches of `id` fail with `reason` once through the gate.
    pub fn fail(&self, id: &RevisionId, reason: impl Into<String>) {
        self.failures.lock().insert(id.clone(), reason.into());
    }
}

#[async_trait]
impl VersionStore for GatedVersionStore {
    async fn list_versions(
        &self,
        key: &str,
        cursor: Option<&PageCursor>,
    ) -> Result<VersionPage, StoreError> {
        self.memory.list_versions(key, cursor).await
    }

    async fn get_version(&self, key: &str, version_id: &RevisionId) -> Result<Bytes, StoreError> {
        let gate = self.gates.lock().get(version_id).cloned();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;
            permit.forget();
        }

        let failure = self.failures.lock().get(version_id).cloned();
        if let Some(reason) = failure {
            return Err(StoreError::Request(reason));
        }
        self.memory.get_version(key, version_id).await
    }
}
