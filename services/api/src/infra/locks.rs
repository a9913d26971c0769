use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// In-process async locks keyed by string (normalized email).
///
/// Serializes revoke-then-insert for one address inside this process. Idle
/// entries are pruned whenever a new key is locked.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // Only the map holds a reference: nobody is waiting on or holding it.
            map.retain(|k, v| k == key || Arc::strong_count(v) > 1);
            Arc::clone(map.entry(key.to_owned()).or_default())
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}
