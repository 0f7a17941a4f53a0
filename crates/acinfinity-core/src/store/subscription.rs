// ── Entity state subscription ──

use std::sync::Arc;

use tokio::sync::watch;

use crate::entity::EntityState;

/// Published entity states of one account, updated after every refresh
/// that changed a value or an availability flag.
pub struct EntityStream {
    current: Arc<Vec<Arc<EntityState>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<EntityState>>>>,
}

impl EntityStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<Vec<Arc<EntityState>>>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// States as of creation or the last `changed()`, sorted by entity id.
    pub fn current(&self) -> &Arc<Vec<Arc<EntityState>>> {
        &self.current
    }

    /// Wait for the next published change. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<EntityState>>>> {
        self.receiver.changed().await.ok()?;
        self.current = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.current))
    }
}
