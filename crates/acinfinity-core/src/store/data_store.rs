// ── Central reactive data store ──
//
// Holds the latest snapshot, the entities discovered in it, and their
// published states. Mutations are broadcast to subscribers via `watch`
// channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashSet;
use tokio::sync::watch;

use super::Snapshot;
use super::collection::EntityCollection;
use super::subscription::EntityStream;
use crate::entity::{Discovery, Entity, EntityState};
use crate::error::CoreError;

/// Central reactive store for one account.
///
/// Reads are wait-free clones of `Arc`s. Entity states are keyed by
/// entity id and only re-broadcast when a refresh changed something.
pub struct DataStore {
    pub(crate) snapshot: watch::Sender<Arc<Snapshot>>,
    pub(crate) discovery: watch::Sender<Arc<Discovery>>,
    pub(crate) entities: EntityCollection<EntityState>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
    /// Unique ids already logged as initialized.
    pub(crate) announced: DashSet<String>,
    /// Unique ids already logged as unsuitable.
    pub(crate) ignored: DashSet<String>,
}

impl DataStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (discovery, _) = watch::channel(Arc::new(Discovery::default()));
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            snapshot,
            discovery,
            entities: EntityCollection::new(),
            last_full_refresh,
            announced: DashSet::new(),
            ignored: DashSet::new(),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// The most recently applied snapshot; empty before the first refresh.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn discovery(&self) -> Arc<Discovery> {
        self.discovery.borrow().clone()
    }

    pub fn entities_snapshot(&self) -> Arc<Vec<Arc<EntityState>>> {
        self.entities.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    /// Published state by entity id, or by unique id when unambiguous.
    pub fn entity_state(&self, identifier: &str) -> Option<Arc<EntityState>> {
        self.entities.get_by_key(identifier).or_else(|| {
            let discovery = self.discovery();
            let entity = discovery.find(identifier).ok()?;
            self.entities.get_by_key(&entity.entity_id)
        })
    }

    /// The discovered entity behind `identifier`.
    pub fn resolve(&self, identifier: &str) -> Result<Entity, CoreError> {
        self.discovery().find(identifier).cloned()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity ids currently published, sorted.
    pub fn entity_ids(&self) -> Vec<String> {
        self.entities.keys()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_entities(&self) -> EntityStream {
        EntityStream::new(self.entities.subscribe())
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// Bumped every time a refresh changes a published state.
    pub fn version(&self) -> u64 {
        self.entities.version()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
