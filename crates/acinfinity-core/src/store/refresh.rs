// ── Full refresh ──
//
// Fetches one complete snapshot of the account and applies it to the
// DataStore. The controller list comes first; per-controller settings and
// per-port controls/settings are then fetched concurrently.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::{try_join, try_join_all};
use tracing::{debug, info, warn};

use acinfinity_api::{AcInfinityClient, Error as ApiError};

use super::{ControllerEntry, DataStore, Snapshot, SnapshotBuilder};
use crate::config::EntitySelection;
use crate::entity::{EntityState, discover};

/// Everything the cloud reports for one controller besides its list entry.
struct ControllerDetails {
    device_id: String,
    settings: acinfinity_api::JsonObject,
    ports: Vec<(u32, acinfinity_api::JsonObject, acinfinity_api::JsonObject)>,
}

async fn fetch_controller(
    client: &AcInfinityClient,
    entry: ControllerEntry,
) -> Result<ControllerDetails, ApiError> {
    let id = entry.device_id.as_str();

    let ports = try_join_all(entry.ports.iter().map(|&port| async move {
        let (controls, settings) = try_join(
            client.device_mode_settings(id, port),
            client.device_settings(id, port),
        )
        .await?;
        Ok::<_, ApiError>((port, controls, settings))
    }));

    let (settings, ports) = try_join(client.device_settings(id, 0), ports).await?;
    Ok(ControllerDetails {
        device_id: entry.device_id,
        settings,
        ports,
    })
}

/// Fetch one complete snapshot. Any failed request fails the whole fetch.
pub(crate) async fn fetch_snapshot(client: &AcInfinityClient) -> Result<Snapshot, ApiError> {
    let mut builder = SnapshotBuilder::new();
    let entries: Vec<ControllerEntry> = client
        .devices_list_all()
        .await?
        .into_iter()
        .filter_map(|properties| builder.add_controller(properties))
        .collect();

    debug!(controllers = entries.len(), "fetching controller details");
    let details = try_join_all(
        entries
            .into_iter()
            .map(|entry| fetch_controller(client, entry)),
    )
    .await?;

    for detail in details {
        builder.add_settings(&detail.device_id, 0, detail.settings);
        for (port, controls, settings) in detail.ports {
            builder.add_port_controls(&detail.device_id, port, controls);
            builder.add_settings(&detail.device_id, port, settings);
        }
    }

    Ok(builder.build())
}

impl DataStore {
    /// Publish `snapshot` and recompute every entity state from it.
    ///
    /// Returns `true` if any published state changed.
    pub(crate) fn apply_snapshot(
        &self,
        snapshot: Snapshot,
        selection: impl Fn(&str) -> EntitySelection,
        now: DateTime<Utc>,
    ) -> bool {
        let discovery = discover(&snapshot, selection);

        for entity in &discovery.entities {
            if self.announced.insert(entity.unique_id.clone()) {
                info!(
                    "Initializing entity \"{}\" ({}) for platform \"{}\".",
                    entity.unique_id,
                    entity.description.key,
                    entity.kind()
                );
            }
        }
        for entity in &discovery.unsuitable {
            if self.ignored.insert(entity.unique_id.clone()) {
                warn!(
                    "Ignoring unsuitable entity \"{}\" ({}) for platform \"{}\".",
                    entity.unique_id,
                    entity.description.key,
                    entity.kind()
                );
            }
        }

        // Forget ids that left the account so a returning one is logged again.
        let live: HashSet<&str> = discovery
            .entities
            .iter()
            .chain(&discovery.unsuitable)
            .map(|e| e.unique_id.as_str())
            .collect();
        self.announced.retain(|id| live.contains(id.as_str()));
        self.ignored.retain(|id| live.contains(id.as_str()));

        let states = discovery
            .entities
            .iter()
            .map(|e| (e.entity_id.clone(), e.state(&snapshot, now)));
        let changed = self.entities.replace_all(states);

        self.snapshot.send_modify(|s| *s = Arc::new(snapshot));
        self.discovery.send_modify(|d| *d = Arc::new(discovery));
        self.last_full_refresh.send_replace(Some(now));

        debug!(entities = self.entities.len(), changed, "snapshot applied");
        changed
    }

    /// Flag every published state unavailable after a failed refresh.
    ///
    /// Values are kept; the next successful refresh restores availability.
    pub(crate) fn mark_unavailable(&self) -> bool {
        let states: Vec<(String, EntityState)> = self
            .entities
            .snapshot()
            .iter()
            .map(|state| {
                let mut state = EntityState::clone(state);
                state.available = false;
                (state.entity_id.clone(), state)
            })
            .collect();
        self.entities.replace_all(states)
    }
}
