// ── Polling coordinator ──
//
// Full lifecycle management for one AC Infinity account: login,
// background polling, serialized writes, and reactive entity state
// through the DataStore.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use acinfinity_api::keys;
use acinfinity_api::{AcInfinityClient, TransportConfig};

use crate::command::{Command, CommandEnvelope};
use crate::config::{CoordinatorConfig, MIN_POLLING_INTERVAL_SECS, RetryPolicy};
use crate::entity::EntityState;
use crate::error::CoreError;
use crate::model::ControllerRef;
use crate::store::{DataStore, EntityStream, Snapshot, as_text, fetch_snapshot};

const COMMAND_CHANNEL_SIZE: usize = 64;

const REFRESH_FAILED: &str = "Unable to refresh from data update coordinator";
const UPDATE_FAILED: &str = "Unable to update settings";
const CONTROLLER_UPDATE_FAILED: &str = "Unable to update controller settings";

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── RefreshStatus ────────────────────────────────────────────────

/// Outcome of the most recent refresh cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl RefreshStatus {
    /// True once a refresh succeeded and none has failed since.
    pub fn is_healthy(&self) -> bool {
        self.last_success.is_some() && self.consecutive_failures == 0
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Entities never call
/// the cloud themselves: they read the last published snapshot, and
/// writes go through [`execute`](Self::execute).
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    client: AcInfinityClient,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    refresh_status: watch::Sender<RefreshStatus>,
    polling_interval: watch::Sender<Duration>,
    /// One refresh at a time; a write's follow-up refresh queues behind
    /// a running poll.
    refresh_lock: Mutex<()>,
    /// Background tasks of the current connection; `None` while
    /// disconnected.
    session: Mutex<Option<Session>>,
}

/// What one `connect()` starts and `disconnect()` tears down.
struct Session {
    cancel: CancellationToken,
    command_tx: mpsc::Sender<CommandEnvelope>,
    task_handles: Vec<JoinHandle<()>>,
}

impl Session {
    async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.task_handles {
            let _ = handle.await;
        }
    }
}

impl Coordinator {
    /// Create a coordinator from configuration. Does NOT connect;
    /// call [`connect()`](Self::connect) to log in and start polling.
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = AcInfinityClient::new(
            config.base_url.clone(),
            config.email.clone(),
            config.password.clone(),
            &transport,
        )?;

        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (refresh_status, _) = watch::channel(RefreshStatus::default());
        let (polling_interval, _) = watch::channel(config.polling_interval);

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                store,
                connection_state,
                refresh_status,
                polling_interval,
                refresh_lock: Mutex::new(()),
                session: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Log in, perform the first refresh, and spawn the polling and
    /// command-processor tasks.
    ///
    /// Connecting an already connected coordinator restarts its tasks; a
    /// coordinator may be connected again after `disconnect()`.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let previous = self.inner.session.lock().await.take();
        if let Some(previous) = previous {
            previous.shutdown().await;
        }
        self.inner.connection_state.send_replace(ConnectionState::Connecting);

        let result = async {
            self.inner.client.login().await?;
            debug!(email = %self.inner.config.email, "logged in");
            self.refresh().await
        }
        .await;

        if let Err(e) = result {
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            return Err(e);
        }

        let cancel = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let task_handles = vec![
            tokio::spawn(command_processor_task(
                self.clone(),
                command_rx,
                cancel.clone(),
            )),
            tokio::spawn(refresh_task(
                self.clone(),
                self.inner.polling_interval.subscribe(),
                cancel.clone(),
            )),
        ];
        *self.inner.session.lock().await = Some(Session {
            cancel,
            command_tx,
            task_handles,
        });

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(
            controllers = self.inner.store.snapshot().controllers().len(),
            entities = self.inner.store.entity_count(),
            "connected to AC Infinity"
        );
        Ok(())
    }

    /// Cancel background tasks and forget the session.
    pub async fn disconnect(&self) {
        let session = self.inner.session.lock().await.take();
        if let Some(session) = session {
            session.shutdown().await;
        }

        self.inner.client.logout();
        self.inner.connection_state.send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch a complete snapshot and publish it.
    ///
    /// Retries per [`RetryPolicy`], the whole cycle bounded by the update
    /// timeout. On failure the previous snapshot stays published and
    /// every entity is flagged unavailable.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let _guard = self.inner.refresh_lock.lock().await;
        let timeout = self.inner.config.update_timeout;

        let fetched = tokio::time::timeout(
            timeout,
            with_retries(self.inner.config.retry, REFRESH_FAILED, || self.fetch_once()),
        )
        .await
        .unwrap_or_else(|_| {
            Err(CoreError::UpdateFailed {
                message: format!("update timed out after {}s", timeout.as_secs_f32()),
            })
        });

        match fetched {
            Ok(snapshot) => {
                let config = &self.inner.config;
                self.inner
                    .store
                    .apply_snapshot(snapshot, |id| config.selection_for(id), Utc::now());
                self.inner.refresh_status.send_modify(|status| {
                    status.last_success = Some(Utc::now());
                    status.last_error = None;
                    status.consecutive_failures = 0;
                });
                Ok(())
            }
            Err(e) => {
                self.inner.store.mark_unavailable();
                self.inner.refresh_status.send_modify(|status| {
                    status.last_error = Some(e.to_string());
                    status.consecutive_failures += 1;
                });
                Err(e)
            }
        }
    }

    async fn fetch_once(&self) -> Result<Snapshot, CoreError> {
        self.ensure_logged_in().await?;
        Ok(fetch_snapshot(&self.inner.client).await?)
    }

    async fn ensure_logged_in(&self) -> Result<(), CoreError> {
        if !self.inner.client.is_logged_in() {
            self.inner.client.login().await?;
        }
        Ok(())
    }

    /// Change the polling interval of the running refresh task.
    pub fn set_polling_interval(&self, seconds: u64) -> Result<(), CoreError> {
        if seconds < MIN_POLLING_INTERVAL_SECS {
            return Err(CoreError::Config {
                message: format!(
                    "polling interval must be at least {MIN_POLLING_INTERVAL_SECS} seconds, got {seconds}"
                ),
            });
        }
        self.inner
            .polling_interval
            .send_replace(Duration::from_secs(seconds));
        info!("Polling Interval changed to {seconds} seconds");
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        *self.inner.polling_interval.borrow()
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command on the command-processor task.
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }
        let command_tx = self
            .inner
            .session
            .lock()
            .await
            .as_ref()
            .map(|session| session.command_tx.clone())
            .ok_or(CoreError::Disconnected)?;

        let (tx, rx) = tokio::sync::oneshot::channel();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    /// Parse `raw` for the entity named by `identifier` and write it.
    ///
    /// `identifier` is an entity id, or a unique id when unambiguous.
    pub async fn set_entity_value(&self, identifier: &str, raw: &str) -> Result<(), CoreError> {
        let entity = self.inner.store.resolve(identifier)?;
        let snapshot = self.inner.store.snapshot();

        let value = entity.parse(&snapshot, raw)?;
        info!(
            "User requesting value update of entity \"{}\" to \"{value}\"",
            entity.unique_id
        );
        let command = entity.build_command(&snapshot, &value)?;
        self.execute(command).await
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Polling is disabled; the closure sees the snapshot from the
    /// initial refresh and any refresh its own writes trigger.
    pub async fn oneshot<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.polling_interval = Duration::ZERO;

        let coordinator = Coordinator::new(cfg)?;
        coordinator.connect().await?;
        let result = f(coordinator.clone()).await;
        coordinator.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn refresh_status(&self) -> RefreshStatus {
        self.inner.refresh_status.borrow().clone()
    }

    /// Whether the last refresh succeeded.
    pub fn is_available(&self) -> bool {
        self.inner.refresh_status.borrow().is_healthy()
    }

    pub fn entities(&self) -> EntityStream {
        self.inner.store.subscribe_entities()
    }

    pub fn entities_snapshot(&self) -> Arc<Vec<Arc<EntityState>>> {
        self.inner.store.entities_snapshot()
    }

    pub fn entity(&self, identifier: &str) -> Option<Arc<EntityState>> {
        self.inner.store.entity_state(identifier)
    }

    pub fn controllers(&self) -> Vec<ControllerRef> {
        self.inner.store.snapshot().controllers().to_vec()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Refresh on the current polling interval; restart the ticker when the
/// interval changes. A zero interval idles until it is changed.
async fn refresh_task(
    coordinator: Coordinator,
    mut interval_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
) {
    loop {
        let period = *interval_rx.borrow_and_update();

        if period.is_zero() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    continue;
                }
            }
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = coordinator.refresh().await {
                        warn!(error = %e, "periodic refresh failed");
                    }
                }
            }
        }
    }
}

/// Run commands one at a time, in arrival order.
async fn command_processor_task(
    coordinator: Coordinator,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&coordinator, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Perform a write, then request a refresh so entities reflect it.
///
/// A failed follow-up refresh is logged, not returned: the write itself
/// went through.
async fn route_command(coordinator: &Coordinator, cmd: Command) -> Result<(), CoreError> {
    let inner = &coordinator.inner;
    let retry = inner.config.retry;

    match cmd {
        Command::Refresh => return coordinator.refresh().await,

        Command::UpdatePortControls {
            controller_id,
            port,
            values,
        } => {
            with_retries(retry, UPDATE_FAILED, || async {
                coordinator.ensure_logged_in().await?;
                Ok(inner
                    .client
                    .set_device_mode_settings(&controller_id, port, &values)
                    .await?)
            })
            .await?;
        }

        Command::UpdatePortSettings {
            controller_id,
            port,
            values,
        } => {
            let name = port_name(&inner.store.snapshot(), &controller_id, port)?;
            with_retries(retry, UPDATE_FAILED, || async {
                coordinator.ensure_logged_in().await?;
                Ok(inner
                    .client
                    .update_advanced_settings(&controller_id, port, &name, &values)
                    .await?)
            })
            .await?;
        }

        Command::UpdateControllerSettings {
            controller_id,
            values,
        } => {
            let name = controller_name(&inner.store.snapshot(), &controller_id)?;
            with_retries(retry, CONTROLLER_UPDATE_FAILED, || async {
                coordinator.ensure_logged_in().await?;
                Ok(inner
                    .client
                    .update_advanced_settings(&controller_id, 0, &name, &values)
                    .await?)
            })
            .await?;
        }
    }

    if let Err(e) = coordinator.refresh().await {
        warn!(error = %e, "refresh after write failed");
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────

/// Run `op`, retrying transient failures per `policy` with a pause
/// between attempts. Rejected credentials and bad input fail at once.
async fn with_retries<T, F, Fut>(policy: RetryPolicy, context: &str, mut op: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                warn!(
                    error = %e,
                    "{context}. Retry attempt {attempt}/{}",
                    policy.max_retries
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) if e.is_transient() => {
                error!(error = %e, "{context}. Retry attempt limit exceeded.");
                return Err(e);
            }
            Err(e) => {
                error!(error = %e, "{context}");
                return Err(e);
            }
        }
    }
}

/// The settings endpoint renames whatever it is not sent a name for.
fn controller_name(snapshot: &Snapshot, controller_id: &str) -> Result<String, CoreError> {
    snapshot
        .controller_property(controller_id, keys::controller::DEVICE_NAME)
        .and_then(as_text)
        .ok_or_else(|| CoreError::ControllerNotFound {
            identifier: controller_id.to_owned(),
        })
}

fn port_name(snapshot: &Snapshot, controller_id: &str, port: u32) -> Result<String, CoreError> {
    snapshot
        .port_property(controller_id, port, keys::port::NAME)
        .and_then(as_text)
        .ok_or_else(|| CoreError::ControllerNotFound {
            identifier: format!("{controller_id} port {port}"),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::testing::{DEVICE_ID, Fixture};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retries(fast(), "op", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CoreError::CannotConnect {
                    reason: "down".into(),
                })
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_the_limit() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries(fast(), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::CannotConnect {
                reason: "down".into(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rejected_credentials_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries(fast(), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CoreError::InvalidAuth {
                message: "Password error".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(CoreError::InvalidAuth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn write_names_come_from_the_snapshot() {
        let snapshot = Fixture::load().build();

        assert_eq!(controller_name(&snapshot, DEVICE_ID).unwrap(), "Grow Tent");
        assert_eq!(port_name(&snapshot, DEVICE_ID, 1).unwrap(), "Grow Lights");
        assert!(matches!(
            port_name(&snapshot, DEVICE_ID, 9),
            Err(CoreError::ControllerNotFound { .. })
        ));
    }

    #[test]
    fn refresh_status_health() {
        assert!(!RefreshStatus::default().is_healthy());
        let ok = RefreshStatus {
            last_success: Some(Utc::now()),
            ..RefreshStatus::default()
        };
        assert!(ok.is_healthy());
        let failing = RefreshStatus {
            consecutive_failures: 1,
            ..ok
        };
        assert!(!failing.is_healthy());
    }
}
