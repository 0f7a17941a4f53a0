// ── Command API ──
//
// All writes flow through a unified `Command` enum. Entities build
// commands from the latest snapshot; the coordinator's command processor
// executes them one at a time and refreshes afterwards.

use crate::error::CoreError;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<(), CoreError>>,
}

/// Key/value pairs merged into the current payload before posting.
pub type KeyValues = Vec<(&'static str, i64)>;

/// All write operations against the AC Infinity cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge values into a port's mode controls (`addDevMode`).
    UpdatePortControls {
        controller_id: String,
        port: u32,
        values: KeyValues,
    },
    /// Merge values into a port's advanced settings (`updateAdvSetting`).
    UpdatePortSettings {
        controller_id: String,
        port: u32,
        values: KeyValues,
    },
    /// Merge values into controller-level advanced settings (port 0).
    UpdateControllerSettings {
        controller_id: String,
        values: KeyValues,
    },
    /// Fetch a fresh snapshot outside the polling schedule.
    Refresh,
}

impl Command {
    /// The controller a write targets; `None` for [`Command::Refresh`].
    pub fn controller_id(&self) -> Option<&str> {
        match self {
            Self::UpdatePortControls { controller_id, .. }
            | Self::UpdatePortSettings { controller_id, .. }
            | Self::UpdateControllerSettings { controller_id, .. } => Some(controller_id),
            Self::Refresh => None,
        }
    }
}
